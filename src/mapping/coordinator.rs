//! Hierarchy-aware index coordination
//!
//! Declaring an index on a class's label also creates it on every ancestor
//! label, because ancestors' scans see the subclass instances. Declaring it
//! on a base label never reaches labels that only subclasses carry.
//!
//! Only the label an index was declared on gets an *active* descriptor, and
//! only active descriptors route queries. Ancestor entries created by a
//! subclass declaration exist in storage but stay inactive until the
//! ancestor declares the index itself.

use super::error::{MapError, MapResult};
use super::registry::LabelRegistry;
use crate::graph::{GraphBackend, IndexHandle, Label, StorageError};
use serde::Serialize;
use std::collections::BTreeMap;
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};
use tracing::{debug, info, warn};

/// Index state for one (label, property) pair
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IndexDescriptor {
    pub label: Label,
    pub property: String,
    /// Declared directly on `label`
    pub active: bool,
    #[serde(skip)]
    pub handle: IndexHandle,
}

type DescriptorKey = (Label, String);

/// Creates and drops indexes through the backend and tracks their descriptors
pub struct IndexCoordinator {
    backend: Arc<dyn GraphBackend>,
    registry: Arc<LabelRegistry>,
    descriptors: RwLock<BTreeMap<DescriptorKey, IndexDescriptor>>,
}

impl IndexCoordinator {
    pub fn new(backend: Arc<dyn GraphBackend>, registry: Arc<LabelRegistry>) -> Self {
        Self {
            backend,
            registry,
            descriptors: RwLock::new(BTreeMap::new()),
        }
    }

    fn read(&self) -> RwLockReadGuard<'_, BTreeMap<DescriptorKey, IndexDescriptor>> {
        self.descriptors.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, BTreeMap<DescriptorKey, IndexDescriptor>> {
        self.descriptors.write().unwrap_or_else(PoisonError::into_inner)
    }

    /// Declare an index on `label` and propagate it to the label's ancestors.
    ///
    /// Returns one handle per label touched, base label first. Handles of
    /// indexes that already existed in storage are reused. A storage failure
    /// stops the walk; indexes already created for earlier ancestors stay.
    pub fn declare_index(&self, label: &Label, property: &str) -> MapResult<Vec<IndexHandle>> {
        let chain = self.registry.ancestry_for_label(label);
        let mut descriptors = self.write();
        let mut handles = Vec::with_capacity(chain.len());

        for target in &chain {
            let handle = self.ensure_storage_index(target, property)?;
            let declared_here = target == label;
            let key = (target.clone(), property.to_string());

            let descriptor = descriptors.entry(key).or_insert_with(|| IndexDescriptor {
                label: target.clone(),
                property: property.to_string(),
                active: false,
                handle: handle.clone(),
            });
            descriptor.handle = handle.clone();
            descriptor.active |= declared_here;
            handles.push(handle);
        }

        info!("Declared index on :{}({}) across {:?}", label, property, chain);
        Ok(handles)
    }

    /// Make sure storage has the index, creating it only when missing
    fn ensure_storage_index(&self, label: &Label, property: &str) -> MapResult<IndexHandle> {
        let index_error = |source: StorageError| MapError::IndexOperation {
            label: label.clone(),
            property: property.to_string(),
            source,
        };

        self.backend.create_label(label).map_err(index_error)?;
        if self.storage_has_index(label, property)? {
            debug!("Reusing existing index :{}({})", label, property);
            return Ok(IndexHandle::new(label, property));
        }

        match self.backend.create_index(label, property) {
            Ok(handle) => Ok(handle),
            Err(StorageError::IndexExists(handle)) => {
                // Created concurrently by someone else; confirm before adopting it
                warn!("Index {} appeared while creating it, re-checking", handle);
                if self.storage_has_index(label, property)? {
                    Ok(handle)
                } else {
                    Err(index_error(StorageError::IndexExists(handle)))
                }
            }
            Err(err) => Err(index_error(err)),
        }
    }

    fn storage_has_index(&self, label: &Label, property: &str) -> MapResult<bool> {
        let keys = self
            .backend
            .indexes(label)
            .map_err(|source| MapError::IndexOperation {
                label: label.clone(),
                property: property.to_string(),
                source,
            })?;
        Ok(keys.iter().any(|key| key == property))
    }

    /// Drop exactly the (label, property) index; ancestors and descendants keep theirs
    pub fn drop_index(&self, label: &Label, property: &str) -> MapResult<()> {
        let mut descriptors = self.write();
        self.backend
            .drop_index(label, property)
            .map_err(|source| MapError::IndexOperation {
                label: label.clone(),
                property: property.to_string(),
                source,
            })?;
        descriptors.remove(&(label.clone(), property.to_string()));

        info!("Dropped index on :{}({})", label, property);
        Ok(())
    }

    /// True when an index was declared directly on `label`
    pub fn has_index(&self, label: &Label, property: &str) -> bool {
        self.read()
            .get(&(label.clone(), property.to_string()))
            .map(|d| d.active)
            .unwrap_or(false)
    }

    pub fn descriptor(&self, label: &Label, property: &str) -> Option<IndexDescriptor> {
        self.read().get(&(label.clone(), property.to_string())).cloned()
    }

    /// Every tracked descriptor, sorted by label then property
    pub fn descriptors(&self) -> Vec<IndexDescriptor> {
        self.read().values().cloned().collect()
    }

    /// Forget all descriptors. Storage indexes are left in place.
    pub fn reset(&self) {
        self.write().clear();
        info!("Index coordinator reset");
    }
}

impl std::fmt::Debug for IndexCoordinator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IndexCoordinator")
            .field("descriptors", &self.descriptors())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::{GraphStore, LabelHandle, Node, NodeId, PropertyMap, PropertyValue, StorageResult};
    use crate::mapping::class::{ClassRef, ClassSpec, LabelModule};
    use crate::mapping::resolver::LabelResolver;
    use std::sync::Mutex;

    /// Backend that records index calls, in the spirit of a mock label
    #[derive(Default)]
    struct RecordingBackend {
        inner: GraphStore,
        created: Mutex<Vec<IndexHandle>>,
        fail_on: Option<Label>,
        race_on_create: bool,
    }

    impl RecordingBackend {
        fn created(&self) -> Vec<IndexHandle> {
            self.created.lock().unwrap().clone()
        }
    }

    impl GraphBackend for RecordingBackend {
        fn create_label(&self, label: &Label) -> StorageResult<LabelHandle> {
            self.inner.create_label(label)
        }

        fn create_index(&self, label: &Label, property: &str) -> StorageResult<IndexHandle> {
            if self.fail_on.as_ref() == Some(label) {
                return Err(StorageError::Unavailable("disk full".into()));
            }
            if self.race_on_create {
                // Another client wins the race
                self.inner.create_index(label, property)?;
                return Err(StorageError::IndexExists(IndexHandle::new(label, property)));
            }
            let handle = self.inner.create_index(label, property)?;
            self.created.lock().unwrap().push(handle.clone());
            Ok(handle)
        }

        fn drop_index(&self, label: &Label, property: &str) -> StorageResult<()> {
            self.inner.drop_index(label, property)
        }

        fn indexes(&self, label: &Label) -> StorageResult<Vec<String>> {
            self.inner.indexes(label)
        }

        fn label_scan(&self, label: &Label) -> StorageResult<Vec<NodeId>> {
            self.inner.label_scan(label)
        }

        fn indexed_lookup(&self, label: &Label, property: &str, value: &PropertyValue) -> StorageResult<Vec<NodeId>> {
            self.inner.indexed_lookup(label, property, value)
        }

        fn create_node(&self, labels: &[Label], properties: PropertyMap) -> StorageResult<NodeId> {
            self.inner.create_node(labels, properties)
        }

        fn get_node(&self, id: NodeId) -> StorageResult<Option<Node>> {
            self.inner.get_node(id)
        }

        fn delete_node(&self, id: NodeId) -> StorageResult<()> {
            self.inner.delete_node(id)
        }
    }

    fn base_and_sub(registry: &LabelRegistry) {
        let base_spec = ClassSpec::new("MyBaseClass").property("things");
        registry.register(LabelResolver.mapping(&base_spec).unwrap()).unwrap();
        let base = ClassRef::new("MyBaseClass".into(), Label::new("MyBaseClass"), base_spec);
        let sub_spec = ClassSpec::new("MySubClass").extends(&base).property("stuff");
        registry.register(LabelResolver.mapping(&sub_spec).unwrap()).unwrap();
    }

    fn setup(backend: RecordingBackend) -> (Arc<RecordingBackend>, IndexCoordinator) {
        let backend = Arc::new(backend);
        let registry = Arc::new(LabelRegistry::new());
        base_and_sub(&registry);
        let coordinator = IndexCoordinator::new(backend.clone(), registry);
        (backend, coordinator)
    }

    #[test]
    fn test_index_in_sub_class_exists_in_base() {
        let (backend, coordinator) = setup(RecordingBackend::default());

        let handles = coordinator.declare_index(&Label::new("MySubClass"), "things").unwrap();
        assert_eq!(
            handles,
            vec![IndexHandle::new("MyBaseClass", "things"), IndexHandle::new("MySubClass", "things")]
        );
        assert_eq!(backend.created(), handles);

        assert!(coordinator.has_index(&Label::new("MySubClass"), "things"));
        // Present in storage, but not declared on the base
        assert!(!coordinator.has_index(&Label::new("MyBaseClass"), "things"));
        assert!(coordinator.descriptor(&Label::new("MyBaseClass"), "things").is_some());
    }

    #[test]
    fn test_index_in_base_class_not_in_sub_class() {
        let (backend, coordinator) = setup(RecordingBackend::default());

        let handles = coordinator.declare_index(&Label::new("MyBaseClass"), "things").unwrap();
        assert_eq!(handles, vec![IndexHandle::new("MyBaseClass", "things")]);
        assert_eq!(backend.created(), handles);
        assert!(coordinator.has_index(&Label::new("MyBaseClass"), "things"));
        assert!(!coordinator.has_index(&Label::new("MySubClass"), "things"));
        assert!(coordinator.descriptor(&Label::new("MySubClass"), "things").is_none());
    }

    #[test]
    fn test_redeclare_reuses_existing_indexes() {
        let (backend, coordinator) = setup(RecordingBackend::default());
        let first = coordinator.declare_index(&Label::new("MySubClass"), "things").unwrap();
        let second = coordinator.declare_index(&Label::new("MySubClass"), "things").unwrap();
        assert_eq!(first, second);
        assert_eq!(backend.created().len(), 2);

        // Base declaring later activates the propagated entry without creating anything
        coordinator.declare_index(&Label::new("MyBaseClass"), "things").unwrap();
        assert!(coordinator.has_index(&Label::new("MyBaseClass"), "things"));
        assert_eq!(backend.created().len(), 2);
    }

    #[test]
    fn test_drop_does_not_cascade() {
        let (backend, coordinator) = setup(RecordingBackend::default());
        coordinator.declare_index(&Label::new("MySubClass"), "things").unwrap();

        coordinator.drop_index(&Label::new("MySubClass"), "things").unwrap();
        assert!(!coordinator.has_index(&Label::new("MySubClass"), "things"));
        assert!(coordinator.descriptor(&Label::new("MyBaseClass"), "things").is_some());
        assert_eq!(backend.indexes(&Label::new("MyBaseClass")).unwrap(), vec!["things".to_string()]);
        assert!(backend.indexes(&Label::new("MySubClass")).unwrap().is_empty());
    }

    #[test]
    fn test_storage_failure_is_wrapped() {
        let (_, coordinator) = setup(RecordingBackend {
            fail_on: Some(Label::new("MySubClass")),
            ..RecordingBackend::default()
        });

        let err = coordinator.declare_index(&Label::new("MySubClass"), "things").unwrap_err();
        match err {
            MapError::IndexOperation { label, property, source } => {
                assert_eq!(label, Label::new("MySubClass"));
                assert_eq!(property, "things");
                assert_eq!(source, StorageError::Unavailable("disk full".into()));
            }
            other => panic!("unexpected error: {other}"),
        }
        // No rollback: the base index created before the failure is still tracked
        assert!(coordinator.descriptor(&Label::new("MyBaseClass"), "things").is_some());
        assert!(!coordinator.has_index(&Label::new("MySubClass"), "things"));
    }

    #[test]
    fn test_conflict_is_rechecked_and_adopted() {
        let (_, coordinator) = setup(RecordingBackend {
            race_on_create: true,
            ..RecordingBackend::default()
        });

        let handles = coordinator.declare_index(&Label::new("MyBaseClass"), "things").unwrap();
        assert_eq!(handles, vec![IndexHandle::new("MyBaseClass", "things")]);
        assert!(coordinator.has_index(&Label::new("MyBaseClass"), "things"));
    }

    #[test]
    fn test_module_label_index() {
        let backend = Arc::new(RecordingBackend::default());
        let registry = Arc::new(LabelRegistry::new());
        let spec = ClassSpec::new("TestClassWithBar").include(LabelModule::new("BarIndexedLabel").with_label("BarIndexedLabel"));
        registry.register(LabelResolver.mapping(&spec).unwrap()).unwrap();
        let coordinator = IndexCoordinator::new(backend.clone(), registry);

        let handles = coordinator.declare_index(&Label::new("BarIndexedLabel"), "baaz").unwrap();
        assert_eq!(handles, vec![IndexHandle::new("BarIndexedLabel", "baaz")]);
        assert!(!coordinator.has_index(&Label::new("TestClassWithBar"), "baaz"));
    }

    #[test]
    fn test_reset_forgets_descriptors() {
        let (backend, coordinator) = setup(RecordingBackend::default());
        coordinator.declare_index(&Label::new("MyBaseClass"), "things").unwrap();
        coordinator.reset();
        assert!(coordinator.descriptors().is_empty());
        assert_eq!(backend.indexes(&Label::new("MyBaseClass")).unwrap().len(), 1);
    }
}
