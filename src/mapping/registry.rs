//! Process-wide label registry
//!
//! Maps classes to their label sequences and labels to the classes carrying
//! them. Writers take the lock exclusively; readers share it.

use super::class::ClassId;
use super::error::{MapError, MapResult};
use crate::graph::Label;
use rustc_hash::FxHashMap;
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};
use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};
use tracing::{debug, info};

/// Resolved labels and properties of one class; immutable once registered
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ClassMapping {
    pub class: ClassId,
    /// The class's own label
    pub primary: Label,
    /// Ancestor labels, most general first, own label last
    pub ancestry: Vec<Label>,
    /// Labels contributed by included modules, in declaration order
    pub module_labels: Vec<Label>,
    /// `ancestry` followed by `module_labels`, without duplicates
    pub labels: Vec<Label>,
    /// Declared properties, inherited ones included
    pub properties: BTreeSet<String>,
}

impl ClassMapping {
    /// The class's own label
    pub fn primary_label(&self) -> &Label {
        &self.primary
    }

    pub fn declares(&self, property: &str) -> bool {
        self.properties.contains(property)
    }
}

/// A label and the classes currently mapped to it
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LabelSpec {
    pub name: Label,
    pub classes: BTreeSet<ClassId>,
}

#[derive(Debug, Default)]
struct RegistryState {
    classes: FxHashMap<ClassId, ClassMapping>,
    labels: BTreeMap<Label, LabelSpec>,
    /// Own label -> class owning it
    owners: FxHashMap<Label, ClassId>,
}

/// Registry of mapped classes and their labels
#[derive(Debug, Default)]
pub struct LabelRegistry {
    state: RwLock<RegistryState>,
}

impl LabelRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> RwLockReadGuard<'_, RegistryState> {
        self.state.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, RegistryState> {
        self.state.write().unwrap_or_else(PoisonError::into_inner)
    }

    /// Record a class mapping.
    ///
    /// Re-registering the same label sequence is a no-op apart from
    /// refreshing the declared properties. A different sequence for a known
    /// class, or an own label already owned by another class, is rejected
    /// before anything is written.
    pub fn register(&self, mapping: ClassMapping) -> MapResult<()> {
        let mut state = self.write();

        if let Some(existing) = state.classes.get(&mapping.class) {
            if existing.labels != mapping.labels {
                return Err(MapError::DuplicateRegistration {
                    class: mapping.class.clone(),
                    detail: format!(
                        "registered with labels {:?}, now {:?}",
                        existing.labels, mapping.labels
                    ),
                });
            }
        }

        let primary = mapping.primary_label().clone();
        if let Some(owner) = state.owners.get(&primary) {
            if owner != &mapping.class {
                return Err(MapError::DuplicateRegistration {
                    class: mapping.class.clone(),
                    detail: format!("label {} already belongs to {}", primary, owner),
                });
            }
        }

        for label in &mapping.labels {
            state
                .labels
                .entry(label.clone())
                .or_insert_with(|| LabelSpec {
                    name: label.clone(),
                    classes: BTreeSet::new(),
                })
                .classes
                .insert(mapping.class.clone());
        }
        state.owners.insert(primary, mapping.class.clone());

        debug!("Registered {} with labels {:?}", mapping.class, mapping.labels);
        state.classes.insert(mapping.class.clone(), mapping);
        Ok(())
    }

    /// Ordered label sequence of a class
    pub fn labels_for(&self, class: &ClassId) -> MapResult<Vec<Label>> {
        self.read()
            .classes
            .get(class)
            .map(|m| m.labels.clone())
            .ok_or_else(|| MapError::UnknownClass(class.clone()))
    }

    pub fn mapping_for(&self, class: &ClassId) -> MapResult<ClassMapping> {
        self.read()
            .classes
            .get(class)
            .cloned()
            .ok_or_else(|| MapError::UnknownClass(class.clone()))
    }

    /// Classes whose label sequence contains `label`
    pub fn classes_for(&self, label: &Label) -> BTreeSet<ClassId> {
        self.read()
            .labels
            .get(label)
            .map(|spec| spec.classes.clone())
            .unwrap_or_default()
    }

    /// Ancestry of the class owning `label`, ending with `label` itself.
    /// Labels owned by no class (module labels) are their own ancestry.
    pub fn ancestry_for_label(&self, label: &Label) -> Vec<Label> {
        let state = self.read();
        state
            .owners
            .get(label)
            .and_then(|class| state.classes.get(class))
            .map(|m| m.ancestry.clone())
            .unwrap_or_else(|| vec![label.clone()])
    }

    /// The most specific registered class whose own label is on the node
    pub fn class_for_labels<'a>(&self, labels: impl IntoIterator<Item = &'a Label>) -> Option<ClassId> {
        let state = self.read();
        labels
            .into_iter()
            .filter_map(|label| state.owners.get(label))
            .filter_map(|class| state.classes.get(class))
            .max_by(|a, b| {
                a.ancestry
                    .len()
                    .cmp(&b.ancestry.len())
                    .then_with(|| b.class.cmp(&a.class))
            })
            .map(|m| m.class.clone())
    }

    pub fn label_spec(&self, label: &Label) -> Option<LabelSpec> {
        self.read().labels.get(label).cloned()
    }

    /// Snapshot of every known label, sorted by name
    pub fn label_specs(&self) -> Vec<LabelSpec> {
        self.read().labels.values().cloned().collect()
    }

    /// Number of registered classes
    pub fn len(&self) -> usize {
        self.read().classes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.read().classes.is_empty()
    }

    /// Forget every class and label
    pub fn reset(&self) {
        let mut state = self.write();
        *state = RegistryState::default();
        info!("Label registry reset");
    }
}
