//! In-memory graph storage implementation
//!
//! Reference [`GraphBackend`]: nodes live in an id-indexed arena, a label
//! index answers label scans and an [`IndexManager`] answers indexed
//! lookups. One `RwLock` guards all of it, so a node and its complete label
//! set become visible to scans in the same critical section.

use super::backend::{GraphBackend, StorageError, StorageResult};
use super::node::Node;
use super::property::{PropertyMap, PropertyValue};
use super::types::{IndexHandle, Label, LabelHandle, NodeId};
use crate::index::IndexManager;
use std::collections::{BTreeSet, HashMap};
use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};
use tracing::debug;

#[derive(Debug, Default)]
struct StoreState {
    /// Node arena (NodeId -> Node); deleted slots are `None`
    nodes: Vec<Option<Node>>,

    /// Label index for fast scans
    label_index: HashMap<Label, BTreeSet<NodeId>>,

    /// Labels materialized through `create_label`
    known_labels: BTreeSet<Label>,

    /// Property indices
    property_index: IndexManager,

    /// Next node ID. Ids are never reused, so an id always names one node.
    next_node_id: u64,

    node_count: usize,
}

impl StoreState {
    fn nodes_with_label<'a>(&'a self, label: &Label) -> impl Iterator<Item = &'a Node> + 'a {
        let ids = self.label_index.get(label);
        ids.into_iter()
            .flatten()
            .filter_map(move |id| self.nodes.get(id.as_u64() as usize).and_then(Option::as_ref))
    }
}

/// In-memory graph storage
#[derive(Debug)]
pub struct GraphStore {
    state: RwLock<StoreState>,
}

impl GraphStore {
    /// Create a new empty graph store
    pub fn new() -> Self {
        GraphStore {
            state: RwLock::new(StoreState {
                nodes: Vec::with_capacity(1024),
                next_node_id: 1,
                ..StoreState::default()
            }),
        }
    }

    fn read(&self) -> RwLockReadGuard<'_, StoreState> {
        self.state.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, StoreState> {
        self.state.write().unwrap_or_else(PoisonError::into_inner)
    }

    /// Number of live nodes
    pub fn node_count(&self) -> usize {
        self.read().node_count
    }

    /// Labels known to the store, either created explicitly or attached to a node
    pub fn labels(&self) -> BTreeSet<Label> {
        let state = self.read();
        let mut labels = state.known_labels.clone();
        labels.extend(state.label_index.keys().cloned());
        labels
    }

    /// Total number of storage-level property indexes
    pub fn index_count(&self) -> usize {
        self.read().property_index.len()
    }
}

impl Default for GraphStore {
    fn default() -> Self {
        Self::new()
    }
}

impl GraphBackend for GraphStore {
    fn create_label(&self, label: &Label) -> StorageResult<LabelHandle> {
        let mut state = self.write();
        state.known_labels.insert(label.clone());
        Ok(LabelHandle { label: label.clone() })
    }

    fn create_index(&self, label: &Label, property: &str) -> StorageResult<IndexHandle> {
        let mut state = self.write();
        let state = &mut *state;
        state.known_labels.insert(label.clone());

        if state.property_index.has_index(label, property) {
            return Err(StorageError::IndexExists(IndexHandle::new(label, property)));
        }

        let existing: Vec<Node> = state.nodes_with_label(label).cloned().collect();
        state.property_index.create_index(label, property, existing.iter());
        debug!("Created index :{}({}) over {} existing nodes", label, property, existing.len());
        Ok(IndexHandle::new(label, property))
    }

    fn drop_index(&self, label: &Label, property: &str) -> StorageResult<()> {
        // Dropping a missing index is a no-op
        if self.write().property_index.drop_index(label, property) {
            debug!("Dropped index :{}({})", label, property);
        }
        Ok(())
    }

    fn indexes(&self, label: &Label) -> StorageResult<Vec<String>> {
        Ok(self.read().property_index.properties_for(label))
    }

    fn label_scan(&self, label: &Label) -> StorageResult<Vec<NodeId>> {
        let state = self.read();
        Ok(state
            .label_index
            .get(label)
            .map(|ids| ids.iter().copied().collect())
            .unwrap_or_default())
    }

    fn indexed_lookup(
        &self,
        label: &Label,
        property: &str,
        value: &PropertyValue,
    ) -> StorageResult<Vec<NodeId>> {
        self.read()
            .property_index
            .lookup(label, property, value)
            .ok_or_else(|| StorageError::IndexNotFound(IndexHandle::new(label, property)))
    }

    fn create_node(&self, labels: &[Label], properties: PropertyMap) -> StorageResult<NodeId> {
        let mut state = self.write();

        let node_id = NodeId::new(state.next_node_id);
        state.next_node_id += 1;
        let idx = node_id.as_u64() as usize;

        let node = Node::new_with_properties(node_id, labels.iter().cloned(), properties);

        for label in &node.labels {
            state
                .label_index
                .entry(label.clone())
                .or_default()
                .insert(node_id);
        }
        state.property_index.index_node(&node);

        if idx >= state.nodes.len() {
            state.nodes.resize(idx + 1, None);
        }
        state.nodes[idx] = Some(node);
        state.node_count += 1;

        debug!("Created node {} with labels {:?}", node_id, labels);
        Ok(node_id)
    }

    fn get_node(&self, id: NodeId) -> StorageResult<Option<Node>> {
        let state = self.read();
        Ok(state
            .nodes
            .get(id.as_u64() as usize)
            .and_then(Option::as_ref)
            .cloned())
    }

    fn delete_node(&self, id: NodeId) -> StorageResult<()> {
        let mut state = self.write();
        let node = state
            .nodes
            .get_mut(id.as_u64() as usize)
            .and_then(Option::take)
            .ok_or(StorageError::NodeNotFound(id))?;

        for label in &node.labels {
            if let Some(node_set) = state.label_index.get_mut(label) {
                node_set.remove(&id);
                if node_set.is_empty() {
                    state.label_index.remove(label);
                }
            }
        }
        state.property_index.unindex_node(&node);
        state.node_count -= 1;

        debug!("Deleted node {}", id);
        Ok(())
    }
}
