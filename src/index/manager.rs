//! Storage-side registry of property indexes
//!
//! Owned by [`GraphStore`](crate::graph::GraphStore) and guarded by its lock,
//! so none of these methods synchronize on their own.

use crate::graph::{Label, Node, NodeId, PropertyValue};
use super::property_index::PropertyIndex;
use std::collections::BTreeMap;

/// Key for identifying a property index
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PropertyIndexKey {
    pub label: Label,
    pub property: String,
}

impl PropertyIndexKey {
    pub fn new(label: &Label, property: &str) -> Self {
        Self {
            label: label.clone(),
            property: property.to_string(),
        }
    }
}

/// All property indexes of one store
#[derive(Debug, Default)]
pub struct IndexManager {
    indices: BTreeMap<PropertyIndexKey, PropertyIndex>,
}

impl IndexManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an index and backfill it from `existing`.
    /// Returns false when the index was already present.
    pub fn create_index<'a>(
        &mut self,
        label: &Label,
        property: &str,
        existing: impl IntoIterator<Item = &'a Node>,
    ) -> bool {
        let key = PropertyIndexKey::new(label, property);
        if self.indices.contains_key(&key) {
            return false;
        }

        let mut index = PropertyIndex::new();
        for node in existing {
            if let Some(value) = node.get_property(property) {
                index.insert(value.clone(), node.id);
            }
        }
        self.indices.insert(key, index);
        true
    }

    /// Drop an index. Returns false when it did not exist.
    pub fn drop_index(&mut self, label: &Label, property: &str) -> bool {
        self.indices
            .remove(&PropertyIndexKey::new(label, property))
            .is_some()
    }

    pub fn has_index(&self, label: &Label, property: &str) -> bool {
        self.indices.contains_key(&PropertyIndexKey::new(label, property))
    }

    /// Indexed property keys of one label, sorted
    pub fn properties_for(&self, label: &Label) -> Vec<String> {
        self.indices
            .keys()
            .filter(|key| &key.label == label)
            .map(|key| key.property.clone())
            .collect()
    }

    pub fn lookup(&self, label: &Label, property: &str, value: &PropertyValue) -> Option<Vec<NodeId>> {
        self.indices
            .get(&PropertyIndexKey::new(label, property))
            .map(|index| index.get(value))
    }

    /// Add a freshly created node to every index covering one of its labels
    pub fn index_node(&mut self, node: &Node) {
        for (key, index) in self.indices.iter_mut() {
            if !node.has_label(&key.label) {
                continue;
            }
            if let Some(value) = node.get_property(&key.property) {
                index.insert(value.clone(), node.id);
            }
        }
    }

    /// Remove a node from every index covering one of its labels
    pub fn unindex_node(&mut self, node: &Node) {
        for (key, index) in self.indices.iter_mut() {
            if !node.has_label(&key.label) {
                continue;
            }
            if let Some(value) = node.get_property(&key.property) {
                index.remove(value, node.id);
            }
        }
    }

    pub fn len(&self) -> usize {
        self.indices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }
}
