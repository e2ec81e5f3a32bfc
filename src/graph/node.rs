//! Stored node representation
//!
//! A node keeps its labels in attachment order so a mapped class's label
//! sequence reads back exactly as it was written.

use super::property::{PropertyMap, PropertyValue};
use super::types::{Label, NodeId};
use indexmap::IndexSet;
use serde::{Deserialize, Serialize};

/// A node in the property graph
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Node {
    /// Unique identifier for this node
    pub id: NodeId,

    /// Labels in attachment order, without duplicates
    pub labels: IndexSet<Label>,

    /// Properties associated with this node
    pub properties: PropertyMap,

    /// Creation timestamp (Unix milliseconds)
    pub created_at: i64,

    /// Last update timestamp (Unix milliseconds)
    pub updated_at: i64,
}

impl Node {
    /// Create a new node with labels and properties
    pub fn new_with_properties(
        id: NodeId,
        labels: impl IntoIterator<Item = Label>,
        properties: PropertyMap,
    ) -> Self {
        let now = chrono::Utc::now().timestamp_millis();

        Node {
            id,
            labels: labels.into_iter().collect(),
            properties,
            created_at: now,
            updated_at: now,
        }
    }

    /// Check if node has a specific label
    pub fn has_label(&self, label: &Label) -> bool {
        self.labels.contains(label)
    }

    /// Labels in attachment order
    pub fn labels(&self) -> impl Iterator<Item = &Label> {
        self.labels.iter()
    }

    /// Set a property value
    pub fn set_property(&mut self, key: impl Into<String>, value: impl Into<PropertyValue>) -> Option<PropertyValue> {
        let old = self.properties.insert(key.into(), value.into());
        self.updated_at = chrono::Utc::now().timestamp_millis();
        old
    }

    pub fn get_property(&self, key: &str) -> Option<&PropertyValue> {
        self.properties.get(key)
    }

    /// True when every `(key, value)` of `filter` is present on the node
    pub fn matches(&self, filter: &PropertyMap) -> bool {
        filter
            .iter()
            .all(|(key, expected)| self.properties.get(key) == Some(expected))
    }

    pub fn label_count(&self) -> usize {
        self.labels.len()
    }
}

impl PartialEq for Node {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Node {}

impl std::hash::Hash for Node {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}
