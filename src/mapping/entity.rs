//! Materialized domain objects

use super::class::{ClassId, LabelProvider};
use crate::graph::{Label, Node, NodeId, PropertyMap, PropertyValue};
use serde::Serialize;

/// A stored node viewed through its mapped class
///
/// Two entities are equal when they name the same node, whatever their
/// property snapshots hold.
#[derive(Debug, Clone, Serialize)]
pub struct Entity {
    id: NodeId,
    class: Option<ClassId>,
    labels: Vec<Label>,
    properties: PropertyMap,
}

impl Entity {
    pub(crate) fn new(id: NodeId, class: Option<ClassId>, labels: Vec<Label>, properties: PropertyMap) -> Self {
        Self {
            id,
            class,
            labels,
            properties,
        }
    }

    pub(crate) fn from_node(node: Node, class: Option<ClassId>) -> Self {
        Self {
            id: node.id,
            class,
            labels: node.labels.into_iter().collect(),
            properties: node.properties,
        }
    }

    pub fn id(&self) -> NodeId {
        self.id
    }

    /// Most specific registered class of the node, if any
    pub fn class(&self) -> Option<&ClassId> {
        self.class.as_ref()
    }

    /// Labels in attachment order
    pub fn labels(&self) -> &[Label] {
        &self.labels
    }

    pub fn properties(&self) -> &PropertyMap {
        &self.properties
    }

    pub fn get(&self, key: &str) -> Option<&PropertyValue> {
        self.properties.get(key)
    }

    /// True when the entity carries the provider's label
    pub fn is_a<P: LabelProvider + ?Sized>(&self, provider: &P) -> bool {
        provider
            .mapped_label_name()
            .map(|label| self.labels.contains(&label))
            .unwrap_or(false)
    }

    pub fn to_json(&self) -> serde_json::Result<serde_json::Value> {
        serde_json::to_value(self)
    }
}

impl PartialEq for Entity {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Entity {}

impl std::hash::Hash for Entity {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}
