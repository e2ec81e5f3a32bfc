//! Core type definitions shared by the mapping layer and the storage backends

use serde::{Deserialize, Serialize};
use std::fmt;

/// Unique identifier for a stored node
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, PartialOrd, Ord)]
pub struct NodeId(pub u64);

impl NodeId {
    pub fn new(id: u64) -> Self {
        NodeId(id)
    }

    pub fn as_u64(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "NodeId({})", self.0)
    }
}

impl From<u64> for NodeId {
    fn from(id: u64) -> Self {
        NodeId(id)
    }
}

/// Node label (e.g., "Person", "Employee")
///
/// A mapped class contributes one label per ancestor plus one per mixed-in
/// module, so a single node usually carries several of these.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, PartialOrd, Ord)]
pub struct Label(String);

impl Label {
    pub fn new(label: impl Into<String>) -> Self {
        Label(label.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Label {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for Label {
    fn from(s: String) -> Self {
        Label(s)
    }
}

impl From<&str> for Label {
    fn from(s: &str) -> Self {
        Label(s.to_string())
    }
}

impl From<&Label> for Label {
    fn from(l: &Label) -> Self {
        l.clone()
    }
}

/// Handle returned by a backend when a label is materialized in storage
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct LabelHandle {
    pub label: Label,
}

/// Handle for a storage-level property index on one label
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct IndexHandle {
    pub label: Label,
    pub property: String,
}

impl IndexHandle {
    pub fn new(label: impl Into<Label>, property: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            property: property.into(),
        }
    }
}

impl fmt::Display for IndexHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, ":{}({})", self.label, self.property)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_node_id() {
        let id = NodeId::new(42);
        assert_eq!(id.as_u64(), 42);
        assert_eq!(format!("{}", id), "NodeId(42)");

        let id2: NodeId = 100.into();
        assert_eq!(id2.as_u64(), 100);
    }

    #[test]
    fn test_label() {
        let label = Label::new("Person");
        assert_eq!(label.as_str(), "Person");
        assert_eq!(format!("{}", label), "Person");

        let label2: Label = "Employee".into();
        assert_eq!(label2.as_str(), "Employee");
    }

    #[test]
    fn test_index_handle_display() {
        let handle = IndexHandle::new("Person", "name");
        assert_eq!(handle.to_string(), ":Person(name)");
    }

    #[test]
    fn test_id_ordering() {
        assert!(NodeId::new(1) < NodeId::new(2));
    }
}
