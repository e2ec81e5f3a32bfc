//! B-Tree based property index for equality lookups

use crate::graph::{NodeId, PropertyValue};
use std::collections::{BTreeMap, BTreeSet};

/// Index for one property on one label: value -> node ids
#[derive(Debug, Clone, Default)]
pub struct PropertyIndex {
    index: BTreeMap<PropertyValue, BTreeSet<NodeId>>,
}

impl PropertyIndex {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, value: PropertyValue, node_id: NodeId) {
        self.index.entry(value).or_default().insert(node_id);
    }

    pub fn remove(&mut self, value: &PropertyValue, node_id: NodeId) {
        if let Some(nodes) = self.index.get_mut(value) {
            nodes.remove(&node_id);
            if nodes.is_empty() {
                self.index.remove(value);
            }
        }
    }

    /// Node ids for `value`, ascending
    pub fn get(&self, value: &PropertyValue) -> Vec<NodeId> {
        self.index
            .get(value)
            .map(|nodes| nodes.iter().copied().collect())
            .unwrap_or_default()
    }

    /// Number of distinct indexed values
    pub fn cardinality(&self) -> usize {
        self.index.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_property_index_ops() {
        let mut index = PropertyIndex::new();
        let n1 = NodeId::new(1);
        let n2 = NodeId::new(2);
        let val = PropertyValue::String("kalle".into());

        index.insert(val.clone(), n2);
        index.insert(val.clone(), n1);
        assert_eq!(index.get(&val), vec![n1, n2]);

        index.remove(&val, n1);
        assert_eq!(index.get(&val), vec![n2]);

        index.remove(&val, n2);
        assert!(index.get(&val).is_empty());
        assert_eq!(index.cardinality(), 0);
    }

    #[test]
    fn test_remove_unknown_value_is_noop() {
        let mut index = PropertyIndex::new();
        index.insert(PropertyValue::Integer(1), NodeId::new(1));
        index.remove(&PropertyValue::Integer(2), NodeId::new(1));
        assert_eq!(index.cardinality(), 1);
    }
}
