//! Property value types for stored nodes
//!
//! Values carry a total order so they can key the B-Tree property indexes.
//! Floats are ordered with `f64::total_cmp`; values of different types order
//! by type rank.

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::{BTreeMap, HashMap};
use std::fmt;

/// Property value type supporting multiple data types
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum PropertyValue {
    String(String),
    Integer(i64),
    Float(f64),
    Boolean(bool),
    DateTime(i64), // Unix timestamp in milliseconds
    Array(Vec<PropertyValue>),
    Map(BTreeMap<String, PropertyValue>),
    Null,
}

impl PropertyValue {
    pub fn as_string(&self) -> Option<&str> {
        match self {
            PropertyValue::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_integer(&self) -> Option<i64> {
        match self {
            PropertyValue::Integer(i) => Some(*i),
            _ => None,
        }
    }

    pub fn as_boolean(&self) -> Option<bool> {
        match self {
            PropertyValue::Boolean(b) => Some(*b),
            _ => None,
        }
    }

    /// Get type name as string
    pub fn type_name(&self) -> &'static str {
        match self {
            PropertyValue::String(_) => "String",
            PropertyValue::Integer(_) => "Integer",
            PropertyValue::Float(_) => "Float",
            PropertyValue::Boolean(_) => "Boolean",
            PropertyValue::DateTime(_) => "DateTime",
            PropertyValue::Array(_) => "Array",
            PropertyValue::Map(_) => "Map",
            PropertyValue::Null => "Null",
        }
    }

    fn type_rank(&self) -> u8 {
        match self {
            PropertyValue::Null => 0,
            PropertyValue::Boolean(_) => 1,
            PropertyValue::Integer(_) => 2,
            PropertyValue::Float(_) => 3,
            PropertyValue::DateTime(_) => 4,
            PropertyValue::String(_) => 5,
            PropertyValue::Array(_) => 6,
            PropertyValue::Map(_) => 7,
        }
    }
}

impl Ord for PropertyValue {
    fn cmp(&self, other: &Self) -> Ordering {
        use PropertyValue::*;
        match (self, other) {
            (String(a), String(b)) => a.cmp(b),
            (Integer(a), Integer(b)) => a.cmp(b),
            (Float(a), Float(b)) => a.total_cmp(b),
            (Boolean(a), Boolean(b)) => a.cmp(b),
            (DateTime(a), DateTime(b)) => a.cmp(b),
            (Array(a), Array(b)) => a.cmp(b),
            (Map(a), Map(b)) => a.cmp(b),
            (Null, Null) => Ordering::Equal,
            _ => self.type_rank().cmp(&other.type_rank()),
        }
    }
}

impl PartialOrd for PropertyValue {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for PropertyValue {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for PropertyValue {}

impl fmt::Display for PropertyValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PropertyValue::String(s) => write!(f, "\"{}\"", s),
            PropertyValue::Integer(i) => write!(f, "{}", i),
            PropertyValue::Float(fl) => write!(f, "{}", fl),
            PropertyValue::Boolean(b) => write!(f, "{}", b),
            PropertyValue::DateTime(dt) => write!(f, "DateTime({})", dt),
            PropertyValue::Array(arr) => {
                write!(f, "[")?;
                for (i, val) in arr.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", val)?;
                }
                write!(f, "]")
            }
            PropertyValue::Map(map) => {
                write!(f, "{{")?;
                for (i, (key, val)) in map.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}: {}", key, val)?;
                }
                write!(f, "}}")
            }
            PropertyValue::Null => write!(f, "null"),
        }
    }
}

impl From<String> for PropertyValue {
    fn from(s: String) -> Self {
        PropertyValue::String(s)
    }
}

impl From<&str> for PropertyValue {
    fn from(s: &str) -> Self {
        PropertyValue::String(s.to_string())
    }
}

impl From<i64> for PropertyValue {
    fn from(i: i64) -> Self {
        PropertyValue::Integer(i)
    }
}

impl From<i32> for PropertyValue {
    fn from(i: i32) -> Self {
        PropertyValue::Integer(i as i64)
    }
}

impl From<f64> for PropertyValue {
    fn from(f: f64) -> Self {
        PropertyValue::Float(f)
    }
}

impl From<bool> for PropertyValue {
    fn from(b: bool) -> Self {
        PropertyValue::Boolean(b)
    }
}

impl From<Vec<PropertyValue>> for PropertyValue {
    fn from(arr: Vec<PropertyValue>) -> Self {
        PropertyValue::Array(arr)
    }
}

impl From<BTreeMap<String, PropertyValue>> for PropertyValue {
    fn from(map: BTreeMap<String, PropertyValue>) -> Self {
        PropertyValue::Map(map)
    }
}

/// Property map for storing node properties and query filters
pub type PropertyMap = HashMap<String, PropertyValue>;

/// Build a [`PropertyMap`] from `(key, value)` pairs.
///
/// ```rust
/// use labelgraph::graph::props;
///
/// let filter = props([("name", "kalle")]);
/// assert_eq!(filter.len(), 1);
/// ```
pub fn props<K, V, I>(pairs: I) -> PropertyMap
where
    K: Into<String>,
    V: Into<PropertyValue>,
    I: IntoIterator<Item = (K, V)>,
{
    pairs
        .into_iter()
        .map(|(k, v)| (k.into(), v.into()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_property_value_types() {
        assert_eq!(PropertyValue::String("test".to_string()).type_name(), "String");
        assert_eq!(PropertyValue::Integer(42).type_name(), "Integer");
        assert_eq!(PropertyValue::Float(3.14).type_name(), "Float");
        assert_eq!(PropertyValue::Boolean(true).type_name(), "Boolean");
        assert_eq!(PropertyValue::DateTime(1234567890).type_name(), "DateTime");
        assert_eq!(PropertyValue::Array(vec![]).type_name(), "Array");
        assert_eq!(PropertyValue::Map(BTreeMap::new()).type_name(), "Map");
        assert_eq!(PropertyValue::Null.type_name(), "Null");
    }

    #[test]
    fn test_property_value_conversions() {
        let string_prop: PropertyValue = "hello".into();
        assert_eq!(string_prop.as_string(), Some("hello"));

        let int_prop: PropertyValue = 42i64.into();
        assert_eq!(int_prop.as_integer(), Some(42));

        let bool_prop: PropertyValue = true.into();
        assert_eq!(bool_prop.as_boolean(), Some(true));
    }

    #[test]
    fn test_total_order_across_types() {
        let mut values = vec![
            PropertyValue::String("b".into()),
            PropertyValue::Integer(3),
            PropertyValue::Null,
            PropertyValue::Float(f64::NAN),
            PropertyValue::Integer(-1),
            PropertyValue::String("a".into()),
        ];
        values.sort();

        assert_eq!(values[0], PropertyValue::Null);
        assert_eq!(values[1], PropertyValue::Integer(-1));
        assert_eq!(values[2], PropertyValue::Integer(3));
        assert_eq!(values[4], PropertyValue::String("a".into()));

        // NaN is equal to itself under the total order, so it can key an index
        assert_eq!(PropertyValue::Float(f64::NAN), PropertyValue::Float(f64::NAN));
        // Same number, different type: not equal
        assert_ne!(PropertyValue::Integer(1), PropertyValue::Float(1.0));
    }

    #[test]
    fn test_props_helper() {
        let map = props([("name", PropertyValue::from("Alice")), ("age", 30i64.into())]);
        assert_eq!(map.get("name").and_then(|v| v.as_string()), Some("Alice"));
        assert_eq!(map.get("age").and_then(|v| v.as_integer()), Some(30));
    }
}
