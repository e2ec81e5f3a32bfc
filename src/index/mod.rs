//! Property indexing module
//!
//! B-Tree indices backing [`GraphStore`](crate::graph::GraphStore)'s indexed lookups.

pub mod property_index;
pub mod manager;

pub use property_index::PropertyIndex;
pub use manager::{IndexManager, PropertyIndexKey};
