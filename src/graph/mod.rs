//! Property graph storage
//!
//! This module holds the storage-facing half of the crate:
//! - Labels, node ids and property values shared with the mapping layer
//! - The [`GraphBackend`] trait the mapping layer is written against
//! - [`GraphStore`], an in-memory backend with label and property indexes

pub mod backend;
pub mod node;
pub mod property;
pub mod store;
pub mod types;

// Re-export main types
pub use backend::{GraphBackend, StorageError, StorageResult};
pub use node::Node;
pub use property::{props, PropertyMap, PropertyValue};
pub use store::GraphStore;
pub use types::{IndexHandle, Label, LabelHandle, NodeId};
