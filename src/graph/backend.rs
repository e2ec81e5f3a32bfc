//! Storage collaborator interface
//!
//! The mapping layer never touches storage directly. Everything it needs from
//! a graph engine goes through [`GraphBackend`]; [`GraphStore`](super::GraphStore)
//! is the in-memory implementation shipped with the crate.

use super::node::Node;
use super::property::{PropertyMap, PropertyValue};
use super::types::{IndexHandle, Label, LabelHandle, NodeId};
use thiserror::Error;

/// Errors raised by a storage backend
#[derive(Error, Debug, Clone, PartialEq)]
pub enum StorageError {
    #[error("Node {0} not found")]
    NodeNotFound(NodeId),

    #[error("Index {0} already exists")]
    IndexExists(IndexHandle),

    #[error("Index {0} not found")]
    IndexNotFound(IndexHandle),

    #[error("Storage unavailable: {0}")]
    Unavailable(String),
}

pub type StorageResult<T> = Result<T, StorageError>;

/// Primitives a graph store must expose to back the mapping layer.
///
/// Calls may block; they are the only suspension points of the mapper.
/// Implementations must attach all labels passed to [`create_node`] in one
/// step so no scan observes a node with a partial label set.
///
/// [`create_node`]: GraphBackend::create_node
pub trait GraphBackend: Send + Sync {
    /// Materialize a label in storage (idempotent)
    fn create_label(&self, label: &Label) -> StorageResult<LabelHandle>;

    fn create_index(&self, label: &Label, property: &str) -> StorageResult<IndexHandle>;

    fn drop_index(&self, label: &Label, property: &str) -> StorageResult<()>;

    /// Property keys currently indexed on `label`
    fn indexes(&self, label: &Label) -> StorageResult<Vec<String>>;

    /// Ids of all nodes carrying `label`, in ascending id order
    fn label_scan(&self, label: &Label) -> StorageResult<Vec<NodeId>>;

    /// Ids of nodes carrying `label` whose `property` equals `value`.
    /// Fails with [`StorageError::IndexNotFound`] if no such index exists.
    fn indexed_lookup(
        &self,
        label: &Label,
        property: &str,
        value: &PropertyValue,
    ) -> StorageResult<Vec<NodeId>>;

    fn create_node(&self, labels: &[Label], properties: PropertyMap) -> StorageResult<NodeId>;

    /// Current state of a node, `None` once it has been deleted
    fn get_node(&self, id: NodeId) -> StorageResult<Option<Node>>;

    fn delete_node(&self, id: NodeId) -> StorageResult<()>;
}
