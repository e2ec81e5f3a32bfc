//! Error types for the mapping layer

use super::class::ClassId;
use crate::graph::{Label, StorageError};
use thiserror::Error;

/// Errors raised while defining classes, declaring indexes or querying
#[derive(Error, Debug)]
pub enum MapError {
    /// Class or module has no name or label to derive a label from
    #[error("Cannot derive a label for {0}")]
    UnresolvableLabel(String),

    /// Conflicting re-registration of a class identity
    #[error("Class {class} is already registered: {detail}")]
    DuplicateRegistration { class: ClassId, detail: String },

    /// Storage-level index create/drop failed
    #[error("Index operation on :{label}({property}) failed: {source}")]
    IndexOperation {
        label: Label,
        property: String,
        #[source]
        source: StorageError,
    },

    /// `find` matched nothing
    #[error("No node labelled {label} matches {filter}")]
    NotFound { label: Label, filter: String },

    #[error("Class {0} is not registered")]
    UnknownClass(ClassId),

    #[error("Class {class} does not declare property {property}")]
    UnknownProperty { class: ClassId, property: String },

    /// Failure reported by the storage backend during a query or write
    #[error(transparent)]
    Storage(#[from] StorageError),

    #[error("Configuration error: {0}")]
    Config(#[from] serde_yaml::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type MapResult<T> = Result<T, MapError>;
