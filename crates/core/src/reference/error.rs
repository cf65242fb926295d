use thiserror::Error;

use super::types::IdKind;

/// Errors raised while building or querying a reference-data collection.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CollectionError {
    #[error("{type_name} item has no id")]
    MissingId { type_name: String },
    #[error("{type_name} item {id} has no code")]
    MissingCode { type_name: String, id: String },
    #[error("{type_name} ids must be {expected}, got {actual} for id {id}")]
    IdKindMismatch {
        type_name: String,
        id: String,
        expected: IdKind,
        actual: IdKind,
    },
    #[error("{type_name} already contains id {id}")]
    DuplicateId { type_name: String, id: String },
    #[error("{type_name} already contains code {code}")]
    DuplicateCode { type_name: String, code: String },
    #[error("{type_name} already contains mapping {name}={value}")]
    DuplicateMapping {
        type_name: String,
        name: String,
        value: String,
    },
    #[error("{type_name} has no item with {key_kind} {key}")]
    NotFound {
        type_name: String,
        key_kind: &'static str,
        key: String,
    },
}

impl CollectionError {
    /// Returns true for errors caused by a misconfigured type or data set,
    /// as opposed to a lookup miss.
    pub fn is_configuration(&self) -> bool {
        !matches!(self, CollectionError::NotFound { .. })
    }
}

/// Result type for collection operations.
pub type Result<T> = std::result::Result<T, CollectionError>;
