use thiserror::Error;

use crate::reference::CollectionError;
use crate::storage::RepositoryError;

/// Errors a provider can return while materializing a collection.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum LoadError {
    #[error(transparent)]
    Repository(#[from] RepositoryError),
    #[error(transparent)]
    Collection(#[from] CollectionError),
    #[error("Provider does not serve {0}")]
    UnsupportedType(String),
    #[error("{0}")]
    Other(String),
}
