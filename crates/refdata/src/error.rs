use thiserror::Error;

use refdata_core::filter::WildcardError;
use refdata_core::provider::LoadError;

/// Errors returned by the orchestrator.
///
/// Every variant is `Clone` so a single failed load can be handed to each
/// caller waiting on it.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum OrchestratorError {
    #[error("Reference data type {type_name} is already registered")]
    DuplicateType { type_name: String },
    #[error("Reference data name '{name}' is already registered for {existing}")]
    DuplicateName { name: String, existing: String },
    #[error("Reference data type {0} is not registered")]
    NotRegistered(String),
    #[error("Failed to load {type_name}: {source}")]
    LoadFailed {
        type_name: String,
        #[source]
        source: LoadError,
    },
    #[error("Provider returned a {actual} collection when {expected} was requested")]
    TypeMismatch { expected: String, actual: String },
    #[error("Reference data type {0} was requested while it is being loaded")]
    ReentrantLoad(String),
    #[error("Cannot block on {0} from a current-thread runtime")]
    BlockingUnavailable(String),
    #[error(transparent)]
    Filter(#[from] WildcardError),
}

/// Result type for orchestrator operations.
pub type Result<T> = std::result::Result<T, OrchestratorError>;
