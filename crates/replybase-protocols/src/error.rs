//! Error taxonomy for content storage and retrieval.

use thiserror::Error;

/// Errors surfaced by the content store and the components built on it.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Requested content id does not exist.
    #[error("Content item not found: {0}")]
    NotFound(String),

    /// No backing key-value collaborator is bound; writes are impossible.
    #[error("Backing content store is not available")]
    BackingStoreUnavailable,

    /// The operation is rejected before any mutation is applied
    /// (self-link, duplicate edge, protected id, conflicting registration).
    #[error("Invalid operation: {0}")]
    InvalidOperation(String),

    /// The backing collaborator reported a failure.
    #[error("Storage error: {0}")]
    Storage(String),

    /// A stored value could not be encoded.
    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl From<serde_json::Error> for StoreError {
    fn from(err: serde_json::Error) -> Self {
        StoreError::Serialization(err.to_string())
    }
}
