use pod_rdf::RdfError;
use pod_types::{ResourceIdentifier, TypeError};

/// Errors from resource store operations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StoreError {
    /// The identifier has no representation.
    #[error("resource not found: {0}")]
    NotFound(ResourceIdentifier),

    /// The operation conflicts with the current state of the store, or the
    /// patch target is in a format the patch handler does not understand.
    #[error("conflict: {0}")]
    Conflict(String),

    /// A patch or representation could not be parsed.
    #[error("malformed input: {0}")]
    MalformedInput(String),

    /// No converter bridges the stored and the requested content-types.
    #[error("representation not acceptable: {0}")]
    NotAcceptable(String),

    /// The operation or input format is not supported.
    #[error("not implemented: {0}")]
    NotImplemented(String),

    /// Back-end failure.
    #[error("internal error: {0}")]
    Internal(String),
}

impl From<RdfError> for StoreError {
    fn from(err: RdfError) -> Self {
        match err {
            RdfError::Unsupported(what) => StoreError::NotImplemented(what),
            other => StoreError::MalformedInput(other.to_string()),
        }
    }
}

impl From<TypeError> for StoreError {
    fn from(err: TypeError) -> Self {
        StoreError::MalformedInput(err.to_string())
    }
}

/// Result alias for store operations.
pub type StoreResult<T> = Result<T, StoreError>;
