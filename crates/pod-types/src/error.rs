use thiserror::Error;

/// Errors produced by type operations.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TypeError {
    #[error("invalid resource identifier {0:?}: {1}")]
    InvalidIdentifier(String, &'static str),

    #[error("invalid media range: {0}")]
    InvalidMediaRange(String),

    #[error("invalid quality value in {0:?}")]
    InvalidQuality(String),
}
