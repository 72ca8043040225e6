//! Error types for RDF parsing and evaluation.

use thiserror::Error;

/// Errors that can occur while reading RDF or SPARQL text.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RdfError {
    /// The input is not valid in the accepted grammar.
    #[error("syntax error on line {line}: {message}")]
    Syntax { line: usize, message: String },

    /// The input is valid but uses a feature the pod does not implement.
    #[error("unsupported: {0}")]
    Unsupported(String),

    /// The input is not valid UTF-8.
    #[error("input is not valid UTF-8")]
    Encoding,
}

impl RdfError {
    pub(crate) fn syntax(line: usize, message: impl Into<String>) -> Self {
        Self::Syntax {
            line,
            message: message.into(),
        }
    }
}

/// Convenience type alias for RDF operations.
pub type Result<T> = std::result::Result<T, RdfError>;
