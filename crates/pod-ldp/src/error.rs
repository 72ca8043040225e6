use pod_auth::AuthError;
use pod_store::StoreError;

/// Errors surfaced by the LDP layer.
#[derive(Debug, thiserror::Error)]
pub enum LdpError {
    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Auth(#[from] AuthError),

    /// The operation itself is unusable (missing body, bad identifier).
    #[error("bad request: {0}")]
    BadRequest(String),

    #[error("configuration error: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl LdpError {
    /// HTTP status code for transports.
    pub fn status(&self) -> u16 {
        match self {
            LdpError::Store(err) | LdpError::Auth(AuthError::Store(err)) => match err {
                StoreError::NotFound(_) => 404,
                StoreError::Conflict(_) => 409,
                StoreError::MalformedInput(_) => 400,
                StoreError::NotAcceptable(_) => 406,
                StoreError::NotImplemented(_) => 501,
                StoreError::Internal(_) => 500,
            },
            LdpError::Auth(AuthError::Unauthorized { .. }) => 401,
            LdpError::Auth(AuthError::Forbidden { .. }) => 403,
            LdpError::BadRequest(_) => 400,
            LdpError::Config(_) | LdpError::Io(_) => 500,
        }
    }

    pub fn is_unauthorized(&self) -> bool {
        matches!(self, LdpError::Auth(AuthError::Unauthorized { .. }))
    }
}

/// Result alias for the LDP layer.
pub type LdpResult<T> = Result<T, LdpError>;
