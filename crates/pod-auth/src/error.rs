use pod_store::StoreError;
use pod_types::ResourceIdentifier;

use crate::modes::PermissionSet;

/// Errors from authorization.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AuthError {
    /// Access denied and no credentials were presented.
    #[error("authentication required for {required} on {identifier}")]
    Unauthorized {
        identifier: ResourceIdentifier,
        required: PermissionSet,
    },

    /// Access denied to an authenticated agent.
    #[error("{agent} lacks {required} access to {identifier}")]
    Forbidden {
        agent: String,
        identifier: ResourceIdentifier,
        required: PermissionSet,
    },

    /// Reading an ACL resource failed.
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Result alias for authorization.
pub type AuthResult<T> = Result<T, AuthError>;
