//! Web Access Control (WAC) authorization for the pod.
//!
//! Permissions are stored as ordinary `.acl` resources next to the
//! resources they govern. To decide what an agent may do with a resource,
//! [`WebAclAuthorizer`] walks up the container hierarchy until it finds the
//! nearest ACL with a rule for the resource, and unions the modes of the
//! rules matching the agent.
//!
//! # Modules
//!
//! - [`modes`] -- [`AccessMode`] and [`PermissionSet`]
//! - [`credentials`] -- who is asking
//! - [`acl`] -- [`AclRule`] extraction and the [`AclManager`] naming scheme
//! - [`authorizer`] -- [`Authorizer`] and [`WebAclAuthorizer`]
//! - [`header`] -- `WAC-Allow` and challenge headers

pub mod acl;
pub mod authorizer;
pub mod credentials;
pub mod error;
pub mod header;
pub mod modes;

pub use acl::{AclManager, AclRule, AgentClass, UrlBasedAclManager};
pub use authorizer::{Authorizer, WebAclAuthorizer};
pub use credentials::Credentials;
pub use error::{AuthError, AuthResult};
pub use header::{challenge, wac_allow};
pub use modes::{AccessMode, PermissionSet};
