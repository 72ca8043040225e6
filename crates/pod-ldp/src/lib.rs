//! Linked Data Platform operations for the pod.
//!
//! [`LdpHandler`] is the entry point for transports: it authorizes an
//! [`Operation`], dispatches it to the store pipeline and describes the
//! outcome as a [`ResponseDescription`] with an HTTP-like status, a
//! `WAC-Allow` permission summary and, for anonymous denials, an
//! authentication challenge.
//!
//! [`PodPipeline`] assembles the store chain and authorizer from a
//! [`PodConfig`]:
//!
//! ```text
//! LdpHandler
//!   |-- WebAclAuthorizer --------------------------.
//!   `-- RepresentationConvertingStore <------------'
//!         `-- PatchingStore (KeyedResourceLocker, SparqlUpdatePatchHandler)
//!               `-- backend (InMemoryResourceStore)
//! ```

pub mod config;
pub mod error;
pub mod handler;
pub mod operation;
pub mod pipeline;

pub use config::PodConfig;
pub use error::{LdpError, LdpResult};
pub use handler::LdpHandler;
pub use operation::{Method, Operation, ResponseDescription};
pub use pipeline::PodPipeline;
