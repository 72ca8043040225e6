//! Resource store pipeline for the pod.
//!
//! Every component here implements or consumes the [`ResourceStore`]
//! contract, so decorators can be stacked on top of a leaf back-end and the
//! resulting chain is itself a store:
//!
//! ```text
//! RepresentationConvertingStore -> PatchingStore -> InMemoryResourceStore
//! ```
//!
//! # Components
//!
//! - [`InMemoryResourceStore`] -- `BTreeMap`-based leaf back-end
//! - [`RepresentationConvertingStore`] -- content negotiation on reads,
//!   conversion to the internal format on writes
//! - [`PatchingStore`] -- atomic read-modify-write for `modify_resource`
//! - [`KeyedResourceLocker`] -- per-identifier exclusive locks
//! - [`SparqlUpdatePatchHandler`] -- applies SPARQL Update patches
//! - [`UrlContainerManager`] -- syntactic container hierarchy
//!
//! # Design Rules
//!
//! 1. Decorators forward what they do not handle, unchanged.
//! 2. Inner errors surface unchanged unless a decorator must translate them.
//! 3. Patches on one identifier never interleave; everything else runs
//!    concurrently.
//! 4. Locks are released on every exit path.
//! 5. Nothing is retried.

pub mod container;
pub mod converter;
pub mod converting;
pub mod error;
pub mod locker;
pub mod memory;
pub mod patch;
pub mod patching;
pub mod traits;

pub use container::{ContainerManager, UrlContainerManager};
pub use converter::{
    ConverterRegistry, QuadToRdfConverter, RepresentationConverter, TurtleToQuadConverter,
};
pub use converting::RepresentationConvertingStore;
pub use error::{StoreError, StoreResult};
pub use locker::{KeyedResourceLocker, LockGuard, ResourceLocker};
pub use memory::{sanitize_slug, InMemoryResourceStore};
pub use patch::{Patch, PatchHandler, SparqlUpdatePatchHandler};
pub use patching::PatchingStore;
pub use traits::ResourceStore;
