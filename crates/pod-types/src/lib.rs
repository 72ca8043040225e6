//! Foundation types for the pod.
//!
//! This crate provides the identifier, representation and RDF term types used
//! throughout the pod. Every other pod crate depends on `pod-types`.
//!
//! # Key Types
//!
//! - [`ResourceIdentifier`] -- absolute identifier of a document or container
//! - [`Representation`] -- data plus metadata describing one resource
//! - [`Metadata`] -- content-type and predicate-like key/value pairs
//! - [`RepresentationPreferences`] -- ranked acceptable content-types
//! - [`Term`] / [`Triple`] -- RDF terms carried by `internal/quads` data

pub mod content_types;
pub mod error;
pub mod identifier;
pub mod preferences;
pub mod rdf;
pub mod representation;

pub use error::TypeError;
pub use identifier::ResourceIdentifier;
pub use preferences::{matches_media_type, Preference, RepresentationPreferences};
pub use rdf::{Literal, Term, Triple};
pub use representation::{Metadata, Representation, RepresentationData};
