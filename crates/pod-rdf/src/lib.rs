//! RDF support for the pod.
//!
//! Only what the pipeline needs: a set-semantics [`Graph`] with basic graph
//! pattern matching, a Turtle/N-Triples subset, and the SPARQL Update forms
//! used for patching.
//!
//! # Modules
//!
//! - [`graph`] -- [`Graph`], [`TriplePattern`], [`Bindings`]
//! - [`turtle`] -- [`parse_turtle`], [`to_turtle`], [`to_ntriples`]
//! - [`sparql`] -- [`SparqlUpdate`] parsing and evaluation
//! - [`vocab`] -- IRIs of the vocabularies the pod interprets

pub mod error;
pub mod graph;
mod lexer;
mod parser;
pub mod sparql;
pub mod turtle;
pub mod vocab;

pub use error::{RdfError, Result};
pub use graph::{Bindings, Graph, PatternTerm, TriplePattern};
pub use sparql::{SparqlUpdate, UpdateOperation};
pub use turtle::{parse_turtle, to_ntriples, to_turtle};
