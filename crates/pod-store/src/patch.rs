use bytes::Bytes;
use pod_rdf::turtle::{parse_turtle_bytes, to_ntriples, to_turtle};
use pod_rdf::{Graph, SparqlUpdate};
use pod_types::content_types::{
    APPLICATION_N_TRIPLES, APPLICATION_SPARQL_UPDATE, INTERNAL_QUADS, TEXT_TURTLE,
};
use pod_types::representation::keys;
use pod_types::{Metadata, Representation, RepresentationData, ResourceIdentifier};
use tracing::debug;

use crate::error::{StoreError, StoreResult};

/// A change description for `modify_resource`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Patch {
    pub content_type: String,
    pub data: Bytes,
}

impl Patch {
    pub fn new(content_type: impl Into<String>, data: impl Into<Bytes>) -> Self {
        Self {
            content_type: content_type.into(),
            data: data.into(),
        }
    }

    /// An `application/sparql-update` patch.
    pub fn sparql_update(update: impl Into<String>) -> Self {
        Self::new(APPLICATION_SPARQL_UPDATE, update.into())
    }

    pub fn is_sparql_update(&self) -> bool {
        self.content_type
            .eq_ignore_ascii_case(APPLICATION_SPARQL_UPDATE)
    }
}

/// Applies patches to representations.
///
/// Handlers are pure with respect to store state: they receive the current
/// representation and return the replacement, the caller does the I/O.
pub trait PatchHandler: Send + Sync {
    /// Content-type the caller should request the current state in.
    fn preferred_input(&self) -> &str {
        INTERNAL_QUADS
    }

    /// Whether a missing target is patched as if it were empty.
    fn supports_create(&self) -> bool {
        false
    }

    /// Compute the new representation of `id`. `current` is `None` when the
    /// resource does not exist yet.
    fn apply(
        &self,
        id: &ResourceIdentifier,
        current: Option<Representation>,
        patch: &Patch,
    ) -> StoreResult<Representation>;
}

/// Serialization family of the patch target, kept on output.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum TargetFormat {
    Quads,
    Turtle,
    NTriples,
}

/// Applies SPARQL Update patches to RDF representations.
#[derive(Debug, Clone, Copy)]
pub struct SparqlUpdatePatchHandler {
    create: bool,
}

impl SparqlUpdatePatchHandler {
    /// Handler with create-on-patch enabled.
    pub fn new() -> Self {
        Self { create: true }
    }

    /// Handler that answers `NotFound` for missing targets.
    pub fn without_create() -> Self {
        Self { create: false }
    }

    fn read_target(
        id: &ResourceIdentifier,
        current: Option<Representation>,
    ) -> StoreResult<(Graph, TargetFormat, Metadata)> {
        let Some(representation) = current else {
            return Ok((Graph::new(), TargetFormat::Quads, Metadata::new(INTERNAL_QUADS)));
        };
        let content_type = representation.content_type().to_ascii_lowercase();
        let Representation { metadata, data, .. } = representation;
        match (content_type.as_str(), data) {
            (INTERNAL_QUADS, RepresentationData::Quads(triples)) => {
                Ok((triples.into_iter().collect(), TargetFormat::Quads, metadata))
            }
            (TEXT_TURTLE, RepresentationData::Binary(bytes)) => Ok((
                parse_turtle_bytes(&bytes, Some(id.as_str()))?.into_iter().collect(),
                TargetFormat::Turtle,
                metadata,
            )),
            (APPLICATION_N_TRIPLES, RepresentationData::Binary(bytes)) => Ok((
                parse_turtle_bytes(&bytes, Some(id.as_str()))?.into_iter().collect(),
                TargetFormat::NTriples,
                metadata,
            )),
            (other, _) => Err(StoreError::Conflict(format!(
                "cannot apply a SPARQL update to {id}: content-type {other} is not RDF"
            ))),
        }
    }
}

impl Default for SparqlUpdatePatchHandler {
    fn default() -> Self {
        Self::new()
    }
}

impl PatchHandler for SparqlUpdatePatchHandler {
    fn supports_create(&self) -> bool {
        self.create
    }

    fn apply(
        &self,
        id: &ResourceIdentifier,
        current: Option<Representation>,
        patch: &Patch,
    ) -> StoreResult<Representation> {
        if !patch.is_sparql_update() {
            return Err(StoreError::NotImplemented(format!(
                "patches of type {}",
                patch.content_type
            )));
        }
        let update = SparqlUpdate::parse_bytes(&patch.data, Some(id.as_str()))?;
        let (mut graph, format, mut metadata) = Self::read_target(id, current)?;

        let before = graph.len();
        update.apply_to(&mut graph);
        debug!(
            resource = %id,
            operations = update.operations.len(),
            before,
            after = graph.len(),
            "applied SPARQL update"
        );

        let data = match format {
            TargetFormat::Quads => {
                metadata.set_content_type(INTERNAL_QUADS);
                metadata.remove(keys::CONTENT_LENGTH);
                RepresentationData::Quads(graph.into_triples())
            }
            TargetFormat::Turtle | TargetFormat::NTriples => {
                let text = if format == TargetFormat::Turtle {
                    to_turtle(graph.iter())
                } else {
                    to_ntriples(graph.iter())
                };
                metadata.set(keys::CONTENT_LENGTH, text.len().to_string());
                RepresentationData::Binary(text.into())
            }
        };
        Ok(Representation::new(metadata, data).with_identifier(id.clone()))
    }
}
