use pod_rdf::turtle::parse_turtle_bytes;
use pod_rdf::vocab::ldp;
use pod_types::content_types::INTERNAL_QUADS;
use pod_types::{RepresentationData, RepresentationPreferences, ResourceIdentifier, Triple};

use crate::error::StoreResult;
use crate::traits::ResourceStore;

/// Knows the container hierarchy of the pod.
pub trait ContainerManager: Send + Sync {
    /// The container holding `id`. `None` for the root and for identifiers
    /// outside the pod.
    fn get_container(&self, id: &ResourceIdentifier) -> Option<ResourceIdentifier>;

    fn is_container(&self, id: &ResourceIdentifier) -> bool {
        id.is_container()
    }
}

/// Container manager deriving the hierarchy from identifier syntax.
///
/// The resource need not exist.
#[derive(Clone, Debug)]
pub struct UrlContainerManager {
    root: ResourceIdentifier,
}

impl UrlContainerManager {
    pub fn new(root: ResourceIdentifier) -> Self {
        Self { root }
    }

    pub fn root(&self) -> &ResourceIdentifier {
        &self.root
    }

    /// Direct children of `id`, read from its `ldp:contains` triples.
    pub async fn get_children(
        &self,
        store: &dyn ResourceStore,
        id: &ResourceIdentifier,
    ) -> StoreResult<Vec<ResourceIdentifier>> {
        if !self.is_container(id) {
            return Ok(Vec::new());
        }
        let representation = store
            .get_representation(id, &RepresentationPreferences::single(INTERNAL_QUADS))
            .await?;
        let triples: Vec<Triple> = match representation.data {
            RepresentationData::Quads(triples) => triples,
            RepresentationData::Binary(bytes) => parse_turtle_bytes(&bytes, Some(id.as_str()))?,
        };
        let mut children: Vec<ResourceIdentifier> = triples
            .iter()
            .filter(|t| {
                t.subject.as_iri() == Some(id.as_str())
                    && t.predicate.as_iri() == Some(ldp::CONTAINS)
            })
            .filter_map(|t| t.object.as_iri().map(ResourceIdentifier::new))
            .collect();
        children.sort();
        Ok(children)
    }
}

impl ContainerManager for UrlContainerManager {
    fn get_container(&self, id: &ResourceIdentifier) -> Option<ResourceIdentifier> {
        if id == &self.root || !id.starts_with(&self.root) {
            return None;
        }
        id.parent()
    }
}
