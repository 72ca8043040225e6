use std::collections::BTreeMap;
use std::sync::RwLock;

use async_trait::async_trait;
use pod_rdf::vocab::{ldp, rdf};
use pod_types::content_types::INTERNAL_QUADS;
use pod_types::representation::keys;
use pod_types::{
    Metadata, Representation, RepresentationData, RepresentationPreferences, ResourceIdentifier,
    Term, Triple,
};
use tracing::debug;

use crate::error::{StoreError, StoreResult};
use crate::traits::ResourceStore;

/// A resource as held by [`InMemoryResourceStore`].
#[derive(Clone, Debug)]
struct StoredResource {
    metadata: Metadata,
    data: RepresentationData,
}

impl StoredResource {
    fn empty_container() -> Self {
        Self {
            metadata: Metadata::new(INTERNAL_QUADS).with(keys::MODIFIED, now()),
            data: RepresentationData::Quads(Vec::new()),
        }
    }
}

/// In-memory, BTreeMap-based resource store.
///
/// Intended for tests, the CLI and embedding. Resources are held behind a
/// `RwLock` and cloned on read. Containers are materialized: writing
/// `/a/b/c` creates `/a/` and `/a/b/` when missing, and reading a container
/// yields its `ldp:contains` listing as `internal/quads`.
pub struct InMemoryResourceStore {
    root: ResourceIdentifier,
    resources: RwLock<BTreeMap<ResourceIdentifier, StoredResource>>,
}

impl InMemoryResourceStore {
    /// Create a store holding only the (empty) root container.
    pub fn new(root: ResourceIdentifier) -> Self {
        let mut resources = BTreeMap::new();
        resources.insert(root.clone(), StoredResource::empty_container());
        Self {
            root,
            resources: RwLock::new(resources),
        }
    }

    /// The root container.
    pub fn root(&self) -> &ResourceIdentifier {
        &self.root
    }

    /// Number of resources, the root included.
    pub fn len(&self) -> usize {
        self.resources.read().expect("lock poisoned").len()
    }

    /// Returns `true` if only the root container exists.
    pub fn is_empty(&self) -> bool {
        self.len() <= 1
    }

    /// All identifiers in lexicographic order.
    pub fn identifiers(&self) -> Vec<ResourceIdentifier> {
        self.resources
            .read()
            .expect("lock poisoned")
            .keys()
            .cloned()
            .collect()
    }

    fn check_in_root(&self, id: &ResourceIdentifier) -> StoreResult<()> {
        if id.starts_with(&self.root) {
            Ok(())
        } else {
            Err(StoreError::Conflict(format!(
                "{id} is outside of the pod root {}",
                self.root
            )))
        }
    }

    fn write(
        &self,
        map: &mut BTreeMap<ResourceIdentifier, StoredResource>,
        id: &ResourceIdentifier,
        representation: Representation,
    ) -> StoreResult<()> {
        self.check_in_root(id)?;
        check_kind_clash(map, id)?;

        let Representation {
            mut metadata, data, ..
        } = representation;
        if id.is_container() && matches!(&data, RepresentationData::Binary(b) if !b.is_empty()) {
            return Err(StoreError::Conflict(format!(
                "container {id} only accepts RDF data"
            )));
        }
        let data = match data {
            RepresentationData::Binary(_) if id.is_container() => {
                metadata.set_content_type(INTERNAL_QUADS);
                RepresentationData::Quads(Vec::new())
            }
            // Containment is derived from the store, never stored.
            RepresentationData::Quads(triples) if id.is_container() => RepresentationData::Quads(
                triples
                    .into_iter()
                    .filter(|t| t.predicate.as_iri() != Some(ldp::CONTAINS))
                    .collect(),
            ),
            other => other,
        };
        if let RepresentationData::Binary(bytes) = &data {
            metadata.set(keys::CONTENT_LENGTH, bytes.len().to_string());
        }
        metadata.remove(keys::SLUG);
        metadata.set(keys::MODIFIED, now());

        // Materialize missing ancestors, nearest first, up to the root.
        let mut cursor = id.parent();
        while let Some(container) = cursor {
            if map.contains_key(&container) || !container.starts_with(&self.root) {
                break;
            }
            check_kind_clash(map, &container)?;
            debug!(container = %container, "creating intermediate container");
            map.insert(container.clone(), StoredResource::empty_container());
            cursor = container.parent();
        }

        map.insert(id.clone(), StoredResource { metadata, data });
        Ok(())
    }
}

impl std::fmt::Debug for InMemoryResourceStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InMemoryResourceStore")
            .field("root", &self.root)
            .field("resource_count", &self.len())
            .finish()
    }
}

#[async_trait]
impl ResourceStore for InMemoryResourceStore {
    async fn get_representation(
        &self,
        id: &ResourceIdentifier,
        _preferences: &RepresentationPreferences,
    ) -> StoreResult<Representation> {
        let map = self.resources.read().expect("lock poisoned");
        let stored = map
            .get(id)
            .ok_or_else(|| StoreError::NotFound(id.clone()))?;

        if !id.is_container() {
            return Ok(
                Representation::new(stored.metadata.clone(), stored.data.clone())
                    .with_identifier(id.clone()),
            );
        }

        let subject = Term::named(id.as_str());
        let mut triples = vec![
            Triple::new(subject.clone(), Term::named(rdf::TYPE), Term::named(ldp::CONTAINER)),
            Triple::new(
                subject.clone(),
                Term::named(rdf::TYPE),
                Term::named(ldp::BASIC_CONTAINER),
            ),
            Triple::new(subject.clone(), Term::named(rdf::TYPE), Term::named(ldp::RESOURCE)),
        ];
        triples.extend(children(&map, id).map(|child| {
            Triple::new(
                subject.clone(),
                Term::named(ldp::CONTAINS),
                Term::named(child.as_str()),
            )
        }));
        if let RepresentationData::Quads(extra) = &stored.data {
            triples.extend(extra.iter().cloned());
        }
        triples.sort();
        triples.dedup();

        let mut metadata = stored.metadata.clone();
        metadata.set_content_type(INTERNAL_QUADS);
        Ok(Representation::new(metadata, RepresentationData::Quads(triples))
            .with_identifier(id.clone()))
    }

    async fn add_resource(
        &self,
        container: &ResourceIdentifier,
        representation: Representation,
    ) -> StoreResult<ResourceIdentifier> {
        if !container.is_container() {
            return Err(StoreError::Conflict(format!(
                "{container} is not a container"
            )));
        }
        let mut map = self.resources.write().expect("lock poisoned");
        if !map.contains_key(container) {
            return Err(StoreError::NotFound(container.clone()));
        }

        let suffix = if representation.metadata.wants_container() {
            "/"
        } else {
            ""
        };
        let slug = representation
            .metadata
            .get(keys::SLUG)
            .map(sanitize_slug)
            .filter(|s| !s.is_empty());
        let id = match slug {
            Some(name) => {
                let candidate = container.join(&format!("{name}{suffix}"));
                if map.contains_key(&candidate) || check_kind_clash(&map, &candidate).is_err() {
                    container.join(&format!("{}{suffix}", generate_name()))
                } else {
                    candidate
                }
            }
            None => container.join(&format!("{}{suffix}", generate_name())),
        };

        self.write(&mut map, &id, representation)?;
        debug!(container = %container, resource = %id, "added resource");
        Ok(id)
    }

    async fn set_resource(
        &self,
        id: &ResourceIdentifier,
        representation: Representation,
    ) -> StoreResult<()> {
        let mut map = self.resources.write().expect("lock poisoned");
        self.write(&mut map, id, representation)?;
        debug!(resource = %id, "stored resource");
        Ok(())
    }

    async fn delete_resource(&self, id: &ResourceIdentifier) -> StoreResult<()> {
        if id == &self.root {
            return Err(StoreError::Conflict("cannot delete the root container".into()));
        }
        let mut map = self.resources.write().expect("lock poisoned");
        if !map.contains_key(id) {
            return Err(StoreError::NotFound(id.clone()));
        }
        if id.is_container() && children(&map, id).next().is_some() {
            return Err(StoreError::Conflict(format!("container {id} is not empty")));
        }
        map.remove(id);
        debug!(resource = %id, "deleted resource");
        Ok(())
    }
}

/// Direct children of `container`.
fn children<'a>(
    map: &'a BTreeMap<ResourceIdentifier, StoredResource>,
    container: &'a ResourceIdentifier,
) -> impl Iterator<Item = &'a ResourceIdentifier> + 'a {
    map.range(container.clone()..)
        .take_while(move |(id, _)| id.starts_with(container))
        .map(|(id, _)| id)
        .filter(move |id| id.parent().as_ref() == Some(container))
}

/// A document and a container may not share a name.
fn check_kind_clash(
    map: &BTreeMap<ResourceIdentifier, StoredResource>,
    id: &ResourceIdentifier,
) -> StoreResult<()> {
    let twin = match id.as_str().strip_suffix('/') {
        Some(document) => ResourceIdentifier::new(document),
        None => id.with_suffix("/"),
    };
    if map.contains_key(&twin) {
        return Err(StoreError::Conflict(format!(
            "{id} clashes with existing resource {twin}"
        )));
    }
    Ok(())
}

/// The child name a slug turns into: separators and whitespace removed.
pub fn sanitize_slug(slug: &str) -> String {
    slug.chars()
        .filter(|c| !matches!(c, '/' | '#' | '?') && !c.is_whitespace())
        .collect()
}

fn generate_name() -> String {
    uuid::Uuid::now_v7().simple().to_string()
}

fn now() -> String {
    chrono::Utc::now().to_rfc3339()
}
