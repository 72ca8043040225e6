use std::collections::BTreeMap;

use bytes::Bytes;

use crate::content_types::INTERNAL_QUADS;
use crate::identifier::ResourceIdentifier;
use crate::rdf::Triple;

/// Well-known metadata keys.
pub mod keys {
    /// Name hint used by `add_resource` when generating a child identifier.
    pub const SLUG: &str = "slug";
    /// `container` or `document`; decides the kind of resource `add_resource` creates.
    pub const INTERACTION_MODEL: &str = "interaction-model";
    /// Byte size of binary data.
    pub const CONTENT_LENGTH: &str = "content-length";
    /// RFC 3339 timestamp of the last write, set by back-ends.
    pub const MODIFIED: &str = "modified";
}

pub const CONTAINER_MODEL: &str = "container";

/// Predicate-like key/value pairs describing a representation.
///
/// Always carries a content-type.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Metadata {
    content_type: String,
    entries: BTreeMap<String, String>,
}

impl Metadata {
    pub fn new(content_type: impl Into<String>) -> Self {
        Self {
            content_type: content_type.into(),
            entries: BTreeMap::new(),
        }
    }

    pub fn content_type(&self) -> &str {
        &self.content_type
    }

    pub fn set_content_type(&mut self, content_type: impl Into<String>) {
        self.content_type = content_type.into();
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries.get(key).map(String::as_str)
    }

    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.entries.insert(key.into(), value.into());
    }

    pub fn remove(&mut self, key: &str) -> Option<String> {
        self.entries.remove(key)
    }

    /// Builder-style [`Self::set`].
    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.set(key, value);
        self
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Whether the metadata asks for a container to be created.
    pub fn wants_container(&self) -> bool {
        self.get(keys::INTERACTION_MODEL) == Some(CONTAINER_MODEL)
    }
}

/// The payload of a representation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RepresentationData {
    /// Serialized bytes in the representation's content-type.
    Binary(Bytes),
    /// Parsed triples (`internal/quads`).
    Quads(Vec<Triple>),
}

impl RepresentationData {
    pub fn len(&self) -> usize {
        match self {
            RepresentationData::Binary(bytes) => bytes.len(),
            RepresentationData::Quads(triples) => triples.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Data plus metadata for one resource.
///
/// Not `Clone`. A representation is consumed once by whoever receives it;
/// reading the resource again means fetching it again.
#[derive(Debug)]
pub struct Representation {
    /// The resource this representation describes, when known.
    pub identifier: Option<ResourceIdentifier>,
    pub metadata: Metadata,
    pub data: RepresentationData,
}

impl Representation {
    pub fn new(metadata: Metadata, data: RepresentationData) -> Self {
        Self {
            identifier: None,
            metadata,
            data,
        }
    }

    /// Binary representation of the given content-type.
    pub fn binary(content_type: &str, data: impl Into<Bytes>) -> Self {
        let data = data.into();
        let metadata = Metadata::new(content_type)
            .with(keys::CONTENT_LENGTH, data.len().to_string());
        Self::new(metadata, RepresentationData::Binary(data))
    }

    /// `internal/quads` representation.
    pub fn quads(triples: Vec<Triple>) -> Self {
        Self::new(
            Metadata::new(INTERNAL_QUADS),
            RepresentationData::Quads(triples),
        )
    }

    pub fn with_identifier(mut self, identifier: ResourceIdentifier) -> Self {
        self.identifier = Some(identifier);
        self
    }

    pub fn content_type(&self) -> &str {
        self.metadata.content_type()
    }

    /// Consume the representation, returning its payload.
    pub fn into_data(self) -> RepresentationData {
        self.data
    }

    /// Consume the representation as bytes. `Quads` data yields `None`.
    pub fn into_bytes(self) -> Option<Bytes> {
        match self.data {
            RepresentationData::Binary(bytes) => Some(bytes),
            RepresentationData::Quads(_) => None,
        }
    }
}
