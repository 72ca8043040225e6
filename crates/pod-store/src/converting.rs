use std::sync::Arc;

use async_trait::async_trait;
use pod_types::{
    matches_media_type, Representation, RepresentationPreferences, ResourceIdentifier,
};
use tracing::debug;

use crate::converter::ConverterRegistry;
use crate::error::{StoreError, StoreResult};
use crate::patch::Patch;
use crate::traits::ResourceStore;

/// Store decorator performing content negotiation.
///
/// Reads are converted to the best acceptable content-type. Writes are
/// converted to the internal storage type when one is configured and a
/// converter exists; anything else is stored as supplied.
pub struct RepresentationConvertingStore {
    source: Arc<dyn ResourceStore>,
    converters: Arc<ConverterRegistry>,
    internal_type: Option<String>,
}

impl RepresentationConvertingStore {
    pub fn new(source: Arc<dyn ResourceStore>, converters: Arc<ConverterRegistry>) -> Self {
        Self {
            source,
            converters,
            internal_type: None,
        }
    }

    /// Convert incoming representations to `content_type` before storing.
    pub fn with_internal_type(mut self, content_type: impl Into<String>) -> Self {
        self.internal_type = Some(content_type.into());
        self
    }

    pub fn internal_type(&self) -> Option<&str> {
        self.internal_type.as_deref()
    }

    fn negotiate(
        &self,
        representation: Representation,
        preferences: &RepresentationPreferences,
    ) -> StoreResult<Representation> {
        if preferences.is_empty() {
            return Ok(representation);
        }
        let stored = representation.content_type().to_owned();
        if let Some((converter, output)) = self.converters.select(&stored, preferences) {
            debug!(
                converter = converter.name(),
                from = %stored,
                to = output,
                "converting representation"
            );
            return converter.convert(representation, output);
        }
        if preferences.accepts(&stored) {
            return Ok(representation);
        }
        let requested: Vec<&str> = preferences.types.iter().map(|p| p.value.as_str()).collect();
        Err(StoreError::NotAcceptable(format!(
            "{stored} cannot be served as any of [{}]",
            requested.join(", ")
        )))
    }

    fn to_internal(&self, representation: Representation) -> StoreResult<Representation> {
        let Some(internal) = self.internal_type.as_deref() else {
            return Ok(representation);
        };
        let supplied = representation.content_type();
        if matches_media_type(internal, supplied) {
            return Ok(representation);
        }
        match self.converters.find(supplied, internal) {
            Some(converter) => {
                debug!(
                    converter = converter.name(),
                    from = %supplied,
                    to = internal,
                    "converting incoming representation"
                );
                converter.convert(representation, internal)
            }
            None => Ok(representation),
        }
    }
}

#[async_trait]
impl ResourceStore for RepresentationConvertingStore {
    async fn get_representation(
        &self,
        id: &ResourceIdentifier,
        preferences: &RepresentationPreferences,
    ) -> StoreResult<Representation> {
        let representation = self.source.get_representation(id, preferences).await?;
        self.negotiate(representation, preferences)
    }

    async fn add_resource(
        &self,
        container: &ResourceIdentifier,
        representation: Representation,
    ) -> StoreResult<ResourceIdentifier> {
        let representation = self.to_internal(representation)?;
        self.source.add_resource(container, representation).await
    }

    async fn set_resource(
        &self,
        id: &ResourceIdentifier,
        representation: Representation,
    ) -> StoreResult<()> {
        let representation = match representation.identifier {
            Some(_) => representation,
            None => representation.with_identifier(id.clone()),
        };
        let representation = self.to_internal(representation)?;
        self.source.set_resource(id, representation).await
    }

    async fn delete_resource(&self, id: &ResourceIdentifier) -> StoreResult<()> {
        self.source.delete_resource(id).await
    }

    async fn modify_resource(&self, id: &ResourceIdentifier, patch: Patch) -> StoreResult<()> {
        self.source.modify_resource(id, patch).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::InMemoryResourceStore;
    use bytes::Bytes;
    use pod_types::content_types::{APPLICATION_N_TRIPLES, INTERNAL_QUADS, TEXT_PLAIN, TEXT_TURTLE};
    use pod_types::RepresentationData;

    const DOC: &str = "@prefix ex: <http://ex.org/>. <> ex:title \"Hello\".";

    fn id(path: &str) -> ResourceIdentifier {
        ResourceIdentifier::new(format!("http://test.com/{path}"))
    }

    fn setup() -> (Arc<InMemoryResourceStore>, RepresentationConvertingStore) {
        let inner = Arc::new(InMemoryResourceStore::new(id("")));
        let store = RepresentationConvertingStore::new(
            inner.clone(),
            Arc::new(ConverterRegistry::with_defaults()),
        )
        .with_internal_type(INTERNAL_QUADS);
        (inner, store)
    }

    fn turtle() -> Representation {
        Representation::binary(TEXT_TURTLE, Bytes::from_static(DOC.as_bytes()))
    }

    // -----------------------------------------------------------------------
    // Writes
    // -----------------------------------------------------------------------

    #[tokio::test]
    async fn rdf_is_stored_as_quads() {
        let (inner, store) = setup();
        store.set_resource(&id("doc"), turtle()).await.unwrap();

        let raw = inner
            .get_representation(&id("doc"), &RepresentationPreferences::any())
            .await
            .unwrap();
        assert_eq!(raw.content_type(), INTERNAL_QUADS);
        let RepresentationData::Quads(triples) = raw.into_data() else {
            panic!("expected quads");
        };
        assert_eq!(triples[0].subject.as_iri(), Some("http://test.com/doc"));
    }

    #[tokio::test]
    async fn non_rdf_is_stored_unchanged() {
        let (inner, store) = setup();
        let rep = Representation::binary(TEXT_PLAIN, Bytes::from_static(b"plain"));
        store.set_resource(&id("note"), rep).await.unwrap();
        let raw = inner
            .get_representation(&id("note"), &RepresentationPreferences::any())
            .await
            .unwrap();
        assert_eq!(raw.content_type(), TEXT_PLAIN);
    }

    #[tokio::test]
    async fn malformed_rdf_is_rejected() {
        let (_, store) = setup();
        let rep = Representation::binary(TEXT_TURTLE, Bytes::from_static(b"<> <p"));
        let err = store.set_resource(&id("doc"), rep).await.unwrap_err();
        assert!(matches!(err, StoreError::MalformedInput(_)));
    }

    #[tokio::test]
    async fn add_converts_too() {
        let (inner, store) = setup();
        let new_id = store.add_resource(&id(""), turtle()).await.unwrap();
        let raw = inner
            .get_representation(&new_id, &RepresentationPreferences::any())
            .await
            .unwrap();
        assert_eq!(raw.content_type(), INTERNAL_QUADS);
    }

    // -----------------------------------------------------------------------
    // Reads
    // -----------------------------------------------------------------------

    #[tokio::test]
    async fn negotiates_requested_type() {
        let (_, store) = setup();
        store.set_resource(&id("doc"), turtle()).await.unwrap();

        let prefs = RepresentationPreferences::parse_accept("application/n-triples").unwrap();
        let rep = store.get_representation(&id("doc"), &prefs).await.unwrap();
        assert_eq!(rep.content_type(), APPLICATION_N_TRIPLES);
        let body = rep.into_bytes().unwrap();
        assert!(std::str::from_utf8(&body).unwrap().contains("\"Hello\""));
    }

    #[tokio::test]
    async fn wildcard_gets_turtle_not_internal() {
        let (_, store) = setup();
        store.set_resource(&id("doc"), turtle()).await.unwrap();
        let prefs = RepresentationPreferences::parse_accept("*/*").unwrap();
        let rep = store.get_representation(&id("doc"), &prefs).await.unwrap();
        assert_eq!(rep.content_type(), TEXT_TURTLE);
    }

    #[tokio::test]
    async fn no_preferences_returns_stored_form() {
        let (_, store) = setup();
        store.set_resource(&id("doc"), turtle()).await.unwrap();
        let rep = store
            .get_representation(&id("doc"), &RepresentationPreferences::any())
            .await
            .unwrap();
        assert_eq!(rep.content_type(), INTERNAL_QUADS);
    }

    #[tokio::test]
    async fn acceptable_original_passes_through() {
        let (_, store) = setup();
        let rep = Representation::binary(TEXT_PLAIN, Bytes::from_static(b"plain"));
        store.set_resource(&id("note"), rep).await.unwrap();
        let prefs = RepresentationPreferences::parse_accept("text/*").unwrap();
        let rep = store.get_representation(&id("note"), &prefs).await.unwrap();
        assert_eq!(rep.content_type(), TEXT_PLAIN);
    }

    #[tokio::test]
    async fn unreachable_type_is_not_acceptable() {
        let (_, store) = setup();
        store.set_resource(&id("doc"), turtle()).await.unwrap();
        let prefs = RepresentationPreferences::single("text/html");
        let err = store.get_representation(&id("doc"), &prefs).await.unwrap_err();
        assert!(matches!(err, StoreError::NotAcceptable(_)));
    }

    #[tokio::test]
    async fn containers_are_served_as_turtle() {
        let (_, store) = setup();
        store.set_resource(&id("a/doc"), turtle()).await.unwrap();
        let prefs = RepresentationPreferences::single(TEXT_TURTLE);
        let rep = store.get_representation(&id("a/"), &prefs).await.unwrap();
        let body = rep.into_bytes().unwrap();
        assert!(std::str::from_utf8(&body)
            .unwrap()
            .contains("<http://test.com/a/doc>"));
    }

    #[tokio::test]
    async fn errors_from_source_pass_through() {
        let (_, store) = setup();
        let err = store
            .get_representation(&id("missing"), &RepresentationPreferences::any())
            .await
            .unwrap_err();
        assert_eq!(err, StoreError::NotFound(id("missing")));
        assert_eq!(
            store.delete_resource(&id("missing")).await.unwrap_err(),
            StoreError::NotFound(id("missing"))
        );
    }
}
