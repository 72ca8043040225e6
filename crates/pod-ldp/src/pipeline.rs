use std::sync::Arc;

use pod_auth::{AclManager, Authorizer, UrlBasedAclManager, WebAclAuthorizer};
use pod_store::{
    InMemoryResourceStore, KeyedResourceLocker, PatchingStore, RepresentationConvertingStore,
    ResourceStore, SparqlUpdatePatchHandler, UrlContainerManager,
};
use pod_types::ResourceIdentifier;
use tracing::info;

use crate::config::PodConfig;
use crate::error::LdpResult;
use crate::handler::LdpHandler;

/// The assembled store chain and authorizer of one pod.
pub struct PodPipeline {
    config: PodConfig,
    root: ResourceIdentifier,
    store: Arc<dyn ResourceStore>,
    authorizer: Arc<dyn Authorizer>,
    acl_manager: Arc<dyn AclManager>,
}

impl PodPipeline {
    /// Pipeline over a fresh [`InMemoryResourceStore`].
    pub fn in_memory(config: PodConfig) -> LdpResult<Self> {
        let root = config.root()?;
        let backend = Arc::new(InMemoryResourceStore::new(root));
        Self::with_backend(config, backend)
    }

    /// Pipeline over an existing leaf store.
    pub fn with_backend(config: PodConfig, backend: Arc<dyn ResourceStore>) -> LdpResult<Self> {
        config.validate()?;
        let root = config.root()?;

        let locker = match config.lock_timeout() {
            Some(timeout) => KeyedResourceLocker::with_timeout(timeout),
            None => KeyedResourceLocker::new(),
        };
        let patch_handler = if config.create_on_patch {
            SparqlUpdatePatchHandler::new()
        } else {
            SparqlUpdatePatchHandler::without_create()
        };
        let patching = Arc::new(PatchingStore::new(
            backend,
            Arc::new(patch_handler),
            Arc::new(locker),
        ));
        let converters = Arc::new(config.converter_registry()?);
        let store: Arc<dyn ResourceStore> = Arc::new(
            RepresentationConvertingStore::new(patching, converters)
                .with_internal_type(config.internal_type.clone()),
        );

        let acl_manager: Arc<dyn AclManager> =
            Arc::new(UrlBasedAclManager::new(config.acl_suffix.clone()));
        let authorizer: Arc<dyn Authorizer> = Arc::new(WebAclAuthorizer::new(
            Arc::clone(&acl_manager),
            Arc::new(UrlContainerManager::new(root.clone())),
            Arc::clone(&store),
        ));

        info!(
            root = %root,
            converters = ?config.converters,
            internal_type = %config.internal_type,
            "pod pipeline assembled"
        );
        Ok(Self {
            config,
            root,
            store,
            authorizer,
            acl_manager,
        })
    }

    pub fn config(&self) -> &PodConfig {
        &self.config
    }

    pub fn root(&self) -> &ResourceIdentifier {
        &self.root
    }

    /// The outermost store. Writes through it bypass authorization.
    pub fn store(&self) -> Arc<dyn ResourceStore> {
        Arc::clone(&self.store)
    }

    pub fn authorizer(&self) -> Arc<dyn Authorizer> {
        Arc::clone(&self.authorizer)
    }

    /// Resolve a path or absolute URL against the pod root.
    pub fn resolve(&self, path: &str) -> ResourceIdentifier {
        if path.contains("://") {
            return ResourceIdentifier::new(path);
        }
        let root = self.root.as_str();
        ResourceIdentifier::new(format!("{root}{}", path.trim_start_matches('/')))
    }

    pub fn handler(&self) -> LdpHandler {
        LdpHandler::new(
            self.store(),
            self.authorizer(),
            Arc::clone(&self.acl_manager),
            self.config.auth_scheme.clone(),
        )
    }
}

impl std::fmt::Debug for PodPipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PodPipeline")
            .field("root", &self.root)
            .field("config", &self.config)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pod_auth::Credentials;
    use pod_store::{Patch, StoreError};
    use pod_types::content_types::{INTERNAL_QUADS, TEXT_PLAIN, TEXT_TURTLE};
    use pod_types::{Representation, RepresentationPreferences};
    use std::time::Duration;

    fn config() -> PodConfig {
        PodConfig {
            base_url: "http://test.com/".into(),
            ..PodConfig::default()
        }
    }

    #[tokio::test]
    async fn store_chain_converts_and_patches() {
        let pod = PodPipeline::in_memory(config()).unwrap();
        let store = pod.store();
        let doc = pod.resolve("/notes/doc");
        store
            .set_resource(&doc, Representation::binary(TEXT_TURTLE, "<> <#p> <#o>."))
            .await
            .unwrap();
        store
            .modify_resource(&doc, Patch::sparql_update("INSERT DATA { <> <#p> <#o2> }"))
            .await
            .unwrap();

        let rep = store
            .get_representation(&doc, &RepresentationPreferences::single(INTERNAL_QUADS))
            .await
            .unwrap();
        assert_eq!(rep.data.len(), 2);
    }

    #[tokio::test]
    async fn create_on_patch_follows_config() {
        let pod = PodPipeline::in_memory(PodConfig {
            create_on_patch: false,
            ..config()
        })
        .unwrap();
        let err = pod
            .store()
            .modify_resource(&pod.resolve("new"), Patch::sparql_update("INSERT DATA { <> <#p> 1 }"))
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::NotFound(_)));
    }

    #[tokio::test]
    async fn authorizer_reads_acls_through_the_chain() {
        let pod = PodPipeline::in_memory(PodConfig {
            acl_suffix: ".access".into(),
            lock_timeout_ms: Some(100),
            ..config()
        })
        .unwrap();
        assert_eq!(pod.config().lock_timeout(), Some(Duration::from_millis(100)));

        let acl = "@prefix acl: <http://www.w3.org/ns/auth/acl#>.\n\
                   <#r> acl:agentClass <http://xmlns.com/foaf/0.1/Agent>; \
                   acl:mode acl:Read; acl:default <./>.";
        pod.store()
            .set_resource(&pod.resolve(".access"), Representation::binary(TEXT_TURTLE, acl))
            .await
            .unwrap();

        let granted = pod
            .authorizer()
            .resolve(&Credentials::anonymous(), &pod.resolve("x/y"))
            .await
            .unwrap();
        assert!(granted.read);
        assert!(!granted.write);
    }

    #[test]
    fn resolve_paths() {
        let pod = PodPipeline::in_memory(config()).unwrap();
        assert_eq!(pod.resolve("/a/b").as_str(), "http://test.com/a/b");
        assert_eq!(pod.resolve("a/").as_str(), "http://test.com/a/");
        assert_eq!(pod.resolve("").as_str(), "http://test.com/");
        assert_eq!(pod.resolve("http://test.com/x").as_str(), "http://test.com/x");
        assert!(format!("{pod:?}").contains("http://test.com/"));
    }

    #[tokio::test]
    async fn custom_backend_is_used() {
        let backend = Arc::new(InMemoryResourceStore::new(ResourceIdentifier::new(
            "http://test.com/",
        )));
        let pod = PodPipeline::with_backend(config(), backend.clone()).unwrap();
        pod.store()
            .set_resource(&pod.resolve("t"), Representation::binary(TEXT_PLAIN, "x"))
            .await
            .unwrap();
        assert_eq!(backend.len(), 2);
    }

    #[test]
    fn invalid_config_is_rejected() {
        let err = PodPipeline::in_memory(PodConfig {
            converters: vec!["nope".into()],
            ..config()
        })
        .unwrap_err();
        assert!(matches!(err, crate::LdpError::Config(_)));
    }
}
