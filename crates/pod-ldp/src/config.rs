use std::path::Path;
use std::time::Duration;

use pod_auth::header::DEFAULT_AUTH_SCHEME;
use pod_auth::UrlBasedAclManager;
use pod_store::ConverterRegistry;
use pod_types::content_types::INTERNAL_QUADS;
use pod_types::ResourceIdentifier;
use serde::{Deserialize, Serialize};

use crate::error::{LdpError, LdpResult};

/// Configuration of one pod.
///
/// Every field has a default, so a TOML file only needs the keys it
/// changes:
///
/// ```toml
/// base_url = "https://pod.example/"
/// converters = ["turtle-to-quads", "quads-to-rdf"]
/// lock_timeout_ms = 5000
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PodConfig {
    /// Root container of the pod. Must end with `/`.
    pub base_url: String,
    /// Content-type RDF is converted to before it is stored.
    pub internal_type: String,
    /// Converter names in selection order.
    pub converters: Vec<String>,
    /// Suffix naming the ACL resource of a resource.
    pub acl_suffix: String,
    /// `WWW-Authenticate` value sent on anonymous denials.
    pub auth_scheme: String,
    /// Bound on waiting for a patch lock. `None` waits indefinitely.
    pub lock_timeout_ms: Option<u64>,
    /// Whether PATCH on a missing resource creates it.
    pub create_on_patch: bool,
}

impl Default for PodConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:3000/".into(),
            internal_type: INTERNAL_QUADS.into(),
            converters: vec!["turtle-to-quads".into(), "quads-to-rdf".into()],
            acl_suffix: UrlBasedAclManager::DEFAULT_SUFFIX.into(),
            auth_scheme: DEFAULT_AUTH_SCHEME.into(),
            lock_timeout_ms: None,
            create_on_patch: true,
        }
    }
}

impl PodConfig {
    /// Parse and validate TOML.
    pub fn from_toml_str(input: &str) -> LdpResult<Self> {
        let config: PodConfig =
            toml::from_str(input).map_err(|err| LdpError::Config(err.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a TOML file.
    pub fn load(path: &Path) -> LdpResult<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_toml_str(&text)
            .map_err(|err| LdpError::Config(format!("{}: {err}", path.display())))
    }

    pub fn to_toml_string(&self) -> LdpResult<String> {
        toml::to_string_pretty(self).map_err(|err| LdpError::Config(err.to_string()))
    }

    pub fn validate(&self) -> LdpResult<()> {
        let root = self.root()?;
        if !root.is_container() {
            return Err(LdpError::Config(format!(
                "base_url must end with '/': {root}"
            )));
        }
        if self.acl_suffix.is_empty() || self.acl_suffix.contains('/') {
            return Err(LdpError::Config(format!(
                "invalid acl_suffix {:?}",
                self.acl_suffix
            )));
        }
        if self.internal_type.split_once('/').is_none() {
            return Err(LdpError::Config(format!(
                "internal_type is not a content-type: {}",
                self.internal_type
            )));
        }
        for name in &self.converters {
            if ConverterRegistry::builtin(name).is_none() {
                return Err(LdpError::Config(format!("unknown converter: {name}")));
            }
        }
        Ok(())
    }

    /// The root container.
    pub fn root(&self) -> LdpResult<ResourceIdentifier> {
        ResourceIdentifier::parse(&self.base_url)
            .map_err(|err| LdpError::Config(format!("base_url: {err}")))
    }

    /// The converter registry, in configured order.
    pub fn converter_registry(&self) -> LdpResult<ConverterRegistry> {
        let mut registry = ConverterRegistry::new();
        for name in &self.converters {
            let converter = ConverterRegistry::builtin(name)
                .ok_or_else(|| LdpError::Config(format!("unknown converter: {name}")))?;
            registry.push(converter);
        }
        Ok(registry)
    }

    pub fn lock_timeout(&self) -> Option<Duration> {
        self.lock_timeout_ms.map(Duration::from_millis)
    }
}
