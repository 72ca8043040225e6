use std::sync::Arc;

use async_trait::async_trait;
use pod_rdf::turtle::parse_turtle_bytes;
use pod_store::{ContainerManager, ResourceStore, StoreError};
use pod_types::content_types::{is_rdf_serialization, INTERNAL_QUADS};
use pod_types::{RepresentationData, RepresentationPreferences, ResourceIdentifier};
use tracing::{debug, info};

use crate::acl::{AclManager, AclRule};
use crate::credentials::Credentials;
use crate::error::{AuthError, AuthResult};
use crate::modes::{AccessMode, PermissionSet};

/// Decides what an agent may do with a resource.
#[async_trait]
pub trait Authorizer: Send + Sync {
    /// Every mode `credentials` hold on `id`.
    async fn resolve(
        &self,
        credentials: &Credentials,
        id: &ResourceIdentifier,
    ) -> AuthResult<PermissionSet>;

    /// The modes `credentials` hold on `id`, limited to `requested`.
    async fn get_permissions(
        &self,
        credentials: &Credentials,
        id: &ResourceIdentifier,
        requested: PermissionSet,
    ) -> AuthResult<PermissionSet>;

    /// Fail unless every requested mode is granted.
    ///
    /// Denials are `Unauthorized` for anonymous requests and `Forbidden`
    /// otherwise.
    async fn authorize(
        &self,
        credentials: &Credentials,
        id: &ResourceIdentifier,
        requested: PermissionSet,
    ) -> AuthResult<PermissionSet>;
}

/// Web Access Control authorizer.
///
/// Finds the nearest ACL resource with a rule in scope for the target by
/// walking up the container hierarchy, and grants the union of the modes of
/// that ACL's rules matching the agent. ACL resources themselves require
/// `control` on the resource they govern.
pub struct WebAclAuthorizer {
    acl_manager: Arc<dyn AclManager>,
    container_manager: Arc<dyn ContainerManager>,
    store: Arc<dyn ResourceStore>,
}

impl WebAclAuthorizer {
    pub fn new(
        acl_manager: Arc<dyn AclManager>,
        container_manager: Arc<dyn ContainerManager>,
        store: Arc<dyn ResourceStore>,
    ) -> Self {
        Self {
            acl_manager,
            container_manager,
            store,
        }
    }

    /// The resource whose ACL decides access to `id`, and the modes to check.
    fn target(
        &self,
        id: &ResourceIdentifier,
        requested: PermissionSet,
    ) -> (ResourceIdentifier, PermissionSet) {
        match self.acl_manager.resource_identifier(id) {
            Some(governed) => (governed, PermissionSet::from(AccessMode::Control)),
            None => (id.clone(), requested),
        }
    }

    /// Modes granted by the nearest governing ACL.
    async fn walk(
        &self,
        credentials: &Credentials,
        id: &ResourceIdentifier,
    ) -> AuthResult<PermissionSet> {
        let mut current = id.clone();
        let mut direct = true;
        loop {
            let acl_id = self.acl_manager.acl_identifier(&current);
            if let Some(rules) = self.read_rules(&acl_id).await? {
                let in_scope: Vec<&AclRule> = rules
                    .iter()
                    .filter(|rule| rule.applies_to(&current, direct))
                    .collect();
                if !in_scope.is_empty() {
                    let granted = in_scope
                        .iter()
                        .filter(|rule| rule.matches_agent(credentials))
                        .fold(PermissionSet::empty(), |acc, rule| acc.union(&rule.modes));
                    debug!(
                        resource = %id,
                        acl = %acl_id,
                        rules = in_scope.len(),
                        granted = %granted,
                        "governing ACL found"
                    );
                    return Ok(granted);
                }
                debug!(acl = %acl_id, "ACL has no rule in scope, continuing upward");
            }
            match self.container_manager.get_container(&current) {
                Some(parent) => {
                    current = parent;
                    direct = false;
                }
                None => {
                    debug!(resource = %id, "no ACL up to the root");
                    return Ok(PermissionSet::empty());
                }
            }
        }
    }

    /// Rules of an ACL resource; `None` when it does not exist.
    async fn read_rules(&self, acl_id: &ResourceIdentifier) -> AuthResult<Option<Vec<AclRule>>> {
        let preferences = RepresentationPreferences::single(INTERNAL_QUADS);
        let representation = match self.store.get_representation(acl_id, &preferences).await {
            Ok(representation) => representation,
            Err(StoreError::NotFound(_)) => return Ok(None),
            Err(StoreError::NotAcceptable(_)) => {
                return Err(unreadable_acl(acl_id, "a non-RDF type").into());
            }
            Err(err) => return Err(err.into()),
        };
        let content_type = representation.content_type().to_owned();
        let triples = match representation.data {
            RepresentationData::Quads(triples) => triples,
            RepresentationData::Binary(bytes) if is_rdf_serialization(&content_type) => {
                parse_turtle_bytes(&bytes, Some(acl_id.as_str())).map_err(StoreError::from)?
            }
            RepresentationData::Binary(_) => {
                return Err(unreadable_acl(acl_id, &content_type).into());
            }
        };
        Ok(Some(AclRule::from_triples(triples)))
    }
}

#[async_trait]
impl Authorizer for WebAclAuthorizer {
    async fn resolve(
        &self,
        credentials: &Credentials,
        id: &ResourceIdentifier,
    ) -> AuthResult<PermissionSet> {
        match self.acl_manager.resource_identifier(id) {
            Some(governed) => {
                let on_resource = self.walk(credentials, &governed).await?;
                Ok(if on_resource.control {
                    PermissionSet::from(AccessMode::Control)
                } else {
                    PermissionSet::empty()
                })
            }
            None => self.walk(credentials, id).await,
        }
    }

    async fn get_permissions(
        &self,
        credentials: &Credentials,
        id: &ResourceIdentifier,
        requested: PermissionSet,
    ) -> AuthResult<PermissionSet> {
        let (start, required) = self.target(id, requested);
        let granted = self.walk(credentials, &start).await?;
        Ok(granted.intersect(&required))
    }

    async fn authorize(
        &self,
        credentials: &Credentials,
        id: &ResourceIdentifier,
        requested: PermissionSet,
    ) -> AuthResult<PermissionSet> {
        let (_, required) = self.target(id, requested);
        let granted = self.get_permissions(credentials, id, requested).await?;
        if granted.covers(&required) {
            debug!(resource = %id, required = %required, "access granted");
            return Ok(granted);
        }
        info!(
            resource = %id,
            required = %required,
            agent = credentials.web_id.as_deref().unwrap_or("anonymous"),
            "access denied"
        );
        match &credentials.web_id {
            None => Err(AuthError::Unauthorized {
                identifier: id.clone(),
                required,
            }),
            Some(agent) => Err(AuthError::Forbidden {
                agent: agent.clone(),
                identifier: id.clone(),
                required,
            }),
        }
    }
}

/// An ACL resource stored as something other than RDF.
fn unreadable_acl(acl_id: &ResourceIdentifier, content_type: &str) -> StoreError {
    StoreError::Internal(format!("ACL {acl_id} is stored as {content_type}, not RDF"))
}
