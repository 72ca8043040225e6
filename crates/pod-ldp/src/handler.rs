use std::sync::Arc;

use pod_auth::header::{challenge, wac_allow, WAC_ALLOW};
use pod_auth::{AclManager, Authorizer, Credentials};
use pod_store::{Patch, ResourceStore};
use pod_types::content_types::TEXT_PLAIN;
use pod_types::{Representation, RepresentationData, RepresentationPreferences, ResourceIdentifier};
use tracing::{debug, warn};

use crate::error::{LdpError, LdpResult};
use crate::operation::{Method, Operation, ResponseDescription};

/// Authorizes operations and runs them against the store chain.
#[derive(Clone)]
pub struct LdpHandler {
    store: Arc<dyn ResourceStore>,
    authorizer: Arc<dyn Authorizer>,
    acl_manager: Arc<dyn AclManager>,
    auth_scheme: String,
}

impl LdpHandler {
    pub fn new(
        store: Arc<dyn ResourceStore>,
        authorizer: Arc<dyn Authorizer>,
        acl_manager: Arc<dyn AclManager>,
        auth_scheme: impl Into<String>,
    ) -> Self {
        Self {
            store,
            authorizer,
            acl_manager,
            auth_scheme: auth_scheme.into(),
        }
    }

    /// Run `operation` on behalf of `credentials`.
    ///
    /// Nothing reaches the store unless the authorizer grants every mode
    /// the operation requires on its target. A POST naming an ACL resource
    /// through its slug also needs control over the resource that ACL
    /// governs.
    pub async fn execute(
        &self,
        credentials: &Credentials,
        operation: Operation,
    ) -> LdpResult<ResponseDescription> {
        let required = operation.required_modes();
        self.authorizer
            .authorize(credentials, &operation.target, required)
            .await?;
        if let Some(child) = operation.requested_child() {
            if self.acl_manager.is_acl(&child) {
                self.authorizer
                    .authorize(credentials, &child, required)
                    .await?;
            }
        }
        debug!(
            method = %operation.method,
            target = %operation.target,
            required = %required,
            "operation authorized"
        );

        let target = operation.target.clone();
        let mut response = self.dispatch(operation).await?;
        if response.status != 201 {
            self.describe_permissions(credentials, &target, &mut response)
                .await?;
        }
        Ok(response)
    }

    /// [`Self::execute`], with failures turned into error responses.
    pub async fn handle(&self, credentials: &Credentials, operation: Operation) -> ResponseDescription {
        let method = operation.method;
        let target = operation.target.clone();
        match self.execute(credentials, operation).await {
            Ok(response) => response,
            Err(err) => self.error_response(method, &target, err),
        }
    }

    async fn dispatch(&self, operation: Operation) -> LdpResult<ResponseDescription> {
        let Operation {
            method,
            target,
            preferences,
            body,
        } = operation;
        let preferences = if preferences.is_empty() {
            RepresentationPreferences::from_types(&[("*/*", 1.0)])
        } else {
            preferences
        };

        match method {
            Method::Get => {
                let representation = self.store.get_representation(&target, &preferences).await?;
                Ok(ResponseDescription::ok(representation))
            }
            Method::Head => {
                let representation = self.store.get_representation(&target, &preferences).await?;
                Ok(ResponseDescription::ok_head(&representation))
            }
            Method::Post => {
                let body = require_body(method, body)?;
                let created = self.store.add_resource(&target, body).await?;
                Ok(ResponseDescription::created(&created))
            }
            Method::Put => {
                let body = require_body(method, body)?;
                self.store.set_resource(&target, body).await?;
                Ok(ResponseDescription::reset())
            }
            Method::Patch => {
                let patch = into_patch(require_body(method, body)?)?;
                self.store.modify_resource(&target, patch).await?;
                Ok(ResponseDescription::reset())
            }
            Method::Delete => {
                self.store.delete_resource(&target).await?;
                Ok(ResponseDescription::reset())
            }
        }
    }

    async fn describe_permissions(
        &self,
        credentials: &Credentials,
        target: &ResourceIdentifier,
        response: &mut ResponseDescription,
    ) -> LdpResult<()> {
        let user = self.authorizer.resolve(credentials, target).await?;
        let public = if credentials.is_authenticated() {
            self.authorizer
                .resolve(&Credentials::anonymous(), target)
                .await?
        } else {
            user
        };
        response.set_header(WAC_ALLOW, wac_allow(&user, &public));
        Ok(())
    }

    fn error_response(
        &self,
        method: Method,
        target: &ResourceIdentifier,
        err: LdpError,
    ) -> ResponseDescription {
        let status = err.status();
        if status >= 500 {
            warn!(method = %method, target = %target, error = %err, "operation failed");
        } else {
            debug!(method = %method, target = %target, status, error = %err, "operation rejected");
        }

        let mut response = ResponseDescription::new(status);
        if err.is_unauthorized() {
            let (name, value) = challenge(&self.auth_scheme);
            response.set_header(name, value);
        }
        let message = Representation::binary(TEXT_PLAIN, err.to_string());
        response.set_header("Content-Type", TEXT_PLAIN);
        response.body = Some(message);
        response
    }
}

impl std::fmt::Debug for LdpHandler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LdpHandler")
            .field("auth_scheme", &self.auth_scheme)
            .finish_non_exhaustive()
    }
}

fn require_body(method: Method, body: Option<Representation>) -> LdpResult<Representation> {
    body.ok_or_else(|| LdpError::BadRequest(format!("{method} requires a body")))
}

fn into_patch(body: Representation) -> LdpResult<Patch> {
    let content_type = body.content_type().to_owned();
    match body.into_data() {
        RepresentationData::Binary(bytes) => Ok(Patch::new(content_type, bytes)),
        RepresentationData::Quads(_) => Err(LdpError::BadRequest(
            "PATCH body must be a serialized patch document".into(),
        )),
    }
}
