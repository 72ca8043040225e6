use std::sync::Arc;

use async_trait::async_trait;
use pod_types::{Representation, RepresentationPreferences, ResourceIdentifier};
use tracing::{debug, warn};

use crate::error::{StoreError, StoreResult};
use crate::locker::ResourceLocker;
use crate::patch::{Patch, PatchHandler};
use crate::traits::ResourceStore;

/// Store decorator that synthesizes `modify_resource` as an atomic
/// read-modify-write.
///
/// The four base operations are forwarded unchanged. Patches on one
/// identifier are serialized through the locker; once the lock is held the
/// patch runs on its own task, so dropping the caller's future cannot leave
/// a half-applied patch behind.
pub struct PatchingStore {
    source: Arc<dyn ResourceStore>,
    handler: Arc<dyn PatchHandler>,
    locker: Arc<dyn ResourceLocker>,
}

impl PatchingStore {
    pub fn new(
        source: Arc<dyn ResourceStore>,
        handler: Arc<dyn PatchHandler>,
        locker: Arc<dyn ResourceLocker>,
    ) -> Self {
        Self {
            source,
            handler,
            locker,
        }
    }
}

async fn read_modify_write(
    source: Arc<dyn ResourceStore>,
    handler: Arc<dyn PatchHandler>,
    id: ResourceIdentifier,
    patch: Patch,
) -> StoreResult<()> {
    let preferences = RepresentationPreferences::single(handler.preferred_input());
    let current = match source.get_representation(&id, &preferences).await {
        Ok(representation) => Some(representation),
        Err(StoreError::NotFound(_)) if handler.supports_create() => {
            debug!(resource = %id, "patching a new resource");
            None
        }
        Err(err) => return Err(err),
    };
    let updated = handler.apply(&id, current, &patch)?;
    source.set_resource(&id, updated).await
}

#[async_trait]
impl ResourceStore for PatchingStore {
    async fn get_representation(
        &self,
        id: &ResourceIdentifier,
        preferences: &RepresentationPreferences,
    ) -> StoreResult<Representation> {
        self.source.get_representation(id, preferences).await
    }

    async fn add_resource(
        &self,
        container: &ResourceIdentifier,
        representation: Representation,
    ) -> StoreResult<ResourceIdentifier> {
        self.source.add_resource(container, representation).await
    }

    async fn set_resource(
        &self,
        id: &ResourceIdentifier,
        representation: Representation,
    ) -> StoreResult<()> {
        self.source.set_resource(id, representation).await
    }

    async fn delete_resource(&self, id: &ResourceIdentifier) -> StoreResult<()> {
        self.source.delete_resource(id).await
    }

    async fn modify_resource(&self, id: &ResourceIdentifier, patch: Patch) -> StoreResult<()> {
        let guard = self.locker.acquire(id).await?;
        let source = Arc::clone(&self.source);
        let handler = Arc::clone(&self.handler);
        let target = id.clone();

        let task = tokio::spawn(async move {
            let result = read_modify_write(source, handler, target, patch).await;
            drop(guard);
            result
        });
        let result = task
            .await
            .map_err(|err| StoreError::Internal(format!("patch task failed: {err}")))?;
        match &result {
            Ok(()) => debug!(resource = %id, "patch applied"),
            Err(err) => warn!(resource = %id, error = %err, "patch failed"),
        }
        result
    }
}
