use async_trait::async_trait;
use pod_types::{Representation, RepresentationPreferences, ResourceIdentifier};

use crate::error::{StoreError, StoreResult};
use crate::patch::Patch;

/// The uniform store contract.
///
/// Leaf back-ends implement the four base operations; decorators implement
/// all of them and hold the next store in the chain. Implementations must
/// provide per-identifier read-after-write consistency within one process.
#[async_trait]
pub trait ResourceStore: Send + Sync {
    /// Fetch a representation of `id`.
    ///
    /// Back-ends may ignore `preferences`; negotiation is the converting
    /// store's job. Returns `NotFound` if `id` has no representation.
    async fn get_representation(
        &self,
        id: &ResourceIdentifier,
        preferences: &RepresentationPreferences,
    ) -> StoreResult<Representation>;

    /// Create a new child of `container` and return its identifier.
    async fn add_resource(
        &self,
        container: &ResourceIdentifier,
        representation: Representation,
    ) -> StoreResult<ResourceIdentifier>;

    /// Create or replace `id`.
    async fn set_resource(
        &self,
        id: &ResourceIdentifier,
        representation: Representation,
    ) -> StoreResult<()>;

    /// Remove `id`. Returns `NotFound` if it does not exist.
    async fn delete_resource(&self, id: &ResourceIdentifier) -> StoreResult<()>;

    /// Apply a patch to `id`.
    ///
    /// Synthesized by [`crate::PatchingStore`]; leaf back-ends do not
    /// support it.
    async fn modify_resource(&self, id: &ResourceIdentifier, patch: Patch) -> StoreResult<()> {
        let _ = patch;
        Err(StoreError::NotImplemented(format!("patching {id}")))
    }

    /// Whether `id` currently has a representation.
    async fn exists(&self, id: &ResourceIdentifier) -> StoreResult<bool> {
        match self
            .get_representation(id, &RepresentationPreferences::any())
            .await
        {
            Ok(_) => Ok(true),
            Err(StoreError::NotFound(_)) => Ok(false),
            Err(err) => Err(err),
        }
    }
}
