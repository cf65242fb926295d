use async_trait::async_trait;

use crate::reference::{RefDataType, ReferenceDataCollection};

use super::{LoadContext, LoadError};

/// A source of reference-data collections.
///
/// Each provider declares the types it serves; the orchestrator routes loads
/// for those types to it and caches what it returns.
#[async_trait]
pub trait ReferenceDataProvider: Send + Sync {
    /// Types this provider is responsible for.
    fn types(&self) -> Vec<RefDataType>;

    /// Materializes a fully populated collection for `ty`.
    ///
    /// The returned collection must be for `ty`; anything else is treated as
    /// a failed load.
    async fn get(
        &self,
        ty: &RefDataType,
        ctx: &LoadContext,
    ) -> Result<ReferenceDataCollection, LoadError>;

    /// Hint that `types` (none of them currently cached) are about to be
    /// loaded.
    async fn prefetch(&self, _types: &[RefDataType]) -> Result<(), LoadError> {
        Ok(())
    }
}
