use async_trait::async_trait;

use crate::reference::{RefDataType, ReferenceDataItem};

use super::Result;

/// Backing store for reference-data items.
#[async_trait]
pub trait ReferenceDataRepository: Send + Sync {
    /// Loads every item of `ty`, in store order.
    async fn load_items(&self, ty: &RefDataType) -> Result<Vec<ReferenceDataItem>>;
}
