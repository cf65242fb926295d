//! In-memory repository implementation.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;

use refdata_core::reference::{RefDataType, ReferenceDataItem};
use refdata_core::storage::{ReferenceDataRepository, RepositoryError, Result};

/// In-memory storage backend for tests and seeding.
///
/// Items are held per type in `Arc<RwLock<_>>`; clones share the same data.
#[derive(Debug, Clone, Default)]
pub struct InMemoryRepository {
    items: Arc<RwLock<HashMap<RefDataType, Vec<ReferenceDataItem>>>>,
}

impl InMemoryRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces all items of `ty`.
    pub async fn insert(&self, ty: RefDataType, items: Vec<ReferenceDataItem>) {
        self.items.write().await.insert(ty, items);
    }

    /// Appends a single item to `ty`.
    pub async fn push(&self, ty: &RefDataType, item: ReferenceDataItem) {
        self.items
            .write()
            .await
            .entry(ty.clone())
            .or_default()
            .push(item);
    }

    /// Types that currently hold items.
    pub async fn types(&self) -> Vec<RefDataType> {
        self.items.read().await.keys().cloned().collect()
    }
}

#[async_trait]
impl ReferenceDataRepository for InMemoryRepository {
    async fn load_items(&self, ty: &RefDataType) -> Result<Vec<ReferenceDataItem>> {
        let items = self.items.read().await;
        items
            .get(ty)
            .cloned()
            .ok_or_else(|| RepositoryError::NotFound {
                entity_type: "ReferenceDataType",
                id: ty.full_name().to_string(),
            })
    }
}
