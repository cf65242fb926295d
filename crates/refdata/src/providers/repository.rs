use async_trait::async_trait;

use refdata_core::provider::{LoadContext, LoadError, ReferenceDataProvider};
use refdata_core::reference::{RefDataType, ReferenceDataCollection};
use refdata_core::storage::ReferenceDataRepository;

/// Provider that builds collections from a [`ReferenceDataRepository`].
///
/// Serves a fixed list of types; every load reads the repository and indexes
/// the items into a fresh collection, so duplicate ids or codes in the store
/// surface as a failed load.
pub struct RepositoryProvider<R>
where
    R: ReferenceDataRepository,
{
    repository: R,
    types: Vec<RefDataType>,
}

impl<R> RepositoryProvider<R>
where
    R: ReferenceDataRepository,
{
    pub fn new(repository: R, types: impl IntoIterator<Item = RefDataType>) -> Self {
        Self {
            repository,
            types: types.into_iter().collect(),
        }
    }

    pub fn repository(&self) -> &R {
        &self.repository
    }
}

#[async_trait]
impl<R> ReferenceDataProvider for RepositoryProvider<R>
where
    R: ReferenceDataRepository + 'static,
{
    fn types(&self) -> Vec<RefDataType> {
        self.types.clone()
    }

    async fn get(
        &self,
        ty: &RefDataType,
        ctx: &LoadContext,
    ) -> Result<ReferenceDataCollection, LoadError> {
        if !self.types.contains(ty) {
            return Err(LoadError::UnsupportedType(ty.full_name().to_string()));
        }

        let items = self.repository.load_items(ty).await?;
        tracing::trace!(
            load_id = %ctx.load_id,
            type_name = %ty.name(),
            count = items.len(),
            "repository returned items"
        );

        Ok(ReferenceDataCollection::from_items(ty.clone(), items)?)
    }
}
