//! Read-only repository backed by a JSON seed file.
//!
//! ```json
//! {
//!   "types": [
//!     {
//!       "type": "geo::Country",
//!       "name": "Country",
//!       "idKind": "int32",
//!       "items": [{ "id": 1, "code": "AU", "text": "Australia" }]
//!     }
//!   ]
//! }
//! ```
//!
//! `type` defaults to `name` when omitted. Ids are coerced to the declared
//! `idKind` at load time.

use std::collections::HashMap;
use std::path::Path;

use async_trait::async_trait;
use serde::Deserialize;

use refdata_core::reference::{IdKind, RefDataType, ReferenceDataItem};
use refdata_core::storage::{ReferenceDataRepository, RepositoryError, Result};

#[derive(Debug, Deserialize)]
struct SeedFile {
    types: Vec<SeedType>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SeedType {
    #[serde(rename = "type")]
    full_name: Option<String>,
    name: String,
    id_kind: IdKind,
    #[serde(default)]
    items: Vec<ReferenceDataItem>,
}

/// Repository serving items parsed once from a seed document.
#[derive(Debug, Clone, Default)]
pub struct JsonFileRepository {
    types: Vec<RefDataType>,
    items: HashMap<RefDataType, Vec<ReferenceDataItem>>,
}

impl JsonFileRepository {
    /// Reads and parses the seed file at `path`.
    pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let contents = tokio::fs::read_to_string(path)
            .await
            .map_err(|e| RepositoryError::ConnectionFailed(format!("{}: {}", path.display(), e)))?;
        tracing::debug!(path = %path.display(), bytes = contents.len(), "read seed file");
        Self::parse(&contents)
    }

    /// Parses a seed document.
    pub fn parse(json: &str) -> Result<Self> {
        let seed: SeedFile = serde_json::from_str(json)
            .map_err(|e| RepositoryError::Serialization(e.to_string()))?;

        let mut repository = Self::default();
        for seed_type in seed.types {
            let full_name = seed_type
                .full_name
                .unwrap_or_else(|| seed_type.name.clone());
            let ty = RefDataType::new(full_name, seed_type.name, seed_type.id_kind);
            if repository.items.contains_key(&ty) {
                return Err(RepositoryError::InvalidData(format!(
                    "type {} is declared more than once",
                    ty.full_name()
                )));
            }

            let items = seed_type
                .items
                .into_iter()
                .map(|item| coerce_id(&ty, item))
                .collect::<Result<Vec<_>>>()?;

            repository.types.push(ty.clone());
            repository.items.insert(ty, items);
        }
        Ok(repository)
    }

    /// Declared types, in file order.
    pub fn types(&self) -> &[RefDataType] {
        &self.types
    }
}

fn coerce_id(ty: &RefDataType, mut item: ReferenceDataItem) -> Result<ReferenceDataItem> {
    if let Some(id) = item.id.take() {
        let shown = id.to_string();
        let coerced = id.coerce(ty.id_kind()).ok_or_else(|| {
            RepositoryError::InvalidData(format!(
                "{}: id {} is not a valid {}",
                ty.name(),
                shown,
                ty.id_kind()
            ))
        })?;
        item.id = Some(coerced);
    }
    Ok(item)
}

#[async_trait]
impl ReferenceDataRepository for JsonFileRepository {
    async fn load_items(&self, ty: &RefDataType) -> Result<Vec<ReferenceDataItem>> {
        self.items
            .get(ty)
            .cloned()
            .ok_or_else(|| RepositoryError::NotFound {
                entity_type: "ReferenceDataType",
                id: ty.full_name().to_string(),
            })
    }
}
