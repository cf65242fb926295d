use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use refdata_core::provider::ReferenceDataProvider;
use refdata_core::reference::RefDataType;

use crate::error::{OrchestratorError, Result};

/// Type → provider and lowercase name → type mappings.
///
/// Only ever mutated through [`Registry::register`], which is
/// all-or-nothing per provider.
#[derive(Default)]
pub(crate) struct Registry {
    providers: HashMap<RefDataType, Arc<dyn ReferenceDataProvider>>,
    names: HashMap<String, RefDataType>,
}

impl Registry {
    /// Registers every type `provider` declares, or none of them.
    pub(crate) fn register(
        &mut self,
        provider: Arc<dyn ReferenceDataProvider>,
    ) -> Result<Vec<RefDataType>> {
        let types = provider.types();

        let mut seen_types = HashSet::new();
        let mut seen_names: HashMap<String, &RefDataType> = HashMap::new();
        for ty in &types {
            if self.providers.contains_key(ty) || !seen_types.insert(ty) {
                return Err(OrchestratorError::DuplicateType {
                    type_name: ty.full_name().to_string(),
                });
            }

            let name = ty.lookup_name();
            let existing = self
                .names
                .get(&name)
                .or_else(|| seen_names.get(&name).copied());
            if let Some(existing) = existing {
                return Err(OrchestratorError::DuplicateName {
                    name: ty.name().to_string(),
                    existing: existing.full_name().to_string(),
                });
            }
            seen_names.insert(name, ty);
        }

        for ty in &types {
            self.names.insert(ty.lookup_name(), ty.clone());
            self.providers.insert(ty.clone(), provider.clone());
        }
        Ok(types)
    }

    pub(crate) fn provider(&self, ty: &RefDataType) -> Option<Arc<dyn ReferenceDataProvider>> {
        self.providers.get(ty).cloned()
    }

    pub(crate) fn resolve(&self, name: &str) -> Option<&RefDataType> {
        self.names.get(&name.to_lowercase())
    }

    pub(crate) fn contains(&self, ty: &RefDataType) -> bool {
        self.providers.contains_key(ty)
    }

    /// Registered types, ordered by name.
    pub(crate) fn types(&self) -> Vec<RefDataType> {
        let mut types: Vec<RefDataType> = self.providers.keys().cloned().collect();
        types.sort_by_key(|ty| ty.lookup_name());
        types
    }
}
