use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use serde::{Serialize, Serializer};

use refdata_core::filter::get_with_filter;
use refdata_core::reference::{ReferenceDataItem, ValidityContext};

use crate::error::Result;

use super::ReferenceDataOrchestrator;

/// Filtered item lists keyed by case-insensitive reference-data name.
///
/// Serializes as a map from registered name to items, ordered by name.
#[derive(Debug, Clone, Default)]
pub struct NamedReferenceData {
    entries: HashMap<String, (String, Vec<Arc<ReferenceDataItem>>)>,
}

impl NamedReferenceData {
    pub fn get(&self, name: &str) -> Option<&[Arc<ReferenceDataItem>]> {
        self.entries
            .get(&name.to_lowercase())
            .map(|(_, items)| items.as_slice())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(&name.to_lowercase())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Registered names present, in no particular order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.values().map(|(name, _)| name.as_str())
    }

    fn insert(&mut self, name: &str, items: Vec<Arc<ReferenceDataItem>>) {
        self.entries
            .insert(name.to_lowercase(), (name.to_string(), items));
    }
}

impl Serialize for NamedReferenceData {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let ordered: BTreeMap<&str, Vec<&ReferenceDataItem>> = self
            .entries
            .values()
            .map(|(name, items)| (name.as_str(), items.iter().map(Arc::as_ref).collect()))
            .collect();
        ordered.serialize(serializer)
    }
}

impl ReferenceDataOrchestrator {
    /// Returns the items of each named type, as of `ctx`.
    ///
    /// All types are prefetched together first. Without `include_inactive`
    /// each list is exactly the type's active items. Unknown names are
    /// left out of the result.
    pub async fn get_named<S: AsRef<str>>(
        &self,
        names: &[S],
        include_inactive: bool,
        ctx: &ValidityContext,
    ) -> Result<NamedReferenceData> {
        let requests: Vec<(&str, Vec<&str>)> = names
            .iter()
            .map(|name| (name.as_ref(), Vec::new()))
            .collect();
        self.get_named_with_codes(&requests, include_inactive, ctx)
            .await
    }

    /// Like [`get_named`](Self::get_named), narrowing each type to the given
    /// codes. An empty code list selects every item. When a name appears
    /// more than once the last request wins.
    pub async fn get_named_with_codes<N, C>(
        &self,
        requests: &[(N, Vec<C>)],
        include_inactive: bool,
        ctx: &ValidityContext,
    ) -> Result<NamedReferenceData>
    where
        N: AsRef<str>,
        C: AsRef<str>,
    {
        let names: Vec<&str> = requests.iter().map(|(name, _)| name.as_ref()).collect();
        self.prefetch(&names).await?;

        let mut named = NamedReferenceData::default();
        for (name, codes) in requests {
            let Some(ty) = self.resolve_name(name.as_ref()) else {
                continue;
            };
            let Some(collection) = self.get_by_type(&ty).await? else {
                continue;
            };
            let view = collection.view(ctx);
            let items = get_with_filter(&view, Some(codes.as_slice()), None, include_inactive)?;
            named.insert(ty.name(), items);
        }
        Ok(named)
    }
}
