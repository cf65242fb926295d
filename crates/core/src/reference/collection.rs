//! Indexed, write-once collection of reference-data items.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::NaiveDate;

use super::error::{CollectionError, Result};
use super::item::ReferenceDataItem;
use super::sorting::{sort_items, SortOrder};
use super::types::{KeyValue, RefDataType};
use super::validity::ValidityContext;

/// All items of one reference-data type, indexed by id, code and mapping.
///
/// A collection is populated through `&mut self` during a load and then
/// published behind an `Arc`, after which it is only read. Codes are matched
/// case-insensitively; ids and mapping values exactly.
#[derive(Debug, Clone)]
pub struct ReferenceDataCollection {
    ref_type: RefDataType,
    items: Vec<Arc<ReferenceDataItem>>,
    by_id: HashMap<KeyValue, usize>,
    by_code: HashMap<String, usize>,
    by_mapping: HashMap<(String, KeyValue), usize>,
}

impl ReferenceDataCollection {
    /// Creates an empty collection for `ref_type`.
    pub fn new(ref_type: RefDataType) -> Self {
        Self {
            ref_type,
            items: Vec::new(),
            by_id: HashMap::new(),
            by_code: HashMap::new(),
            by_mapping: HashMap::new(),
        }
    }

    /// Creates a collection from `items`, failing on the first invalid item.
    pub fn from_items(
        ref_type: RefDataType,
        items: impl IntoIterator<Item = ReferenceDataItem>,
    ) -> Result<Self> {
        let mut collection = Self::new(ref_type);
        collection.add_range(items)?;
        Ok(collection)
    }

    pub fn ref_type(&self) -> &RefDataType {
        &self.ref_type
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    fn type_name(&self) -> String {
        self.ref_type.name().to_string()
    }

    /// Adds an item, indexing it by id, code and every mapping.
    ///
    /// All checks run before any index is touched, so a rejected item leaves
    /// the collection unchanged.
    pub fn add(&mut self, item: ReferenceDataItem) -> Result<()> {
        let Some(id) = item.id.clone() else {
            return Err(CollectionError::MissingId {
                type_name: self.type_name(),
            });
        };

        let code = match item.code.as_deref() {
            Some(code) if !code.is_empty() => code.to_lowercase(),
            _ => {
                return Err(CollectionError::MissingCode {
                    type_name: self.type_name(),
                    id: id.to_string(),
                })
            }
        };

        let expected = self.ref_type.id_kind();
        if id.kind() != expected {
            return Err(CollectionError::IdKindMismatch {
                type_name: self.type_name(),
                id: id.to_string(),
                expected,
                actual: id.kind(),
            });
        }

        if self.by_id.contains_key(&id) {
            return Err(CollectionError::DuplicateId {
                type_name: self.type_name(),
                id: id.to_string(),
            });
        }

        if self.by_code.contains_key(&code) {
            return Err(CollectionError::DuplicateCode {
                type_name: self.type_name(),
                code: item.code_str().to_string(),
            });
        }

        let mappings: Vec<(String, KeyValue)> = item
            .mappings
            .iter()
            .map(|(name, value)| (name.clone(), value.clone()))
            .collect();
        if let Some((name, value)) = mappings.iter().find(|m| self.by_mapping.contains_key(*m)) {
            return Err(CollectionError::DuplicateMapping {
                type_name: self.type_name(),
                name: name.clone(),
                value: value.to_string(),
            });
        }

        let index = self.items.len();
        self.items.push(Arc::new(item));
        self.by_id.insert(id, index);
        self.by_code.insert(code, index);
        for mapping in mappings {
            self.by_mapping.insert(mapping, index);
        }

        Ok(())
    }

    /// Adds items in order, stopping at the first failure.
    ///
    /// Items added before the failing one remain in the collection.
    pub fn add_range(&mut self, items: impl IntoIterator<Item = ReferenceDataItem>) -> Result<()> {
        for item in items {
            self.add(item)?;
        }
        Ok(())
    }

    pub fn try_get_by_id(&self, id: &KeyValue) -> Option<&Arc<ReferenceDataItem>> {
        self.by_id.get(id).map(|&i| &self.items[i])
    }

    pub fn try_get_by_code(&self, code: &str) -> Option<&Arc<ReferenceDataItem>> {
        self.by_code
            .get(&code.to_lowercase())
            .map(|&i| &self.items[i])
    }

    pub fn try_get_by_mapping(
        &self,
        name: &str,
        value: &KeyValue,
    ) -> Option<&Arc<ReferenceDataItem>> {
        self.by_mapping
            .get(&(name.to_string(), value.clone()))
            .map(|&i| &self.items[i])
    }

    pub fn get_by_id(&self, id: &KeyValue) -> Result<&Arc<ReferenceDataItem>> {
        self.try_get_by_id(id).ok_or_else(|| CollectionError::NotFound {
            type_name: self.type_name(),
            key_kind: "id",
            key: id.to_string(),
        })
    }

    pub fn get_by_code(&self, code: &str) -> Result<&Arc<ReferenceDataItem>> {
        self.try_get_by_code(code)
            .ok_or_else(|| CollectionError::NotFound {
                type_name: self.type_name(),
                key_kind: "code",
                key: code.to_string(),
            })
    }

    pub fn get_by_mapping(&self, name: &str, value: &KeyValue) -> Result<&Arc<ReferenceDataItem>> {
        self.try_get_by_mapping(name, value)
            .ok_or_else(|| CollectionError::NotFound {
                type_name: self.type_name(),
                key_kind: "mapping",
                key: format!("{}={}", name, value),
            })
    }

    pub fn contains_id(&self, id: &KeyValue) -> bool {
        self.by_id.contains_key(id)
    }

    pub fn contains_code(&self, code: &str) -> bool {
        self.by_code.contains_key(&code.to_lowercase())
    }

    /// Every item in insertion order, regardless of activity or validity.
    pub fn all_items(&self) -> &[Arc<ReferenceDataItem>] {
        &self.items
    }

    /// Returns a view that evaluates validity on `as_of`.
    pub fn as_of(&self, as_of: NaiveDate) -> CollectionView<'_> {
        CollectionView {
            collection: self,
            as_of,
        }
    }

    /// Returns a view using the as-of date `ctx` holds for this type.
    pub fn view(&self, ctx: &ValidityContext) -> CollectionView<'_> {
        self.as_of(ctx.date_for(&self.ref_type))
    }
}

/// A collection paired with the date used to evaluate item validity.
#[derive(Debug, Clone, Copy)]
pub struct CollectionView<'a> {
    collection: &'a ReferenceDataCollection,
    as_of: NaiveDate,
}

impl<'a> CollectionView<'a> {
    pub fn collection(&self) -> &'a ReferenceDataCollection {
        self.collection
    }

    pub fn as_of(&self) -> NaiveDate {
        self.as_of
    }

    pub fn is_valid(&self, item: &ReferenceDataItem) -> bool {
        item.is_valid(self.as_of)
    }

    /// Items valid on the view date. No ordering is implied.
    pub fn iter(&self) -> impl Iterator<Item = &'a Arc<ReferenceDataItem>> + 'a {
        let as_of = self.as_of;
        self.collection
            .items
            .iter()
            .filter(move |item| item.is_valid(as_of))
    }

    /// Items that are active and valid on the view date.
    pub fn active_items(&self) -> Vec<Arc<ReferenceDataItem>> {
        let as_of = self.as_of;
        self.collection
            .items
            .iter()
            .filter(|item| item.is_active && item.is_valid(as_of))
            .cloned()
            .collect()
    }

    /// Returns a sorted snapshot, filtered on each dimension that is `Some`.
    pub fn get_list(
        &self,
        order: SortOrder,
        is_active: Option<bool>,
        is_valid: Option<bool>,
    ) -> Vec<Arc<ReferenceDataItem>> {
        let mut list: Vec<_> = self
            .collection
            .items
            .iter()
            .filter(|item| is_active.is_none_or(|active| item.is_active == active))
            .filter(|item| is_valid.is_none_or(|valid| item.is_valid(self.as_of) == valid))
            .cloned()
            .collect();
        sort_items(&mut list, order);
        list
    }
}
