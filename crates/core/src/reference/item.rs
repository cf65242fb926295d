use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::types::KeyValue;

fn default_active() -> bool {
    true
}

/// A single reference-data entry.
///
/// Items are plain values while being built; once added to a
/// [`ReferenceDataCollection`](super::ReferenceDataCollection) they are only
/// reachable through shared references and therefore read-only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReferenceDataItem {
    pub id: Option<KeyValue>,
    pub code: Option<String>,
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub sort_order: i32,
    #[serde(default = "default_active")]
    pub is_active: bool,
    #[serde(default)]
    pub start_date: Option<NaiveDate>,
    #[serde(default)]
    pub end_date: Option<NaiveDate>,
    /// Concurrency token for write paths.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub etag: Option<String>,
    /// Alternate keys, e.g. another system's code for the same entry.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub mappings: BTreeMap<String, KeyValue>,
    #[serde(skip)]
    invalid: bool,
}

impl ReferenceDataItem {
    /// Creates an active item with the given id, code and text.
    pub fn new(id: impl Into<KeyValue>, code: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            id: Some(id.into()),
            code: Some(code.into()),
            text: Some(text.into()),
            description: None,
            sort_order: 0,
            is_active: true,
            start_date: None,
            end_date: None,
            etag: None,
            mappings: BTreeMap::new(),
            invalid: false,
        }
    }

    fn unresolved() -> Self {
        Self {
            id: None,
            code: None,
            text: None,
            description: None,
            sort_order: 0,
            is_active: true,
            start_date: None,
            end_date: None,
            etag: None,
            mappings: BTreeMap::new(),
            invalid: true,
        }
    }

    /// Placeholder for a code that could not be resolved.
    pub fn unresolved_code(code: impl Into<String>) -> Self {
        Self {
            code: Some(code.into()),
            ..Self::unresolved()
        }
    }

    /// Placeholder for an id that could not be resolved.
    pub fn unresolved_id(id: impl Into<KeyValue>) -> Self {
        Self {
            id: Some(id.into()),
            ..Self::unresolved()
        }
    }

    /// Placeholder for a mapping value that could not be resolved.
    pub fn unresolved_mapping(name: impl Into<String>, value: impl Into<KeyValue>) -> Self {
        let mut item = Self::unresolved();
        item.mappings.insert(name.into(), value.into());
        item
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_sort_order(mut self, sort_order: i32) -> Self {
        self.sort_order = sort_order;
        self
    }

    /// Marks the item as inactive.
    pub fn inactive(mut self) -> Self {
        self.is_active = false;
        self
    }

    /// Sets the validity window; `None` leaves that side unbounded.
    pub fn with_validity(mut self, start: Option<NaiveDate>, end: Option<NaiveDate>) -> Self {
        self.start_date = start;
        self.end_date = end;
        self
    }

    pub fn with_etag(mut self, etag: impl Into<String>) -> Self {
        self.etag = Some(etag.into());
        self
    }

    pub fn with_mapping(mut self, name: impl Into<String>, value: impl Into<KeyValue>) -> Self {
        self.mappings.insert(name.into(), value.into());
        self
    }

    /// Returns the code, or an empty string when unset.
    pub fn code_str(&self) -> &str {
        self.code.as_deref().unwrap_or_default()
    }

    /// Returns the text, or an empty string when unset.
    pub fn text_str(&self) -> &str {
        self.text.as_deref().unwrap_or_default()
    }

    /// Returns the mapping value registered under `name`.
    pub fn mapping(&self, name: &str) -> Option<&KeyValue> {
        self.mappings.get(name)
    }

    /// Returns true if this item is a placeholder for an unresolved key.
    pub fn is_unresolved(&self) -> bool {
        self.invalid
    }

    /// Returns true if the item is usable on `as_of`.
    ///
    /// Requires the item to be active and `as_of` to fall inside the
    /// inclusive `[start_date, end_date]` window. Unresolved placeholders are
    /// never valid.
    pub fn is_valid(&self, as_of: NaiveDate) -> bool {
        if self.invalid || !self.is_active {
            return false;
        }
        if self.start_date.is_some_and(|start| as_of < start) {
            return false;
        }
        if self.end_date.is_some_and(|end| as_of > end) {
            return false;
        }
        true
    }
}
