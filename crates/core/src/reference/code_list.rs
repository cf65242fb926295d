use std::sync::Arc;

use super::item::ReferenceDataItem;
use super::lookup::ReferenceDataLookup;
use super::types::RefDataType;

/// An ordered list of codes for one reference-data type.
///
/// Codes are kept as given; they are resolved to items only when asked, and
/// only through the lookup the caller supplies.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReferenceDataCodeList {
    ref_type: RefDataType,
    codes: Vec<String>,
}

impl ReferenceDataCodeList {
    pub fn new<I, S>(ref_type: RefDataType, codes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            ref_type,
            codes: codes.into_iter().map(Into::into).collect(),
        }
    }

    pub fn ref_type(&self) -> &RefDataType {
        &self.ref_type
    }

    pub fn codes(&self) -> &[String] {
        &self.codes
    }

    pub fn push(&mut self, code: impl Into<String>) {
        self.codes.push(code.into());
    }

    /// Resolves every code, in order.
    ///
    /// Codes that cannot be resolved (including when `lookup` is `None`)
    /// become unresolved placeholder items.
    pub fn resolve(&self, lookup: Option<&dyn ReferenceDataLookup>) -> Vec<Arc<ReferenceDataItem>> {
        let collection = lookup.and_then(|l| l.collection(&self.ref_type));
        self.codes
            .iter()
            .map(|code| {
                collection
                    .as_ref()
                    .and_then(|c| c.try_get_by_code(code).cloned())
                    .unwrap_or_else(|| Arc::new(ReferenceDataItem::unresolved_code(code.clone())))
            })
            .collect()
    }

    /// Returns true if any code does not resolve to a known item.
    pub fn has_invalid_items(&self, lookup: Option<&dyn ReferenceDataLookup>) -> bool {
        self.resolve(lookup).iter().any(|item| item.is_unresolved())
    }
}
