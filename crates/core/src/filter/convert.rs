//! Key-to-item conversion for deserialization and round-trip paths.
//!
//! These helpers never fail: an unknown key, or a missing lookup, yields an
//! unresolved placeholder that carries the key and reports itself invalid.

use std::sync::Arc;

use crate::reference::{KeyValue, RefDataType, ReferenceDataItem, ReferenceDataLookup};

/// Resolves `code` to an item of `ty`.
pub fn convert_from_code(
    lookup: Option<&dyn ReferenceDataLookup>,
    ty: &RefDataType,
    code: &str,
) -> Arc<ReferenceDataItem> {
    lookup
        .and_then(|l| l.collection(ty))
        .and_then(|c| c.try_get_by_code(code).cloned())
        .unwrap_or_else(|| Arc::new(ReferenceDataItem::unresolved_code(code)))
}

/// Resolves `id` to an item of `ty`.
pub fn convert_from_id(
    lookup: Option<&dyn ReferenceDataLookup>,
    ty: &RefDataType,
    id: &KeyValue,
) -> Arc<ReferenceDataItem> {
    lookup
        .and_then(|l| l.collection(ty))
        .and_then(|c| c.try_get_by_id(id).cloned())
        .unwrap_or_else(|| Arc::new(ReferenceDataItem::unresolved_id(id.clone())))
}

/// Resolves the mapping `name`=`value` to an item of `ty`.
pub fn convert_from_mapping(
    lookup: Option<&dyn ReferenceDataLookup>,
    ty: &RefDataType,
    name: &str,
    value: &KeyValue,
) -> Arc<ReferenceDataItem> {
    lookup
        .and_then(|l| l.collection(ty))
        .and_then(|c| c.try_get_by_mapping(name, value).cloned())
        .unwrap_or_else(|| Arc::new(ReferenceDataItem::unresolved_mapping(name, value.clone())))
}
