use std::cmp::Ordering;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use super::item::ReferenceDataItem;

/// Ordering applied by [`CollectionView::get_list`](super::CollectionView::get_list).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SortOrder {
    /// Sort order, then text, then code.
    #[default]
    SortOrder,
    Id,
    Code,
    /// Text, then code.
    Text,
}

fn compare_codes(a: &ReferenceDataItem, b: &ReferenceDataItem) -> Ordering {
    let (a, b) = (a.code_str(), b.code_str());
    a.to_lowercase()
        .cmp(&b.to_lowercase())
        .then_with(|| a.cmp(b))
}

fn compare_texts(a: &ReferenceDataItem, b: &ReferenceDataItem) -> Ordering {
    a.text_str()
        .cmp(b.text_str())
        .then_with(|| compare_codes(a, b))
}

/// Sorts items in place using `order`. The sort is stable.
pub fn sort_items(items: &mut [Arc<ReferenceDataItem>], order: SortOrder) {
    match order {
        SortOrder::SortOrder => items.sort_by(|a, b| {
            a.sort_order
                .cmp(&b.sort_order)
                .then_with(|| compare_texts(a, b))
        }),
        SortOrder::Id => items.sort_by(|a, b| a.id.cmp(&b.id)),
        SortOrder::Code => items.sort_by(|a, b| compare_codes(a, b)),
        SortOrder::Text => items.sort_by(|a, b| compare_texts(a, b)),
    }
}
