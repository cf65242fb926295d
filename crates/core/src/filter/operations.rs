use std::collections::HashSet;
use std::sync::Arc;

use crate::reference::{CollectionView, ReferenceDataItem};

use super::error::WildcardError;
use super::wildcard::Wildcard;

/// Filters a collection view by codes, wildcard text and activity.
///
/// With no codes, no text and `include_inactive == false` this is exactly
/// [`CollectionView::active_items`]. Otherwise the text pattern is validated
/// first, then items are taken from the active (or, with
/// `include_inactive`, the full) set, narrowed to the given codes
/// (case-insensitive) and finally to texts matching the pattern. Empty code
/// lists and blank text count as not supplied.
pub fn get_with_filter<S: AsRef<str>>(
    view: &CollectionView<'_>,
    codes: Option<&[S]>,
    text: Option<&str>,
    include_inactive: bool,
) -> Result<Vec<Arc<ReferenceDataItem>>, WildcardError> {
    let codes = codes.filter(|c| !c.is_empty());
    let text = text.filter(|t| !t.trim().is_empty());

    if codes.is_none() && text.is_none() && !include_inactive {
        return Ok(view.active_items());
    }

    let wildcard = text.map(Wildcard::parse).transpose()?;

    let code_set: Option<HashSet<String>> =
        codes.map(|c| c.iter().map(|code| code.as_ref().to_lowercase()).collect());

    let source = if include_inactive {
        view.collection().all_items().to_vec()
    } else {
        view.active_items()
    };

    Ok(source
        .into_iter()
        .filter(|item| {
            code_set
                .as_ref()
                .is_none_or(|set| set.contains(&item.code_str().to_lowercase()))
        })
        .filter(|item| wildcard.as_ref().is_none_or(|w| w.matches(item.text_str())))
        .collect())
}
