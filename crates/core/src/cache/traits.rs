use std::sync::Arc;

use crate::reference::{RefDataType, ReferenceDataCollection};

use super::{reference_data_key, EntryOptions};

/// In-process store of published collections, keyed by cache key.
///
/// Implementations hand out shared `Arc`s; a value is never copied or
/// mutated once stored.
pub trait CollectionCache: Send + Sync {
    /// Returns the live entry for `key`, refreshing its sliding expiry.
    fn get(&self, key: &str) -> Option<Arc<ReferenceDataCollection>>;

    /// Stores `value` under `key`, replacing any existing entry.
    fn set(&self, key: &str, value: Arc<ReferenceDataCollection>, options: EntryOptions);

    /// Removes the entry for `key`. Returns whether an entry was present.
    fn remove(&self, key: &str) -> bool;

    /// Removes every entry whose key matches a `*` glob pattern.
    /// Returns the number of entries removed.
    fn remove_pattern(&self, pattern: &str) -> usize;

    /// Removes every entry.
    fn clear(&self);

    /// Number of entries currently held, including not yet reaped expired ones.
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Decides where and how a type's collection is cached.
pub trait CachePolicy: Send + Sync {
    /// Cache key for `ty`.
    fn cache_key(&self, ty: &RefDataType) -> String {
        reference_data_key(ty.name())
    }

    /// Options for a new entry of `ty`, computed just before it is stored.
    fn entry_options(&self, ty: &RefDataType) -> EntryOptions;
}
