//! In-memory collection cache with LRU eviction.
//!
//! Entries expire lazily: an expired entry is dropped the next time it is
//! read or when capacity pressure pushes it out. Eviction callbacks run after
//! the store lock is released, so a callback may call back into the cache.

use std::num::NonZeroUsize;
use std::sync::{Arc, Mutex};
use std::time::Instant;

use lru::LruCache;

use refdata_core::cache::{
    extract_type_name, pattern_matches, CollectionCache, EntryOptions, EvictionReason,
};
use refdata_core::reference::ReferenceDataCollection;

#[derive(Debug)]
struct CacheEntry {
    value: Arc<ReferenceDataCollection>,
    options: EntryOptions,
    created_at: Instant,
    last_access: Instant,
}

impl CacheEntry {
    fn new(value: Arc<ReferenceDataCollection>, options: EntryOptions) -> Self {
        let now = Instant::now();
        Self {
            value,
            options,
            created_at: now,
            last_access: now,
        }
    }

    fn is_expired(&self, now: Instant) -> bool {
        let absolute = self
            .options
            .absolute_ttl
            .is_some_and(|ttl| now.duration_since(self.created_at) > ttl);
        let sliding = self
            .options
            .sliding_ttl
            .is_some_and(|ttl| now.duration_since(self.last_access) > ttl);
        absolute || sliding
    }
}

type Evicted = Vec<(String, CacheEntry, EvictionReason)>;

/// LRU-bounded in-memory [`CollectionCache`].
///
/// Clones share the same store.
#[derive(Debug, Clone)]
pub struct MemoryCache {
    store: Arc<Mutex<LruCache<String, CacheEntry>>>,
}

impl MemoryCache {
    /// Creates a cache holding at most `max_entries` collections.
    ///
    /// # Panics
    ///
    /// Panics if `max_entries` is 0.
    pub fn new(max_entries: usize) -> Self {
        let capacity = NonZeroUsize::new(max_entries).expect("max_entries must be > 0");
        Self {
            store: Arc::new(Mutex::new(LruCache::new(capacity))),
        }
    }

    /// Maximum number of entries before LRU eviction kicks in.
    pub fn capacity(&self) -> usize {
        self.store.lock().expect("Lock poisoned").cap().get()
    }

    fn notify(evicted: Evicted) {
        for (key, entry, reason) in evicted {
            tracing::trace!(
                key = %key,
                type_name = extract_type_name(&key).unwrap_or_default(),
                ?reason,
                "cache entry evicted"
            );
            if let Some(callback) = &entry.options.on_evict {
                callback(&key, reason);
            }
        }
    }
}

impl CollectionCache for MemoryCache {
    fn get(&self, key: &str) -> Option<Arc<ReferenceDataCollection>> {
        let now = Instant::now();
        let evicted = {
            let mut store = self.store.lock().expect("Lock poisoned");
            match store.get_mut(key) {
                None => return None,
                Some(entry) if !entry.is_expired(now) => {
                    entry.last_access = now;
                    return Some(entry.value.clone());
                }
                Some(_) => {}
            }
            store.pop(key)
        };

        if let Some(entry) = evicted {
            Self::notify(vec![(key.to_string(), entry, EvictionReason::Expired)]);
        }
        None
    }

    fn set(&self, key: &str, value: Arc<ReferenceDataCollection>, options: EntryOptions) {
        let displaced = {
            let mut store = self.store.lock().expect("Lock poisoned");
            store.push(key.to_string(), CacheEntry::new(value, options))
        };

        if let Some((old_key, old_entry)) = displaced {
            let reason = if old_key == key {
                EvictionReason::Replaced
            } else if old_entry.is_expired(Instant::now()) {
                EvictionReason::Expired
            } else {
                EvictionReason::Capacity
            };
            Self::notify(vec![(old_key, old_entry, reason)]);
        }
    }

    fn remove(&self, key: &str) -> bool {
        let removed = self.store.lock().expect("Lock poisoned").pop(key);
        match removed {
            Some(entry) => {
                Self::notify(vec![(key.to_string(), entry, EvictionReason::Removed)]);
                true
            }
            None => false,
        }
    }

    fn remove_pattern(&self, pattern: &str) -> usize {
        let evicted: Evicted = {
            let mut store = self.store.lock().expect("Lock poisoned");
            let keys: Vec<String> = store
                .iter()
                .filter(|(key, _)| pattern_matches(pattern, key))
                .map(|(key, _)| key.clone())
                .collect();
            keys.into_iter()
                .filter_map(|key| {
                    store
                        .pop(&key)
                        .map(|entry| (key, entry, EvictionReason::Removed))
                })
                .collect()
        };

        let count = evicted.len();
        Self::notify(evicted);
        count
    }

    fn clear(&self) {
        let evicted: Evicted = {
            let mut store = self.store.lock().expect("Lock poisoned");
            std::iter::from_fn(|| store.pop_lru())
                .map(|(key, entry)| (key, entry, EvictionReason::Removed))
                .collect()
        };
        Self::notify(evicted);
    }

    fn len(&self) -> usize {
        self.store.lock().expect("Lock poisoned").len()
    }
}
