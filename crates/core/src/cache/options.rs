use std::fmt;
use std::sync::Arc;
use std::time::Duration;

/// Why an entry left the cache.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EvictionReason {
    /// Absolute or sliding expiry elapsed.
    Expired,
    /// Dropped to make room for a newer entry.
    Capacity,
    /// Removed explicitly (invalidate, pattern removal, clear).
    Removed,
    /// Overwritten by a new value under the same key.
    Replaced,
}

/// Callback invoked with the key and reason when an entry is evicted.
pub type EvictionCallback = Arc<dyn Fn(&str, EvictionReason) + Send + Sync>;

/// Expiry and eviction settings attached to a single cache entry.
#[derive(Clone, Default)]
pub struct EntryOptions {
    /// Entry expires this long after it was stored.
    pub absolute_ttl: Option<Duration>,
    /// Entry expires after going unread for this long.
    pub sliding_ttl: Option<Duration>,
    pub on_evict: Option<EvictionCallback>,
}

impl EntryOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_absolute_ttl(mut self, ttl: Duration) -> Self {
        self.absolute_ttl = Some(ttl);
        self
    }

    pub fn with_sliding_ttl(mut self, ttl: Duration) -> Self {
        self.sliding_ttl = Some(ttl);
        self
    }

    pub fn with_eviction_callback<F>(mut self, callback: F) -> Self
    where
        F: Fn(&str, EvictionReason) + Send + Sync + 'static,
    {
        self.on_evict = Some(Arc::new(callback));
        self
    }
}

impl fmt::Debug for EntryOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EntryOptions")
            .field("absolute_ttl", &self.absolute_ttl)
            .field("sliding_ttl", &self.sliding_ttl)
            .field("on_evict", &self.on_evict.is_some())
            .finish()
    }
}
