use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::reference::RefDataType;

/// Per-load context handed to a provider.
///
/// A fresh context is created for every load; it is never derived from the
/// request that happened to trigger the load.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadContext {
    pub load_id: Uuid,
    pub ref_type: RefDataType,
    /// Cache key the result will be stored under (carries the tenant, if any).
    pub cache_key: String,
    pub started_at: DateTime<Utc>,
}

impl LoadContext {
    pub fn new(ref_type: RefDataType, cache_key: impl Into<String>) -> Self {
        Self {
            load_id: Uuid::new_v4(),
            ref_type,
            cache_key: cache_key.into(),
            started_at: Utc::now(),
        }
    }
}
