use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use crate::reference::RefDataType;

use super::{
    reference_data_key, tenant_reference_data_key, CachePolicy, EntryOptions, EvictionCallback,
};

/// Per-type expiry settings overriding the policy-wide defaults.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TtlOverride {
    pub absolute_ttl: Option<Duration>,
    pub sliding_ttl: Option<Duration>,
}

/// Caches every type under `refdata:{name}` with configured expiry.
#[derive(Clone, Default)]
pub struct DefaultCachePolicy {
    absolute_ttl: Option<Duration>,
    sliding_ttl: Option<Duration>,
    overrides: HashMap<RefDataType, TtlOverride>,
    on_evict: Option<EvictionCallback>,
}

impl DefaultCachePolicy {
    pub fn new(absolute_ttl: Option<Duration>, sliding_ttl: Option<Duration>) -> Self {
        Self {
            absolute_ttl,
            sliding_ttl,
            overrides: HashMap::new(),
            on_evict: None,
        }
    }

    /// Uses `ttl` in place of the defaults for `ty`.
    pub fn with_override(mut self, ty: RefDataType, ttl: TtlOverride) -> Self {
        self.overrides.insert(ty, ttl);
        self
    }

    /// Attaches `callback` to every entry this policy creates.
    pub fn with_eviction_callback(mut self, callback: EvictionCallback) -> Self {
        self.on_evict = Some(callback);
        self
    }
}

impl fmt::Debug for DefaultCachePolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DefaultCachePolicy")
            .field("absolute_ttl", &self.absolute_ttl)
            .field("sliding_ttl", &self.sliding_ttl)
            .field("overrides", &self.overrides.len())
            .field("on_evict", &self.on_evict.is_some())
            .finish()
    }
}

impl CachePolicy for DefaultCachePolicy {
    fn cache_key(&self, ty: &RefDataType) -> String {
        reference_data_key(ty.name())
    }

    fn entry_options(&self, ty: &RefDataType) -> EntryOptions {
        let (absolute_ttl, sliding_ttl) = match self.overrides.get(ty) {
            Some(o) => (o.absolute_ttl, o.sliding_ttl),
            None => (self.absolute_ttl, self.sliding_ttl),
        };
        EntryOptions {
            absolute_ttl,
            sliding_ttl,
            on_evict: self.on_evict.clone(),
        }
    }
}

type TenantSupplier = Arc<dyn Fn() -> String + Send + Sync>;

/// Partitions cache keys by the tenant returned from a supplier.
///
/// The supplier is consulted on every key computation, so it can read
/// ambient request state.
#[derive(Clone)]
pub struct TenantCachePolicy {
    inner: DefaultCachePolicy,
    tenant: TenantSupplier,
}

impl TenantCachePolicy {
    pub fn new<F>(inner: DefaultCachePolicy, tenant: F) -> Self
    where
        F: Fn() -> String + Send + Sync + 'static,
    {
        Self {
            inner,
            tenant: Arc::new(tenant),
        }
    }
}

impl CachePolicy for TenantCachePolicy {
    fn cache_key(&self, ty: &RefDataType) -> String {
        tenant_reference_data_key(&(self.tenant)(), ty.name())
    }

    fn entry_options(&self, ty: &RefDataType) -> EntryOptions {
        self.inner.entry_options(ty)
    }
}
