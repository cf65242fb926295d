//! The reference-data orchestrator.
//!
//! Routes each type to its registered provider and serves collections from a
//! [`CollectionCache`]. Per cache key the state moves from uncached to
//! loading (one shared provider call) to cached, and back to uncached on
//! expiry, eviction or invalidation. Failed loads are never cached.

mod blocking;
mod flight;
mod named;
mod registry;

#[cfg(test)]
mod testing;

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex, RwLock};

use futures_util::stream::{self, TryStreamExt};

use refdata_core::cache::{CachePolicy, CollectionCache};
use refdata_core::provider::ReferenceDataProvider;
use refdata_core::reference::{RefDataType, ReferenceData, ReferenceDataCollection};

use crate::cache::MemoryCache;
use crate::config::Config;
use crate::error::{OrchestratorError, Result};

use flight::FlightSlot;
use registry::Registry;

pub use named::NamedReferenceData;

/// Cheaply cloneable handle to a shared orchestrator.
#[derive(Clone)]
pub struct ReferenceDataOrchestrator {
    inner: Arc<Inner>,
}

pub(crate) struct Inner {
    registry: RwLock<Registry>,
    cache: Arc<dyn CollectionCache>,
    policy: Arc<dyn CachePolicy>,
    flights: Mutex<HashMap<String, FlightSlot>>,
    prefetch_concurrency: usize,
}

impl ReferenceDataOrchestrator {
    /// Creates an orchestrator over `cache`, keyed and expired by `policy`.
    ///
    /// `prefetch_concurrency` bounds the number of loads a single
    /// [`prefetch`](Self::prefetch) runs at once; 0 is treated as 1.
    pub fn new(
        cache: Arc<dyn CollectionCache>,
        policy: Arc<dyn CachePolicy>,
        prefetch_concurrency: usize,
    ) -> Self {
        Self {
            inner: Arc::new(Inner {
                registry: RwLock::new(Registry::default()),
                cache,
                policy,
                flights: Mutex::new(HashMap::new()),
                prefetch_concurrency: prefetch_concurrency.max(1),
            }),
        }
    }

    /// Creates an orchestrator with a [`MemoryCache`] and the default policy
    /// built from `config`.
    pub fn from_config(config: &Config) -> Self {
        Self::with_policy(config, Arc::new(config.cache_policy()))
    }

    /// Like [`from_config`](Self::from_config) but with a custom policy,
    /// e.g. a [`TenantCachePolicy`](refdata_core::cache::TenantCachePolicy).
    pub fn with_policy(config: &Config, policy: Arc<dyn CachePolicy>) -> Self {
        Self::new(
            Arc::new(MemoryCache::new(config.cache_max_entries)),
            policy,
            config.prefetch_concurrency,
        )
    }

    /// Registers every type `provider` serves.
    ///
    /// Fails without registering anything if one of its types, or a type
    /// with the same case-insensitive name, is already registered.
    pub fn register(&self, provider: Arc<dyn ReferenceDataProvider>) -> Result<()> {
        let mut registry = self.inner.registry.write().expect("Lock poisoned");
        match registry.register(provider) {
            Ok(types) => {
                for ty in &types {
                    tracing::info!(
                        type_name = %ty.full_name(),
                        name = %ty.name(),
                        "registered reference data type"
                    );
                }
                Ok(())
            }
            Err(error) => {
                tracing::warn!(%error, "provider registration rejected");
                Err(error)
            }
        }
    }

    pub fn registered_types(&self) -> Vec<RefDataType> {
        self.inner.registry.read().expect("Lock poisoned").types()
    }

    pub fn is_registered(&self, ty: &RefDataType) -> bool {
        self.inner
            .registry
            .read()
            .expect("Lock poisoned")
            .contains(ty)
    }

    /// Resolves a case-insensitive simple name to its registered type.
    pub fn resolve_name(&self, name: &str) -> Option<RefDataType> {
        self.inner
            .registry
            .read()
            .expect("Lock poisoned")
            .resolve(name)
            .cloned()
    }

    /// Cache key `ty` is currently stored under.
    pub fn cache_key(&self, ty: &RefDataType) -> String {
        self.inner.policy.cache_key(ty)
    }

    fn provider(&self, ty: &RefDataType) -> Option<Arc<dyn ReferenceDataProvider>> {
        self.inner
            .registry
            .read()
            .expect("Lock poisoned")
            .provider(ty)
    }

    /// Returns the collection for `ty`, loading it on a cache miss.
    ///
    /// `Ok(None)` means no provider serves `ty`. Concurrent callers missing
    /// the same cache key share one provider call and receive the same `Arc`
    /// or the same error.
    pub async fn get_by_type(
        &self,
        ty: &RefDataType,
    ) -> Result<Option<Arc<ReferenceDataCollection>>> {
        let Some(provider) = self.provider(ty) else {
            tracing::debug!(type_name = %ty.full_name(), "reference data type not registered");
            return Ok(None);
        };

        let key = self.cache_key(ty);
        if let Some(collection) = self.inner.cache.get(&key) {
            tracing::debug!(key = %key, "cache hit");
            return Ok(Some(collection));
        }

        tracing::debug!(key = %key, "cache miss");
        self.inner.load(ty, key, provider).await.map(Some)
    }

    /// Like [`get_by_type`](Self::get_by_type), failing if `ty` is not registered.
    pub async fn get_by_type_required(
        &self,
        ty: &RefDataType,
    ) -> Result<Arc<ReferenceDataCollection>> {
        self.get_by_type(ty)
            .await?
            .ok_or_else(|| OrchestratorError::NotRegistered(ty.full_name().to_string()))
    }

    pub async fn get<T: ReferenceData>(&self) -> Result<Option<Arc<ReferenceDataCollection>>> {
        self.get_by_type(&RefDataType::of::<T>()).await
    }

    /// Returns the collection registered under a case-insensitive name.
    pub async fn get_by_name(&self, name: &str) -> Result<Option<Arc<ReferenceDataCollection>>> {
        match self.resolve_name(name) {
            Some(ty) => self.get_by_type(&ty).await,
            None => {
                tracing::debug!(name, "reference data name not registered");
                Ok(None)
            }
        }
    }

    pub async fn get_by_name_required(&self, name: &str) -> Result<Arc<ReferenceDataCollection>> {
        self.get_by_name(name)
            .await?
            .ok_or_else(|| OrchestratorError::NotRegistered(name.to_string()))
    }

    /// Loads every named type that is not already cached.
    ///
    /// Names are deduplicated case-insensitively and unknown names are
    /// skipped. Each provider first receives a [`prefetch`] hint with its
    /// uncached types, then the loads run with bounded parallelism. Returns
    /// the first load error.
    ///
    /// [`prefetch`]: ReferenceDataProvider::prefetch
    pub async fn prefetch<S: AsRef<str>>(&self, names: &[S]) -> Result<()> {
        let mut seen = HashSet::new();
        let mut pending = Vec::new();
        for name in names {
            let name = name.as_ref();
            if !seen.insert(name.to_lowercase()) {
                continue;
            }
            let Some(ty) = self.resolve_name(name) else {
                tracing::debug!(name, "skipping unknown reference data name");
                continue;
            };
            let key = self.cache_key(&ty);
            if self.inner.cache.get(&key).is_some() {
                continue;
            }
            if let Some(provider) = self.provider(&ty) {
                pending.push((ty, key, provider));
            }
        }

        if pending.is_empty() {
            return Ok(());
        }

        let mut hints: Vec<(Arc<dyn ReferenceDataProvider>, Vec<RefDataType>)> = Vec::new();
        for (ty, _, provider) in &pending {
            match hints.iter_mut().find(|(p, _)| Arc::ptr_eq(p, provider)) {
                Some((_, types)) => types.push(ty.clone()),
                None => hints.push((provider.clone(), vec![ty.clone()])),
            }
        }
        for (provider, types) in &hints {
            if let Err(error) = provider.prefetch(types).await {
                tracing::warn!(%error, count = types.len(), "prefetch hint failed");
            }
        }

        tracing::debug!(
            count = pending.len(),
            concurrency = self.inner.prefetch_concurrency,
            "prefetching reference data"
        );
        let inner = &self.inner;
        stream::iter(pending.into_iter().map(Ok::<_, OrchestratorError>))
            .try_for_each_concurrent(inner.prefetch_concurrency, |(ty, key, provider)| async move {
                inner.load(&ty, key, provider).await.map(|_| ())
            })
            .await
    }

    /// Drops the cached collection for `ty`. Returns whether one was cached.
    pub fn invalidate(&self, ty: &RefDataType) -> bool {
        let key = self.cache_key(ty);
        let removed = self.inner.cache.remove(&key);
        tracing::info!(key = %key, removed, "invalidated reference data");
        removed
    }

    /// Drops the cached collection of every registered type under the
    /// current cache keys. Returns how many were cached.
    pub fn invalidate_all(&self) -> usize {
        let removed = self
            .registered_types()
            .iter()
            .filter(|ty| self.inner.cache.remove(&self.cache_key(ty)))
            .count();
        tracing::info!(removed, "invalidated all reference data");
        removed
    }

    /// Invalidates `ty` and loads it again, returning the new collection.
    pub async fn refresh(&self, ty: &RefDataType) -> Result<Option<Arc<ReferenceDataCollection>>> {
        let Some(provider) = self.provider(ty) else {
            return Ok(None);
        };
        self.invalidate(ty);
        let key = self.cache_key(ty);
        self.inner.load(ty, key, provider).await.map(Some)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    use futures_util::future::join_all;
    use refdata_core::cache::{DefaultCachePolicy, EntryOptions, TenantCachePolicy, TtlOverride};
    use refdata_core::provider::LoadError;
    use refdata_core::reference::{IdKind, KeyValue};

    use super::testing::{
        au_nz, country, gender, orchestrator, Country, MockProvider, ReentrantProvider,
    };
    use super::*;

    /// Policy whose first `n` calls to `entry_options` panic.
    struct PanickingPolicy {
        panics: AtomicUsize,
    }

    impl CachePolicy for PanickingPolicy {
        fn entry_options(&self, _ty: &RefDataType) -> EntryOptions {
            if self
                .panics
                .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
                .is_ok()
            {
                panic!("policy exploded");
            }
            EntryOptions::new()
        }
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_first_calls_share_one_load() {
        let orchestrator = orchestrator();
        let provider = Arc::new(
            MockProvider::new(vec![country()], au_nz()).with_delay(Duration::from_millis(50)),
        );
        orchestrator.register(provider.clone()).unwrap();

        let handles = (0..16).map(|_| {
            let orchestrator = orchestrator.clone();
            tokio::spawn(async move { orchestrator.get_by_type(&country()).await })
        });
        let results: Vec<Arc<ReferenceDataCollection>> = join_all(handles)
            .await
            .into_iter()
            .map(|joined| joined.unwrap().unwrap().unwrap())
            .collect();

        assert_eq!(provider.calls(), 1);
        assert!(results.iter().all(|c| Arc::ptr_eq(c, &results[0])));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_waiters_share_one_failure() {
        let orchestrator = orchestrator();
        let provider = Arc::new(
            MockProvider::new(vec![country()], au_nz())
                .with_delay(Duration::from_millis(50))
                .failing_first(1),
        );
        orchestrator.register(provider.clone()).unwrap();

        let handles = (0..8).map(|_| {
            let orchestrator = orchestrator.clone();
            tokio::spawn(async move { orchestrator.get_by_type(&country()).await })
        });
        let errors: Vec<OrchestratorError> = join_all(handles)
            .await
            .into_iter()
            .map(|joined| joined.unwrap().unwrap_err())
            .collect();

        assert_eq!(provider.calls(), 1);
        let expected = OrchestratorError::LoadFailed {
            type_name: "Country".to_string(),
            source: LoadError::Other("transient failure".to_string()),
        };
        assert!(errors.iter().all(|e| *e == expected));
    }

    #[tokio::test]
    async fn test_failures_are_not_cached() {
        let orchestrator = orchestrator();
        let provider = Arc::new(MockProvider::new(vec![country()], au_nz()).failing_first(1));
        orchestrator.register(provider.clone()).unwrap();

        assert!(orchestrator.get_by_type(&country()).await.is_err());
        let collection = orchestrator.get_by_type(&country()).await.unwrap().unwrap();

        assert_eq!(provider.calls(), 2);
        assert_eq!(collection.len(), 3);
    }

    #[tokio::test]
    async fn test_repeated_calls_return_same_instance() {
        let orchestrator = orchestrator();
        let provider = Arc::new(MockProvider::new(vec![country()], au_nz()));
        orchestrator.register(provider.clone()).unwrap();

        let first = orchestrator.get_by_type(&country()).await.unwrap().unwrap();
        let second = orchestrator.get_by_name("COUNTRY").await.unwrap().unwrap();
        let third = orchestrator.get::<Country>().await.unwrap().unwrap();

        assert!(Arc::ptr_eq(&first, &second));
        assert!(Arc::ptr_eq(&first, &third));
        assert_eq!(provider.calls(), 1);
    }

    #[tokio::test]
    async fn test_refresh_produces_new_instance() {
        let orchestrator = orchestrator();
        let provider = Arc::new(MockProvider::new(vec![country()], au_nz()));
        orchestrator.register(provider.clone()).unwrap();

        let before = orchestrator.get_by_type(&country()).await.unwrap().unwrap();
        let refreshed = orchestrator.refresh(&country()).await.unwrap().unwrap();
        let after = orchestrator.get_by_type(&country()).await.unwrap().unwrap();

        assert!(!Arc::ptr_eq(&before, &refreshed));
        assert!(Arc::ptr_eq(&refreshed, &after));
        assert_eq!(provider.calls(), 2);
    }

    #[tokio::test]
    async fn test_unregistered_type_is_none_or_not_registered() {
        let orchestrator = orchestrator();

        assert!(orchestrator.get_by_type(&gender()).await.unwrap().is_none());
        assert!(orchestrator.get_by_name("gender").await.unwrap().is_none());
        assert!(orchestrator.refresh(&gender()).await.unwrap().is_none());

        let by_type = orchestrator.get_by_type_required(&gender()).await;
        assert_eq!(
            by_type.unwrap_err(),
            OrchestratorError::NotRegistered("people::Gender".to_string())
        );
        let by_name = orchestrator.get_by_name_required("Gender").await;
        assert_eq!(
            by_name.unwrap_err(),
            OrchestratorError::NotRegistered("Gender".to_string())
        );
    }

    #[tokio::test]
    async fn test_name_conflict_keeps_first_registration() {
        let orchestrator = orchestrator();
        let first = Arc::new(MockProvider::new(vec![country()], au_nz()));
        orchestrator.register(first.clone()).unwrap();

        let impostor = RefDataType::new("legacy::Country", "Country", IdKind::String);
        let second = Arc::new(MockProvider::empty(vec![gender(), impostor]));
        let error = orchestrator.register(second.clone()).unwrap_err();

        assert!(matches!(error, OrchestratorError::DuplicateName { .. }));
        assert!(!orchestrator.is_registered(&gender()));
        assert_eq!(orchestrator.registered_types(), vec![country()]);

        let collection = orchestrator.get_by_name("country").await.unwrap().unwrap();
        assert_eq!(collection.ref_type(), &country());
        assert_eq!(first.calls(), 1);
        assert_eq!(second.calls(), 0);
    }

    #[tokio::test]
    async fn test_dropped_waiter_does_not_cancel_load() {
        let orchestrator = orchestrator();
        let provider = Arc::new(
            MockProvider::new(vec![country()], au_nz()).with_delay(Duration::from_millis(100)),
        );
        orchestrator.register(provider.clone()).unwrap();

        let country_type = country();
        let load = orchestrator.get_by_type(&country_type);
        let timed_out = tokio::time::timeout(Duration::from_millis(10), load).await;
        assert!(timed_out.is_err());

        tokio::time::sleep(Duration::from_millis(200)).await;
        let collection = orchestrator.get_by_type(&country()).await.unwrap().unwrap();

        assert_eq!(collection.len(), 3);
        assert_eq!(provider.calls(), 1);
    }

    #[tokio::test]
    async fn test_waiter_joining_after_cancelled_one_gets_result() {
        let orchestrator = orchestrator();
        let provider = Arc::new(
            MockProvider::new(vec![country()], au_nz()).with_delay(Duration::from_millis(100)),
        );
        orchestrator.register(provider.clone()).unwrap();

        let country_type = country();
        let load = orchestrator.get_by_type(&country_type);
        let _ = tokio::time::timeout(Duration::from_millis(10), load).await;
        let collection = orchestrator.get_by_type(&country()).await.unwrap().unwrap();

        assert_eq!(collection.len(), 3);
        assert_eq!(provider.calls(), 1);
    }

    #[tokio::test]
    async fn test_provider_panic_becomes_load_failure() {
        let orchestrator = orchestrator();
        let provider = Arc::new(MockProvider::empty(vec![country()]).panicking());
        orchestrator.register(provider.clone()).unwrap();

        let error = orchestrator.get_by_type(&country()).await.unwrap_err();
        assert_eq!(
            error,
            OrchestratorError::LoadFailed {
                type_name: "Country".to_string(),
                source: LoadError::Other("provider panicked: provider exploded".to_string()),
            }
        );

        // The slot was released, so the next call loads again.
        assert!(orchestrator.get_by_type(&country()).await.is_err());
        assert_eq!(provider.calls(), 2);
    }

    #[tokio::test]
    async fn test_wrong_collection_type_is_type_mismatch() {
        let orchestrator = orchestrator();
        let provider = Arc::new(MockProvider::empty(vec![country()]).returning(gender()));
        orchestrator.register(provider).unwrap();

        let error = orchestrator.get_by_type(&country()).await.unwrap_err();
        assert_eq!(
            error,
            OrchestratorError::TypeMismatch {
                expected: country().full_name().to_string(),
                actual: "people::Gender".to_string(),
            }
        );
        assert!(orchestrator.inner.cache.is_empty());
    }

    #[tokio::test]
    async fn test_prefetch_hints_and_loads_uncached_types() {
        let orchestrator = orchestrator();
        let provider = Arc::new(MockProvider::new(vec![country(), gender()], au_nz()));
        orchestrator.register(provider.clone()).unwrap();

        orchestrator
            .prefetch(&["country", "COUNTRY", "Gender", "unknown"])
            .await
            .unwrap();

        assert_eq!(provider.calls(), 2);
        assert_eq!(provider.hints(), vec![vec![country(), gender()]]);

        orchestrator.get_by_name("gender").await.unwrap().unwrap();
        orchestrator.prefetch(&["Country", "Gender"]).await.unwrap();
        assert_eq!(provider.calls(), 2);
        assert_eq!(provider.hints().len(), 1);
    }

    #[tokio::test]
    async fn test_prefetch_returns_load_error() {
        let orchestrator = orchestrator();
        let provider = Arc::new(MockProvider::new(vec![country()], au_nz()).failing_first(1));
        orchestrator.register(provider).unwrap();

        let error = orchestrator.prefetch(&["Country"]).await.unwrap_err();
        assert!(matches!(error, OrchestratorError::LoadFailed { .. }));
    }

    #[tokio::test]
    async fn test_invalidate_forces_reload() {
        let orchestrator = orchestrator();
        let provider = Arc::new(MockProvider::new(vec![country(), gender()], au_nz()));
        orchestrator.register(provider.clone()).unwrap();
        orchestrator.prefetch(&["Country", "Gender"]).await.unwrap();

        assert!(orchestrator.invalidate(&country()));
        assert!(!orchestrator.invalidate(&country()));
        orchestrator.get_by_type(&country()).await.unwrap();
        assert_eq!(provider.calls(), 3);

        assert_eq!(orchestrator.invalidate_all(), 2);
        assert_eq!(orchestrator.invalidate_all(), 0);
    }

    #[tokio::test]
    async fn test_expired_entry_is_reloaded() {
        let policy = DefaultCachePolicy::default().with_override(
            country(),
            TtlOverride {
                absolute_ttl: Some(Duration::from_millis(20)),
                sliding_ttl: None,
            },
        );
        let orchestrator =
            ReferenceDataOrchestrator::new(Arc::new(MemoryCache::new(10)), Arc::new(policy), 2);
        let provider = Arc::new(MockProvider::new(vec![country()], au_nz()));
        orchestrator.register(provider.clone()).unwrap();

        let first = orchestrator.get_by_type(&country()).await.unwrap().unwrap();
        tokio::time::sleep(Duration::from_millis(50)).await;
        let second = orchestrator.get_by_type(&country()).await.unwrap().unwrap();

        assert!(!Arc::ptr_eq(&first, &second));
        assert_eq!(provider.calls(), 2);
    }

    #[tokio::test]
    async fn test_tenant_policy_partitions_cache() {
        let tenant = Arc::new(Mutex::new("acme".to_string()));
        let current = tenant.clone();
        let policy = TenantCachePolicy::new(DefaultCachePolicy::default(), move || {
            current.lock().unwrap().clone()
        });
        let orchestrator =
            ReferenceDataOrchestrator::new(Arc::new(MemoryCache::new(10)), Arc::new(policy), 2);
        let provider = Arc::new(MockProvider::new(vec![country()], au_nz()));
        orchestrator.register(provider.clone()).unwrap();

        let acme = orchestrator.get_by_type(&country()).await.unwrap().unwrap();
        assert_eq!(orchestrator.cache_key(&country()), "refdata:acme:Country");

        *tenant.lock().unwrap() = "globex".to_string();
        let globex = orchestrator.get_by_type(&country()).await.unwrap().unwrap();
        assert!(!Arc::ptr_eq(&acme, &globex));
        assert!(orchestrator.invalidate(&country()));

        *tenant.lock().unwrap() = "acme".to_string();
        let again = orchestrator.get_by_type(&country()).await.unwrap().unwrap();
        assert!(Arc::ptr_eq(&acme, &again));
        assert_eq!(provider.calls(), 2);
    }

    #[tokio::test]
    async fn test_au_nz_lookups_through_orchestrator() {
        let orchestrator = orchestrator();
        orchestrator
            .register(Arc::new(MockProvider::new(vec![country()], au_nz())))
            .unwrap();

        let collection = orchestrator.get_by_name_required("Country").await.unwrap();

        let nz = collection.get_by_code("nz").unwrap();
        assert_eq!(nz.text_str(), "New Zealand");
        let au = collection.get_by_id(&KeyValue::Int32(1)).unwrap();
        assert_eq!(au.code_str(), "AU");
        assert!(collection.try_get_by_code("FR").is_none());
    }

    #[tokio::test]
    async fn test_flight_slots_are_released() {
        let orchestrator = orchestrator();
        orchestrator
            .register(Arc::new(MockProvider::new(vec![country()], au_nz())))
            .unwrap();

        orchestrator.get_by_type(&country()).await.unwrap();
        tokio::task::yield_now().await;

        assert!(orchestrator.inner.flights.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_panic_while_caching_is_not_cached() {
        let policy = PanickingPolicy {
            panics: AtomicUsize::new(1),
        };
        let orchestrator =
            ReferenceDataOrchestrator::new(Arc::new(MemoryCache::new(10)), Arc::new(policy), 2);
        let provider = Arc::new(MockProvider::new(vec![country()], au_nz()));
        orchestrator.register(provider.clone()).unwrap();

        let error = orchestrator.get_by_type(&country()).await.unwrap_err();
        assert_eq!(
            error,
            OrchestratorError::LoadFailed {
                type_name: "Country".to_string(),
                source: LoadError::Other("caching panicked: policy exploded".to_string()),
            }
        );

        let collection = orchestrator.get_by_type(&country()).await.unwrap().unwrap();
        let again = orchestrator.get_by_type(&country()).await.unwrap().unwrap();

        assert!(Arc::ptr_eq(&collection, &again));
        assert_eq!(provider.calls(), 2);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_provider_requesting_own_type_blocking_fails_fast() {
        let orchestrator = orchestrator();
        let provider = Arc::new(ReentrantProvider::new(vec![country()], true));
        provider.attach(&orchestrator);
        orchestrator.register(provider.clone()).unwrap();

        let country_type = country();
        let load = orchestrator.get_by_type(&country_type);
        let collection = tokio::time::timeout(Duration::from_secs(2), load)
            .await
            .expect("load should not wait on itself")
            .unwrap()
            .unwrap();

        let expected = OrchestratorError::ReentrantLoad(country().full_name().to_string());
        assert_eq!(collection.len(), 3);
        assert_eq!(provider.nested(), Some(Err(expected)));
    }

    #[tokio::test]
    async fn test_provider_requesting_own_type_async_fails_fast() {
        let orchestrator = orchestrator();
        let provider = Arc::new(ReentrantProvider::new(vec![country()], false));
        provider.attach(&orchestrator);
        orchestrator.register(provider.clone()).unwrap();

        let country_type = country();
        let load = orchestrator.get_by_type(&country_type);
        let collection = tokio::time::timeout(Duration::from_secs(2), load)
            .await
            .expect("load should not wait on itself")
            .unwrap()
            .unwrap();

        assert_eq!(collection.len(), 3);
        assert!(matches!(provider.nested(), Some(Err(OrchestratorError::ReentrantLoad(_)))));

        // Outside the load the same request is an ordinary cache hit.
        let cached = orchestrator.get_by_type(&country()).await.unwrap().unwrap();
        assert!(Arc::ptr_eq(&collection, &cached));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_prefetch_respects_concurrency_limit() {
        let types: Vec<RefDataType> = (0..8)
            .map(|i| RefDataType::new(format!("bulk::T{}", i), format!("T{}", i), IdKind::Int32))
            .collect();
        let orchestrator = ReferenceDataOrchestrator::new(
            Arc::new(MemoryCache::new(100)),
            Arc::new(DefaultCachePolicy::default()),
            3,
        );
        let provider = Arc::new(
            MockProvider::new(types.clone(), au_nz()).with_delay(Duration::from_millis(30)),
        );
        orchestrator.register(provider.clone()).unwrap();

        let names: Vec<&str> = types.iter().map(|ty| ty.name()).collect();
        orchestrator.prefetch(&names).await.unwrap();

        assert_eq!(provider.calls(), 8);
        assert!(provider.peak_concurrency() <= 3);
        assert!(provider.peak_concurrency() > 1);
    }
}
