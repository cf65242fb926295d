//! Mock provider and fixtures shared by the orchestrator tests.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, OnceLock};
use std::time::Duration;

use async_trait::async_trait;

use refdata_core::cache::DefaultCachePolicy;
use refdata_core::provider::{LoadContext, LoadError, ReferenceDataProvider};
use refdata_core::reference::{
    IdKind, RefDataType, ReferenceData, ReferenceDataCollection, ReferenceDataItem,
};

use crate::cache::MemoryCache;
use crate::error::OrchestratorError;

use super::ReferenceDataOrchestrator;

/// Marker type for typed lookups.
pub(crate) struct Country;

impl ReferenceData for Country {
    const NAME: &'static str = "Country";
    const ID_KIND: IdKind = IdKind::Int32;
}

pub(crate) fn country() -> RefDataType {
    RefDataType::of::<Country>()
}

pub(crate) fn gender() -> RefDataType {
    RefDataType::new("people::Gender", "Gender", IdKind::Int32)
}

pub(crate) fn au_nz() -> Vec<ReferenceDataItem> {
    vec![
        ReferenceDataItem::new(1, "AU", "Australia").with_sort_order(2),
        ReferenceDataItem::new(2, "NZ", "New Zealand").with_sort_order(1),
        ReferenceDataItem::new(3, "XX", "Retired").inactive(),
    ]
}

pub(crate) fn orchestrator() -> ReferenceDataOrchestrator {
    ReferenceDataOrchestrator::new(
        Arc::new(MemoryCache::new(100)),
        Arc::new(DefaultCachePolicy::default()),
        4,
    )
}

/// Provider returning the same items for every type it serves.
pub(crate) struct MockProvider {
    types: Vec<RefDataType>,
    items: Vec<ReferenceDataItem>,
    delay: Duration,
    failures: AtomicUsize,
    panics: bool,
    returns: Option<RefDataType>,
    calls: AtomicUsize,
    active: AtomicUsize,
    peak: AtomicUsize,
    hints: Mutex<Vec<Vec<RefDataType>>>,
}

impl MockProvider {
    pub(crate) fn new(types: Vec<RefDataType>, items: Vec<ReferenceDataItem>) -> Self {
        Self {
            types,
            items,
            delay: Duration::ZERO,
            failures: AtomicUsize::new(0),
            panics: false,
            returns: None,
            calls: AtomicUsize::new(0),
            active: AtomicUsize::new(0),
            peak: AtomicUsize::new(0),
            hints: Mutex::new(Vec::new()),
        }
    }

    pub(crate) fn empty(types: Vec<RefDataType>) -> Self {
        Self::new(types, Vec::new())
    }

    pub(crate) fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    /// Fails the first `n` loads.
    pub(crate) fn failing_first(self, n: usize) -> Self {
        self.failures.store(n, Ordering::SeqCst);
        self
    }

    pub(crate) fn panicking(mut self) -> Self {
        self.panics = true;
        self
    }

    /// Builds collections for `ty` regardless of what was requested.
    pub(crate) fn returning(mut self, ty: RefDataType) -> Self {
        self.returns = Some(ty);
        self
    }

    pub(crate) fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Highest number of `get` calls seen running at the same time.
    pub(crate) fn peak_concurrency(&self) -> usize {
        self.peak.load(Ordering::SeqCst)
    }

    pub(crate) fn hints(&self) -> Vec<Vec<RefDataType>> {
        self.hints.lock().unwrap().clone()
    }
}

#[async_trait]
impl ReferenceDataProvider for MockProvider {
    fn types(&self) -> Vec<RefDataType> {
        self.types.clone()
    }

    async fn get(
        &self,
        ty: &RefDataType,
        _ctx: &LoadContext,
    ) -> Result<ReferenceDataCollection, LoadError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let active = self.active.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak.fetch_max(active, Ordering::SeqCst);
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        self.active.fetch_sub(1, Ordering::SeqCst);
        if self.panics {
            panic!("provider exploded");
        }
        if self
            .failures
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok()
        {
            return Err(LoadError::Other("transient failure".to_string()));
        }

        let ty = self.returns.clone().unwrap_or_else(|| ty.clone());
        Ok(ReferenceDataCollection::from_items(ty, self.items.clone())?)
    }

    async fn prefetch(&self, types: &[RefDataType]) -> Result<(), LoadError> {
        self.hints.lock().unwrap().push(types.to_vec());
        Ok(())
    }
}

/// Provider that asks its orchestrator for the type it is loading.
pub(crate) struct ReentrantProvider {
    types: Vec<RefDataType>,
    blocking: bool,
    orchestrator: OnceLock<ReferenceDataOrchestrator>,
    nested: Mutex<Option<Result<bool, OrchestratorError>>>,
}

impl ReentrantProvider {
    pub(crate) fn new(types: Vec<RefDataType>, blocking: bool) -> Self {
        Self {
            types,
            blocking,
            orchestrator: OnceLock::new(),
            nested: Mutex::new(None),
        }
    }

    pub(crate) fn attach(&self, orchestrator: &ReferenceDataOrchestrator) {
        let _ = self.orchestrator.set(orchestrator.clone());
    }

    /// Outcome of the nested request: whether a collection came back, or
    /// the error.
    pub(crate) fn nested(&self) -> Option<Result<bool, OrchestratorError>> {
        self.nested.lock().unwrap().clone()
    }
}

#[async_trait]
impl ReferenceDataProvider for ReentrantProvider {
    fn types(&self) -> Vec<RefDataType> {
        self.types.clone()
    }

    async fn get(
        &self,
        ty: &RefDataType,
        _ctx: &LoadContext,
    ) -> Result<ReferenceDataCollection, LoadError> {
        let orchestrator = self
            .orchestrator
            .get()
            .expect("orchestrator attached")
            .clone();
        let nested = if self.blocking {
            orchestrator.get_by_type_blocking(ty)
        } else {
            orchestrator.get_by_type(ty).await
        };
        *self.nested.lock().unwrap() = Some(nested.map(|collection| collection.is_some()));

        Ok(ReferenceDataCollection::from_items(ty.clone(), au_nz())?)
    }
}
