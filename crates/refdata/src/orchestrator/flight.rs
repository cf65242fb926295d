//! Single-flight loading.
//!
//! Each cache key has a slot guarded by an async mutex. Under that mutex a
//! caller re-checks the cache, then either joins the flight already stored in
//! the slot or starts one. A flight is a detached task wrapped in a shared
//! future: dropping any one waiter never cancels the load. The task takes the
//! slot mutex again before installing its result and emptying the slot, so a
//! caller always observes either the flight or the cached collection.
//!
//! The keys a load task is working on are carried in a task-local set. A
//! provider that asks for one of those keys again, directly or through the
//! blocking shim, gets [`OrchestratorError::ReentrantLoad`] instead of
//! waiting on its own flight.

use std::any::Any;
use std::collections::HashSet;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use std::time::Instant;

use futures_util::future::{BoxFuture, FutureExt, Shared};
use tokio::sync::Mutex as AsyncMutex;

use refdata_core::provider::{LoadContext, LoadError, ReferenceDataProvider};
use refdata_core::reference::{RefDataType, ReferenceDataCollection};

use crate::error::{OrchestratorError, Result};

use super::Inner;

pub(crate) type LoadResult = Result<Arc<ReferenceDataCollection>>;

type Flight = Shared<BoxFuture<'static, LoadResult>>;

pub(crate) type FlightSlot = Arc<AsyncMutex<Option<Flight>>>;

tokio::task_local! {
    static LOADING: HashSet<String>;
}

/// Fails if the current task is already loading `key`.
pub(crate) fn ensure_not_loading(key: &str, ty: &RefDataType) -> Result<()> {
    let reentrant = LOADING.try_with(|keys| keys.contains(key));
    if reentrant.unwrap_or(false) {
        tracing::warn!(key = %key, "re-entrant reference data load");
        return Err(OrchestratorError::ReentrantLoad(ty.full_name().to_string()));
    }
    Ok(())
}

impl Inner {
    /// Loads `ty` under `key`, sharing the load with concurrent callers.
    pub(crate) async fn load(
        self: &Arc<Self>,
        ty: &RefDataType,
        key: String,
        provider: Arc<dyn ReferenceDataProvider>,
    ) -> LoadResult {
        ensure_not_loading(&key, ty)?;

        let slot = self.slot(&key);
        let mut in_flight = slot.lock().await;

        if let Some(collection) = self.cache.get(&key) {
            tracing::debug!(key = %key, "loaded by a concurrent caller");
            drop(in_flight);
            self.release(&key, slot);
            return Ok(collection);
        }

        // A resolved flight whose task never emptied the slot is stale.
        let flight = match in_flight.as_ref().filter(|f| f.peek().is_none()) {
            Some(flight) => {
                tracing::debug!(key = %key, "joining in-flight load");
                flight.clone()
            }
            None => {
                let flight = self.start(ty.clone(), key, provider, slot.clone());
                *in_flight = Some(flight.clone());
                flight
            }
        };
        drop(in_flight);
        drop(slot);

        flight.await
    }

    fn slot(&self, key: &str) -> FlightSlot {
        let mut flights = self.flights.lock().expect("Lock poisoned");
        flights.entry(key.to_string()).or_default().clone()
    }

    /// Drops the slot for `key` when nobody but the table and `slot` hold it.
    fn release(&self, key: &str, slot: FlightSlot) {
        let mut flights = self.flights.lock().expect("Lock poisoned");
        let idle = flights
            .get(key)
            .is_some_and(|current| Arc::ptr_eq(current, &slot) && Arc::strong_count(&slot) == 2);
        if idle {
            flights.remove(key);
        }
    }

    fn start(
        self: &Arc<Self>,
        ty: RefDataType,
        key: String,
        provider: Arc<dyn ReferenceDataProvider>,
        slot: FlightSlot,
    ) -> Flight {
        let inner = Arc::clone(self);
        let type_name = ty.name().to_string();
        let mut loading = LOADING.try_with(|keys| keys.clone()).unwrap_or_default();
        loading.insert(key.clone());

        let task = tokio::spawn(async move {
            let ctx = LoadContext::new(ty.clone(), key.clone());
            let fetched = fetch(provider.as_ref(), &ty, &ctx);
            let result = LOADING.scope(loading, fetched).await;

            let result = {
                let mut in_flight = slot.lock().await;
                let result = result.and_then(|c| inner.install(&ty, &key, c));
                *in_flight = None;
                result
            };
            inner.release(&key, slot);

            result
        });

        async move {
            task.await.unwrap_or_else(|e| {
                Err(OrchestratorError::LoadFailed {
                    type_name,
                    source: LoadError::Other(format!("load task failed: {}", e)),
                })
            })
        }
        .boxed()
        .shared()
    }

    /// Stores a loaded collection. A panicking policy or cache fails the load
    /// without leaving the slot occupied.
    fn install(
        &self,
        ty: &RefDataType,
        key: &str,
        collection: Arc<ReferenceDataCollection>,
    ) -> LoadResult {
        let stored = panic::catch_unwind(AssertUnwindSafe(|| {
            let options = self.policy.entry_options(ty);
            self.cache.set(key, collection.clone(), options);
        }));

        match stored {
            Ok(()) => Ok(collection),
            Err(payload) => {
                let message = panic_message(&*payload);
                tracing::warn!(key = %key, %message, "failed to cache reference data");
                Err(OrchestratorError::LoadFailed {
                    type_name: ty.name().to_string(),
                    source: LoadError::Other(format!("caching panicked: {}", message)),
                })
            }
        }
    }
}

/// Runs one provider call, turning errors, panics and wrong-typed results
/// into an [`OrchestratorError`].
async fn fetch(
    provider: &dyn ReferenceDataProvider,
    ty: &RefDataType,
    ctx: &LoadContext,
) -> LoadResult {
    let started = Instant::now();
    tracing::info!(
        type_name = %ty.name(),
        cache_key = %ctx.cache_key,
        load_id = %ctx.load_id,
        "loading reference data"
    );

    let result = match AssertUnwindSafe(provider.get(ty, ctx)).catch_unwind().await {
        Ok(Ok(collection)) if collection.ref_type() != ty => Err(OrchestratorError::TypeMismatch {
            expected: ty.full_name().to_string(),
            actual: collection.ref_type().full_name().to_string(),
        }),
        Ok(Ok(collection)) => Ok(Arc::new(collection)),
        Ok(Err(source)) => Err(OrchestratorError::LoadFailed {
            type_name: ty.name().to_string(),
            source,
        }),
        Err(payload) => Err(OrchestratorError::LoadFailed {
            type_name: ty.name().to_string(),
            source: LoadError::Other(format!("provider panicked: {}", panic_message(&*payload))),
        }),
    };

    let elapsed_ms = started.elapsed().as_millis() as u64;
    match &result {
        Ok(collection) => tracing::info!(
            type_name = %ty.name(),
            load_id = %ctx.load_id,
            items = collection.len(),
            elapsed_ms,
            "loaded reference data"
        ),
        Err(error) => tracing::warn!(
            type_name = %ty.name(),
            load_id = %ctx.load_id,
            elapsed_ms,
            %error,
            "reference data load failed"
        ),
    }
    result
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        message.to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic".to_string()
    }
}
