//! Synchronous access for callers outside async code.
//!
//! Cache hits never block. A miss is driven to completion with
//! `block_in_place` on a multi-thread runtime, or on a private current-thread
//! runtime when the caller is not inside tokio at all. Inside a
//! current-thread runtime the only thread that could drive the load is the
//! caller itself, so the call fails with
//! [`OrchestratorError::BlockingUnavailable`] instead of deadlocking.

use std::future::Future;
use std::sync::Arc;

use tokio::runtime::{Handle, RuntimeFlavor};

use refdata_core::provider::LoadError;
use refdata_core::reference::{RefDataType, ReferenceDataCollection, ReferenceDataLookup};

use crate::error::{OrchestratorError, Result};

use super::flight::ensure_not_loading;
use super::ReferenceDataOrchestrator;

impl ReferenceDataOrchestrator {
    /// Blocking form of [`get_by_type`](Self::get_by_type).
    pub fn get_by_type_blocking(
        &self,
        ty: &RefDataType,
    ) -> Result<Option<Arc<ReferenceDataCollection>>> {
        if !self.is_registered(ty) {
            return Ok(None);
        }
        let key = self.cache_key(ty);
        if let Some(collection) = self.inner.cache.get(&key) {
            return Ok(Some(collection));
        }
        ensure_not_loading(&key, ty)?;
        block_on(ty.name(), self.get_by_type(ty))
    }

    /// Blocking form of [`get_by_name`](Self::get_by_name).
    pub fn get_by_name_blocking(&self, name: &str) -> Result<Option<Arc<ReferenceDataCollection>>> {
        match self.resolve_name(name) {
            Some(ty) => self.get_by_type_blocking(&ty),
            None => Ok(None),
        }
    }
}

fn block_on<T, F>(type_name: &str, future: F) -> Result<T>
where
    F: Future<Output = Result<T>>,
{
    match Handle::try_current() {
        Ok(handle) => match handle.runtime_flavor() {
            RuntimeFlavor::MultiThread => tokio::task::block_in_place(|| handle.block_on(future)),
            _ => Err(OrchestratorError::BlockingUnavailable(type_name.to_string())),
        },
        Err(_) => {
            let runtime = tokio::runtime::Builder::new_current_thread()
                .enable_all()
                .build()
                .map_err(|e| OrchestratorError::LoadFailed {
                    type_name: type_name.to_string(),
                    source: LoadError::Other(format!("failed to start runtime: {}", e)),
                })?;
            runtime.block_on(future)
        }
    }
}

/// Resolves through the blocking shim; failures are logged and read as
/// "not available".
impl ReferenceDataLookup for ReferenceDataOrchestrator {
    fn collection(&self, ty: &RefDataType) -> Option<Arc<ReferenceDataCollection>> {
        match self.get_by_type_blocking(ty) {
            Ok(collection) => collection,
            Err(error) => {
                tracing::warn!(type_name = %ty.name(), %error, "reference data lookup failed");
                None
            }
        }
    }
}
