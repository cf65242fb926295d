//! Reference-data caching orchestrator.
//!
//! Providers are registered per reference-data type; the orchestrator serves
//! collections from an in-process cache and collapses concurrent first loads
//! of the same cache key into a single provider call.

pub mod cache;
pub mod config;
pub mod error;
pub mod orchestrator;
pub mod providers;
pub mod storage;

pub use config::Config;
pub use error::{OrchestratorError, Result};
pub use orchestrator::{NamedReferenceData, ReferenceDataOrchestrator};
