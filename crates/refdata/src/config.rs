use std::{env, time::Duration};

use refdata_core::cache::DefaultCachePolicy;

/// Orchestrator configuration loaded from environment variables.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Absolute cache expiry in seconds, 0 disables it (default: 7200)
    pub cache_ttl_seconds: u64,
    /// Sliding cache expiry in seconds, 0 disables it (default: 1800)
    pub cache_sliding_seconds: u64,
    /// Maximum number of cached collections (default: 1,000)
    pub cache_max_entries: usize,
    /// Maximum number of loads a prefetch runs at once (default: 4)
    pub prefetch_concurrency: usize,
    /// Seed file read by the CLI (default: "refdata.json")
    pub seed_path: String,
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// Environment variables:
    /// - `REFDATA_CACHE_TTL_SECONDS` - Absolute expiry (default: 7200)
    /// - `REFDATA_CACHE_SLIDING_SECONDS` - Sliding expiry (default: 1800)
    /// - `REFDATA_CACHE_MAX_ENTRIES` - Maximum cache entries (default: 1,000)
    /// - `REFDATA_PREFETCH_CONCURRENCY` - Parallel prefetch loads (default: 4)
    /// - `REFDATA_SEED_PATH` - Seed file path (default: "refdata.json")
    pub fn from_env() -> Self {
        Self {
            cache_ttl_seconds: parse_var("REFDATA_CACHE_TTL_SECONDS").unwrap_or(7_200),
            cache_sliding_seconds: parse_var("REFDATA_CACHE_SLIDING_SECONDS").unwrap_or(1_800),
            cache_max_entries: parse_var("REFDATA_CACHE_MAX_ENTRIES")
                .filter(|&n| n > 0)
                .unwrap_or(1_000),
            prefetch_concurrency: parse_var("REFDATA_PREFETCH_CONCURRENCY")
                .filter(|&n| n > 0)
                .unwrap_or(4),
            seed_path: env::var("REFDATA_SEED_PATH").unwrap_or_else(|_| "refdata.json".to_string()),
        }
    }

    pub fn cache_ttl(&self) -> Option<Duration> {
        non_zero_secs(self.cache_ttl_seconds)
    }

    pub fn cache_sliding(&self) -> Option<Duration> {
        non_zero_secs(self.cache_sliding_seconds)
    }

    /// Builds the default cache policy from the configured expiry.
    pub fn cache_policy(&self) -> DefaultCachePolicy {
        DefaultCachePolicy::new(self.cache_ttl(), self.cache_sliding())
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::from_env()
    }
}

fn parse_var<T: std::str::FromStr>(name: &str) -> Option<T> {
    env::var(name).ok().and_then(|v| v.trim().parse().ok())
}

fn non_zero_secs(secs: u64) -> Option<Duration> {
    (secs > 0).then(|| Duration::from_secs(secs))
}
