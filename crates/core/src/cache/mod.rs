mod keys;
mod options;
mod patterns;
mod policy;
mod traits;

pub use keys::{extract_type_name, reference_data_key, tenant_pattern, tenant_reference_data_key};
pub use options::{EntryOptions, EvictionCallback, EvictionReason};
pub use patterns::pattern_matches;
pub use policy::{DefaultCachePolicy, TenantCachePolicy, TtlOverride};
pub use traits::{CachePolicy, CollectionCache};
