use std::sync::Arc;

use super::collection::ReferenceDataCollection;
use super::types::RefDataType;

/// Synchronous access to reference-data collections.
///
/// This is the single capability handed to code that resolves keys outside
/// an async context, such as deserialization helpers. Implementations may
/// load on demand or answer from cache only.
pub trait ReferenceDataLookup: Send + Sync {
    /// Returns the collection for `ty`, or `None` when it is unavailable.
    fn collection(&self, ty: &RefDataType) -> Option<Arc<ReferenceDataCollection>>;
}

impl<F> ReferenceDataLookup for F
where
    F: Fn(&RefDataType) -> Option<Arc<ReferenceDataCollection>> + Send + Sync,
{
    fn collection(&self, ty: &RefDataType) -> Option<Arc<ReferenceDataCollection>> {
        self(ty)
    }
}
