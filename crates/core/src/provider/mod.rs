mod context;
mod error;
mod traits;

pub use context::LoadContext;
pub use error::LoadError;
pub use traits::ReferenceDataProvider;
