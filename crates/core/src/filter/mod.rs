mod convert;
mod error;
mod operations;
mod wildcard;

pub use convert::{convert_from_code, convert_from_id, convert_from_mapping};
pub use error::WildcardError;
pub use operations::get_with_filter;
pub use wildcard::Wildcard;
