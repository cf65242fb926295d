mod code_list;
mod collection;
mod error;
mod item;
mod lookup;
mod sorting;
mod types;
mod validity;

pub use code_list::ReferenceDataCodeList;
pub use collection::{CollectionView, ReferenceDataCollection};
pub use error::{CollectionError, Result};
pub use item::ReferenceDataItem;
pub use lookup::ReferenceDataLookup;
pub use sorting::{sort_items, SortOrder};
pub use types::{IdKind, KeyValue, RefDataType, ReferenceData};
pub use validity::{AsDate, ValidityContext};
