use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// The permitted underlying representations of a reference-data id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IdKind {
    Int32,
    Int64,
    String,
    Uuid,
}

impl fmt::Display for IdKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            IdKind::Int32 => "int32",
            IdKind::Int64 => "int64",
            IdKind::String => "string",
            IdKind::Uuid => "uuid",
        };
        f.write_str(name)
    }
}

/// A typed key: an item id or a mapping value.
///
/// Serialized untagged, so `1`, `"AU"` and a UUID string all deserialize.
/// Numbers deserialize as `Int32` when they fit; use [`KeyValue::coerce`]
/// to bring a loosely-typed value to the kind a type declares.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(untagged)]
pub enum KeyValue {
    Int32(i32),
    Int64(i64),
    Uuid(Uuid),
    String(String),
}

impl KeyValue {
    /// Returns the kind of this value.
    pub fn kind(&self) -> IdKind {
        match self {
            KeyValue::Int32(_) => IdKind::Int32,
            KeyValue::Int64(_) => IdKind::Int64,
            KeyValue::Uuid(_) => IdKind::Uuid,
            KeyValue::String(_) => IdKind::String,
        }
    }

    /// Converts this value to `kind`, returning `None` when it cannot be
    /// represented losslessly.
    pub fn coerce(self, kind: IdKind) -> Option<KeyValue> {
        match (self, kind) {
            (value, kind) if value.kind() == kind => Some(value),
            (KeyValue::Int32(v), IdKind::Int64) => Some(KeyValue::Int64(v.into())),
            (KeyValue::Int64(v), IdKind::Int32) => i32::try_from(v).ok().map(KeyValue::Int32),
            (KeyValue::Int32(v), IdKind::String) => Some(KeyValue::String(v.to_string())),
            (KeyValue::Int64(v), IdKind::String) => Some(KeyValue::String(v.to_string())),
            (KeyValue::Uuid(v), IdKind::String) => Some(KeyValue::String(v.to_string())),
            (KeyValue::String(s), IdKind::Int32) => s.parse().ok().map(KeyValue::Int32),
            (KeyValue::String(s), IdKind::Int64) => s.parse().ok().map(KeyValue::Int64),
            (KeyValue::String(s), IdKind::Uuid) => Uuid::parse_str(&s).ok().map(KeyValue::Uuid),
            _ => None,
        }
    }
}

impl fmt::Display for KeyValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            KeyValue::Int32(v) => write!(f, "{}", v),
            KeyValue::Int64(v) => write!(f, "{}", v),
            KeyValue::Uuid(v) => write!(f, "{}", v),
            KeyValue::String(v) => f.write_str(v),
        }
    }
}

impl From<i32> for KeyValue {
    fn from(value: i32) -> Self {
        KeyValue::Int32(value)
    }
}

impl From<i64> for KeyValue {
    fn from(value: i64) -> Self {
        KeyValue::Int64(value)
    }
}

impl From<Uuid> for KeyValue {
    fn from(value: Uuid) -> Self {
        KeyValue::Uuid(value)
    }
}

impl From<&str> for KeyValue {
    fn from(value: &str) -> Self {
        KeyValue::String(value.to_string())
    }
}

impl From<String> for KeyValue {
    fn from(value: String) -> Self {
        KeyValue::String(value)
    }
}

/// A statically declared reference-data type.
///
/// ```
/// use refdata_core::reference::{IdKind, RefDataType, ReferenceData};
///
/// struct Country;
///
/// impl ReferenceData for Country {
///     const NAME: &'static str = "Country";
///     const ID_KIND: IdKind = IdKind::Int32;
/// }
///
/// let ty = RefDataType::of::<Country>();
/// assert_eq!(ty.name(), "Country");
/// assert_eq!(ty.id_kind(), IdKind::Int32);
/// ```
pub trait ReferenceData: 'static {
    /// Simple name used for name-based lookup (case-insensitive).
    const NAME: &'static str;
    /// Representation used by every id of this type.
    const ID_KIND: IdKind;
}

/// Descriptor of one reference-data type.
///
/// Identity (equality and hashing) is the full name; the simple name is what
/// callers use for name-based lookup.
#[derive(Debug, Clone)]
pub struct RefDataType {
    full_name: Arc<str>,
    name: Arc<str>,
    id_kind: IdKind,
}

impl RefDataType {
    /// Creates a descriptor for a dynamically declared type.
    pub fn new(full_name: impl Into<Arc<str>>, name: impl Into<Arc<str>>, id_kind: IdKind) -> Self {
        Self {
            full_name: full_name.into(),
            name: name.into(),
            id_kind,
        }
    }

    /// Creates the descriptor for a statically declared type.
    pub fn of<T: ReferenceData>() -> Self {
        Self::new(std::any::type_name::<T>(), T::NAME, T::ID_KIND)
    }

    pub fn full_name(&self) -> &str {
        &self.full_name
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn id_kind(&self) -> IdKind {
        self.id_kind
    }

    /// Returns the normalized name used for case-insensitive lookup.
    pub fn lookup_name(&self) -> String {
        self.name.to_lowercase()
    }
}

impl PartialEq for RefDataType {
    fn eq(&self, other: &Self) -> bool {
        self.full_name == other.full_name
    }
}

impl Eq for RefDataType {}

impl Hash for RefDataType {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.full_name.hash(state);
    }
}

impl fmt::Display for RefDataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}
