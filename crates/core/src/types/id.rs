//! Newtype IDs for type-safe entity references.
//!
//! Use the `define_id!` macro to create type-safe ID wrappers that prevent
//! accidentally mixing IDs from different entity types.
//!
//! New records get numeric ids. Older screens keyed clients, orders and
//! invoices with text such as `"1700000000000k3j9x2abc"` (a millisecond
//! timestamp followed by a random base-36 suffix); those ids are kept as
//! [`TextId`] and written back exactly as they were read.

use core::cmp::Ordering;
use core::fmt;
use core::hash::{Hash, Hasher};

use thiserror::Error;

/// Longest text id accepted from a stored document.
pub const MAX_TEXT_ID_LEN: usize = 32;

/// Error returned when a value cannot be used as an id.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IdError {
    #[error("id is empty")]
    Empty,
    #[error("id is longer than {MAX_TEXT_ID_LEN} characters: {0}")]
    TooLong(String),
    #[error("id may only contain letters, digits, '-' and '_': {0}")]
    InvalidCharacter(String),
}

/// A short ASCII id stored inline so ids stay `Copy`.
#[derive(Clone, Copy)]
pub struct TextId {
    len: u8,
    bytes: [u8; MAX_TEXT_ID_LEN],
}

impl TextId {
    /// Parse a text id.
    ///
    /// # Errors
    ///
    /// Returns `IdError` for an empty id, one longer than
    /// [`MAX_TEXT_ID_LEN`], or one with characters other than ASCII
    /// letters, digits, `-` and `_`.
    pub fn parse(text: &str) -> Result<Self, IdError> {
        let text = text.trim();
        if text.is_empty() {
            return Err(IdError::Empty);
        }
        if !text
            .bytes()
            .all(|b| b.is_ascii_alphanumeric() || b == b'-' || b == b'_')
        {
            return Err(IdError::InvalidCharacter(text.to_owned()));
        }
        let len = u8::try_from(text.len())
            .ok()
            .filter(|len| usize::from(*len) <= MAX_TEXT_ID_LEN)
            .ok_or_else(|| IdError::TooLong(text.to_owned()))?;

        let mut bytes = [0; MAX_TEXT_ID_LEN];
        for (slot, byte) in bytes.iter_mut().zip(text.bytes()) {
            *slot = byte;
        }
        Ok(Self { len, bytes })
    }

    /// The id as it was stored.
    #[must_use]
    pub fn as_str(&self) -> &str {
        self.bytes
            .get(..usize::from(self.len))
            .and_then(|bytes| core::str::from_utf8(bytes).ok())
            .unwrap_or_default()
    }
}

impl PartialEq for TextId {
    fn eq(&self, other: &Self) -> bool {
        self.as_str() == other.as_str()
    }
}

impl Eq for TextId {}

impl PartialOrd for TextId {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for TextId {
    fn cmp(&self, other: &Self) -> Ordering {
        self.as_str().cmp(other.as_str())
    }
}

impl Hash for TextId {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.as_str().hash(state);
    }
}

impl fmt::Debug for TextId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self.as_str(), f)
    }
}

/// Stored form of every id: a number, or a text key from older documents.
///
/// Numeric ids sort before text ids.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum RawId {
    Number(i64),
    Text(TextId),
}

impl RawId {
    /// Parse an id, preferring the numeric form (`"42"` is the number 42).
    ///
    /// # Errors
    ///
    /// Returns `IdError` if the text is neither a number nor a valid
    /// [`TextId`].
    pub fn parse(text: &str) -> Result<Self, IdError> {
        let text = text.trim();
        match text.parse::<i64>() {
            Ok(id) => Ok(Self::Number(id)),
            Err(_) => TextId::parse(text).map(Self::Text),
        }
    }
}

impl fmt::Display for RawId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Number(id) => write!(f, "{id}"),
            Self::Text(id) => f.write_str(id.as_str()),
        }
    }
}

impl serde::Serialize for RawId {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        match self {
            Self::Number(id) => serializer.serialize_i64(*id),
            Self::Text(id) => serializer.serialize_str(id.as_str()),
        }
    }
}

impl<'de> serde::Deserialize<'de> for RawId {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        #[derive(serde::Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Number(i64),
            Text(String),
        }

        match Raw::deserialize(deserializer)? {
            Raw::Number(id) => Ok(Self::Number(id)),
            Raw::Text(text) => Self::parse(&text).map_err(serde::de::Error::custom),
        }
    }
}

/// Macro to define a type-safe ID wrapper.
///
/// Creates a newtype wrapper around [`RawId`] with:
/// - `Serialize` as a bare JSON number, or as a string for text ids
/// - `Deserialize` from a number, a numeric string (older documents stored
///   client ids as `"1"`) or a text id
/// - `Debug`, `Clone`, `Copy`, `PartialEq`, `Eq`, `Hash`, `Ord`
/// - Conversion methods: `new()`, `as_i64()`, `raw()`
/// - `From<i64>` and `FromStr` implementations
///
/// # Example
///
/// ```rust
/// # use ferreteria_core::define_id;
/// define_id!(UserId);
/// define_id!(OrderId);
///
/// let user_id = UserId::new(1);
/// let order_id = OrderId::new(1);
///
/// // These are different types, so this won't compile:
/// // let _: UserId = order_id;
/// ```
#[macro_export]
macro_rules! define_id {
    ($name:ident) => {
        #[derive(
            Debug,
            Clone,
            Copy,
            PartialEq,
            Eq,
            PartialOrd,
            Ord,
            Hash,
            ::serde::Serialize,
            ::serde::Deserialize,
        )]
        #[serde(transparent)]
        pub struct $name($crate::RawId);

        impl $name {
            /// Create a new numeric ID.
            #[must_use]
            pub const fn new(id: i64) -> Self {
                Self($crate::RawId::Number(id))
            }

            /// The numeric value, or `None` for a text id.
            #[must_use]
            pub const fn as_i64(&self) -> Option<i64> {
                match self.0 {
                    $crate::RawId::Number(id) => Some(id),
                    $crate::RawId::Text(_) => None,
                }
            }

            /// The stored form.
            #[must_use]
            pub const fn raw(&self) -> $crate::RawId {
                self.0
            }
        }

        impl ::core::fmt::Display for $name {
            fn fmt(&self, f: &mut ::core::fmt::Formatter<'_>) -> ::core::fmt::Result {
                ::core::fmt::Display::fmt(&self.0, f)
            }
        }

        impl From<i64> for $name {
            fn from(id: i64) -> Self {
                Self::new(id)
            }
        }

        impl ::core::str::FromStr for $name {
            type Err = $crate::IdError;

            fn from_str(s: &str) -> ::core::result::Result<Self, Self::Err> {
                $crate::RawId::parse(s).map(Self)
            }
        }
    };
}

// Define standard entity IDs
define_id!(UserId);
define_id!(ProductId);
define_id!(OrderId);
define_id!(ClientId);
define_id!(InvoiceId);
define_id!(SupplierId);
