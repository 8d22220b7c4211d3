//! Query-string value types and utilities.
//!
//! This module defines the [`Value`] enum, which represents any payload the
//! codec can decode or encode, and the [`Map`]/[`List`] aliases used for its
//! container variants.

use std::borrow::Cow;

use chrono::{DateTime, SecondsFormat, Utc};
use indexmap::IndexMap;

/// An insertion-ordered mapping from string keys to [`Value`]s.
///
/// Key order is observable and round-trips through the codec.
pub type Map = IndexMap<String, Value>;

/// An ordered sequence of [`Value`]s.
pub type List = Vec<Value>;

/// A value decoded from, or encodable to, a query string.
///
/// Decoding only ever produces [`Str`], [`List`] and [`Map`] variants; the
/// remaining scalars exist so callers can hand richer payloads to the encoder
/// (and so custom decoders can return them).
///
/// # Examples
///
/// ```
/// use qsmodem::{Map, Value};
///
/// let mut map = Map::new();
/// map.insert("key".to_string(), Value::Str("value".into()));
/// let v = Value::Map(map);
/// assert!(v.is_map());
/// ```
///
/// [`Str`]: Value::Str
/// [`List`]: Value::List
/// [`Map`]: Value::Map
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Clone, Debug, PartialEq)]
pub enum Value {
    /// The internal "absent" sentinel, distinct from [`Null`].
    ///
    /// It marks holes in sparse sequences while pairs are being merged and is
    /// stripped by compaction; it never appears in decoded output and is
    /// never emitted by the encoder.
    ///
    /// [`Null`]: Value::Null
    Undefined,
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
    Bytes(Vec<u8>),
    DateTime(DateTime<Utc>),
    List(List),
    Map(Map),
}

impl Default for Value {
    fn default() -> Self {
        Self::Null
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Self::Bool(v)
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Self::Int(v)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Self::Float(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Self::Str(v.to_owned())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Self::Str(v)
    }
}

impl From<DateTime<Utc>> for Value {
    fn from(v: DateTime<Utc>) -> Self {
        Self::DateTime(v)
    }
}

impl From<Vec<Value>> for Value {
    fn from(v: Vec<Value>) -> Self {
        Self::List(v)
    }
}

impl From<Map> for Value {
    fn from(v: Map) -> Self {
        Self::Map(v)
    }
}

impl Value {
    /// Returns `true` if the value is [`Undefined`].
    ///
    /// [`Undefined`]: Value::Undefined
    #[must_use]
    pub fn is_undefined(&self) -> bool {
        matches!(self, Self::Undefined)
    }

    /// Returns `true` if the value is [`Null`].
    ///
    /// [`Null`]: Value::Null
    #[must_use]
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Returns `true` if the value is [`Str`].
    ///
    /// [`Str`]: Value::Str
    #[must_use]
    pub fn is_str(&self) -> bool {
        matches!(self, Self::Str(..))
    }

    /// Returns `true` if the value is [`List`].
    ///
    /// [`List`]: Value::List
    #[must_use]
    pub fn is_list(&self) -> bool {
        matches!(self, Self::List(..))
    }

    /// Returns `true` if the value is [`Map`].
    ///
    /// [`Map`]: Value::Map
    #[must_use]
    pub fn is_map(&self) -> bool {
        matches!(self, Self::Map(..))
    }

    /// Returns `true` for the container variants ([`List`] and [`Map`]).
    ///
    /// [`List`]: Value::List
    /// [`Map`]: Value::Map
    #[must_use]
    pub fn is_container(&self) -> bool {
        matches!(self, Self::List(..) | Self::Map(..))
    }

    /// The text a scalar contributes to a query string.
    ///
    /// `None` for containers and for [`Undefined`], which have no scalar
    /// rendering. [`Null`] renders as the empty string, booleans as lowercase
    /// `true`/`false`, and timestamps in their ISO 8601 millisecond form.
    ///
    /// [`Undefined`]: Value::Undefined
    /// [`Null`]: Value::Null
    #[must_use]
    pub fn scalar_text(&self) -> Option<Cow<'_, str>> {
        match self {
            Self::Undefined | Self::List(..) | Self::Map(..) => None,
            Self::Null => Some(Cow::Borrowed("")),
            Self::Bool(b) => Some(Cow::Borrowed(if *b { "true" } else { "false" })),
            Self::Int(i) => Some(Cow::Owned(i.to_string())),
            Self::Float(f) => Some(Cow::Owned(f.to_string())),
            Self::Str(s) => Some(Cow::Borrowed(s)),
            Self::Bytes(b) => Some(String::from_utf8_lossy(b)),
            Self::DateTime(dt) => Some(Cow::Owned(
                dt.to_rfc3339_opts(SecondsFormat::Millis, true),
            )),
        }
    }

    /// Coerces a decoder-returned value into the string used for key-path
    /// splitting. Sequences join their elements with `,`; containers without
    /// a text form coerce to the empty string.
    pub(crate) fn coerce_key(&self) -> String {
        match self {
            Self::List(items) => items
                .iter()
                .map(|v| v.coerce_key())
                .collect::<Vec<_>>()
                .join(","),
            other => other
                .scalar_text()
                .map_or_else(String::new, Cow::into_owned),
        }
    }
}
