//! The value model: the universal in-memory form of a message.
//!
//! Every message that travels on the wire is a [`Value`] — usually a
//! [`Value::Map`] with a `type` key. The codec (see `codec.rs`) turns a
//! `Value` into bytes and back; the message layer (see `message.rs`) turns
//! a `Value` into a typed Rust enum.
//!
//! A `Value` is a plain owned tree. Cloning it deep-copies everything, so
//! two messages never share data.

use std::collections::BTreeMap;

use crate::{PlayerId, ProtocolError};

/// A self-describing tagged value.
///
/// This is a Rust `enum` carrying data in each variant (a "tagged union").
/// Exactly one variant is live at a time. Asking for the wrong variant
/// through an accessor (e.g. [`Value::as_int`] on a string) returns `None`
/// rather than a garbage default.
///
/// Maps use a `BTreeMap`, so keys are unique and iteration (and therefore
/// the encoded byte order) is sorted by key. Receivers must not rely on
/// that order.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Value {
    /// No value.
    #[default]
    Null,
    /// A boolean.
    Bool(bool),
    /// A 64-bit signed integer.
    Int(i64),
    /// A 64-bit IEEE-754 float.
    Float(f64),
    /// A UTF-8 string.
    String(String),
    /// An ordered sequence of values.
    Array(Vec<Value>),
    /// String keys to values.
    Map(BTreeMap<String, Value>),
}

/// The one-byte wire tag that precedes every encoded value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum Tag {
    Null = 0,
    Bool = 1,
    Int = 2,
    Float = 3,
    String = 4,
    Array = 5,
    Map = 6,
}

impl Tag {
    /// The byte written on the wire for this tag.
    pub fn as_byte(self) -> u8 {
        self as u8
    }
}

impl TryFrom<u8> for Tag {
    type Error = ProtocolError;

    fn try_from(byte: u8) -> Result<Self, Self::Error> {
        match byte {
            0 => Ok(Self::Null),
            1 => Ok(Self::Bool),
            2 => Ok(Self::Int),
            3 => Ok(Self::Float),
            4 => Ok(Self::String),
            5 => Ok(Self::Array),
            6 => Ok(Self::Map),
            other => Err(ProtocolError::UnknownTag(other)),
        }
    }
}

impl Value {
    /// Creates an empty map value.
    pub fn map() -> Self {
        Self::Map(BTreeMap::new())
    }

    /// Returns the wire tag of this value.
    pub fn tag(&self) -> Tag {
        match self {
            Self::Null => Tag::Null,
            Self::Bool(_) => Tag::Bool,
            Self::Int(_) => Tag::Int,
            Self::Float(_) => Tag::Float,
            Self::String(_) => Tag::String,
            Self::Array(_) => Tag::Array,
            Self::Map(_) => Tag::Map,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            Self::Int(i) => Some(*i),
            _ => None,
        }
    }

    pub fn as_float(&self) -> Option<f64> {
        match self {
            Self::Float(f) => Some(*f),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<&[Value]> {
        match self {
            Self::Array(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_map(&self) -> Option<&BTreeMap<String, Value>> {
        match self {
            Self::Map(entries) => Some(entries),
            _ => None,
        }
    }

    /// Looks up `key` if this value is a map.
    ///
    /// Returns `None` both for a missing key and for a non-map value.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.as_map().and_then(|entries| entries.get(key))
    }

    /// Inserts `key` into this map, replacing any previous entry.
    ///
    /// Returns `false` (and changes nothing) if this value is not a map.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) -> bool {
        match self {
            Self::Map(entries) => {
                entries.insert(key.into(), value.into());
                true
            }
            _ => false,
        }
    }
}

// ---------------------------------------------------------------------------
// Conversions
// ---------------------------------------------------------------------------

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Self::Bool(b)
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Self::Int(i)
    }
}

impl From<i32> for Value {
    fn from(i: i32) -> Self {
        Self::Int(i64::from(i))
    }
}

impl From<u8> for Value {
    fn from(i: u8) -> Self {
        Self::Int(i64::from(i))
    }
}

/// Saturates at `i64::MAX`; scores and ids never get near it.
impl From<u64> for Value {
    fn from(i: u64) -> Self {
        Self::Int(i64::try_from(i).unwrap_or(i64::MAX))
    }
}

impl From<f64> for Value {
    fn from(f: f64) -> Self {
        Self::Float(f)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Self::String(s.to_owned())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Self::String(s)
    }
}

impl From<PlayerId> for Value {
    fn from(id: PlayerId) -> Self {
        Self::from(id.0)
    }
}

impl<T: Into<Value>> From<Vec<T>> for Value {
    fn from(items: Vec<T>) -> Self {
        Self::Array(items.into_iter().map(Into::into).collect())
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(opt: Option<T>) -> Self {
        opt.map_or(Self::Null, Into::into)
    }
}

impl From<BTreeMap<String, Value>> for Value {
    fn from(entries: BTreeMap<String, Value>) -> Self {
        Self::Map(entries)
    }
}

/// Collecting `(key, value)` pairs builds a map:
///
/// ```rust
/// use quadfall_protocol::Value;
///
/// let msg: Value = [("type", Value::from("rotate_request"))].into_iter().collect();
/// assert_eq!(msg.get("type").and_then(Value::as_str), Some("rotate_request"));
/// ```
impl<K: Into<String>> FromIterator<(K, Value)> for Value {
    fn from_iter<I: IntoIterator<Item = (K, Value)>>(iter: I) -> Self {
        Self::Map(iter.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }
}
