//! Codec trait and the binary wire format.
//!
//! A "codec" (coder/decoder) converts between [`Value`]s and raw bytes.
//! The rest of the server doesn't care HOW a value is laid out in bytes;
//! it only needs something that implements [`Codec`]. [`BinaryCodec`] is
//! the format every Quadfall client speaks.
//!
//! ## Wire layout
//!
//! Every value starts with one tag byte (see [`Tag`]), then:
//!
//! | tag | body |
//! |---|---|
//! | Null | nothing |
//! | Bool | 1 byte, 0 or 1 (any nonzero decodes as `true`) |
//! | Int | 8 bytes, little-endian two's complement |
//! | Float | 8 bytes, little-endian IEEE-754 bits |
//! | String | u32 LE length, then that many UTF-8 bytes |
//! | Array | u32 LE count, then that many values |
//! | Map | u32 LE count, then per entry: u32 LE key length, key bytes, value |
//!
//! ## Framing
//!
//! On a stream socket each serialized value is preceded by a 4-byte
//! **big-endian** body length. The little-endian body / big-endian prefix
//! mix is what deployed clients expect, so it stays.

use std::collections::BTreeMap;

use crate::{ProtocolError, Tag, Value};

/// Size of the frame length prefix in bytes.
pub const FRAME_HEADER_LEN: usize = 4;

/// Deepest container nesting the codec accepts, in both directions.
pub const MAX_NESTING_DEPTH: usize = 64;

/// A codec that can turn a [`Value`] into bytes and back.
///
/// `Send + Sync + 'static` lets one codec instance be shared by every
/// connection task through an `Arc`.
pub trait Codec: Send + Sync + 'static {
    /// Serializes a value into a body (no frame prefix).
    ///
    /// # Errors
    /// Returns `ProtocolError::TooLong` or `ProtocolError::NestingTooDeep`
    /// if the value can't be represented on the wire.
    fn encode(&self, value: &Value) -> Result<Vec<u8>, ProtocolError>;

    /// Deserializes exactly one value from `data`.
    ///
    /// # Errors
    /// Returns an error if the bytes are truncated, carry an unknown tag,
    /// hold invalid UTF-8, nest too deeply, or have bytes left over.
    fn decode(&self, data: &[u8]) -> Result<Value, ProtocolError>;

    /// Encodes `value` and prepends the big-endian length prefix.
    fn frame(&self, value: &Value) -> Result<Vec<u8>, ProtocolError> {
        let body = self.encode(value)?;
        let len = u32::try_from(body.len()).map_err(|_| ProtocolError::TooLong(body.len()))?;

        let mut framed = Vec::with_capacity(FRAME_HEADER_LEN + body.len());
        framed.extend_from_slice(&len.to_be_bytes());
        framed.extend_from_slice(&body);
        Ok(framed)
    }
}

// ---------------------------------------------------------------------------
// BinaryCodec
// ---------------------------------------------------------------------------

/// The tagged little-endian format described in the module docs.
///
/// ## Example
///
/// ```rust
/// use quadfall_protocol::{BinaryCodec, Codec, Value};
///
/// let codec = BinaryCodec;
/// let msg: Value = [("type", Value::from("rotate_request"))].into_iter().collect();
///
/// let bytes = codec.encode(&msg).unwrap();
/// assert_eq!(codec.decode(&bytes).unwrap(), msg);
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct BinaryCodec;

impl Codec for BinaryCodec {
    fn encode(&self, value: &Value) -> Result<Vec<u8>, ProtocolError> {
        serialize(value)
    }

    fn decode(&self, data: &[u8]) -> Result<Value, ProtocolError> {
        deserialize(data)
    }
}

/// Serializes `value` with the binary layout.
pub fn serialize(value: &Value) -> Result<Vec<u8>, ProtocolError> {
    let mut out = Vec::new();
    write_value(&mut out, value, 0)?;
    Ok(out)
}

/// Deserializes one value that must span all of `data`.
///
/// An empty buffer decodes to [`Value::Null`].
pub fn deserialize(data: &[u8]) -> Result<Value, ProtocolError> {
    if data.is_empty() {
        return Ok(Value::Null);
    }

    let mut reader = Reader { buf: data, pos: 0 };
    let value = reader.read_value(0)?;

    match reader.remaining() {
        0 => Ok(value),
        n => Err(ProtocolError::TrailingBytes(n)),
    }
}

/// Serializes `value` and frames it for a stream socket.
pub fn pack(value: &Value) -> Result<Vec<u8>, ProtocolError> {
    BinaryCodec.frame(value)
}

/// Reads the body length out of a frame header.
pub fn frame_len(header: [u8; FRAME_HEADER_LEN]) -> usize {
    u32::from_be_bytes(header) as usize
}

// ---------------------------------------------------------------------------
// Encoding
// ---------------------------------------------------------------------------

fn write_len(out: &mut Vec<u8>, len: usize) -> Result<(), ProtocolError> {
    let len = u32::try_from(len).map_err(|_| ProtocolError::TooLong(len))?;
    out.extend_from_slice(&len.to_le_bytes());
    Ok(())
}

fn write_bytes(out: &mut Vec<u8>, bytes: &[u8]) -> Result<(), ProtocolError> {
    write_len(out, bytes.len())?;
    out.extend_from_slice(bytes);
    Ok(())
}

/// `depth` counts the containers enclosing `value`.
fn write_value(out: &mut Vec<u8>, value: &Value, depth: usize) -> Result<(), ProtocolError> {
    out.push(value.tag().as_byte());

    match value {
        Value::Null => {}
        Value::Bool(b) => out.push(u8::from(*b)),
        Value::Int(i) => out.extend_from_slice(&i.to_le_bytes()),
        Value::Float(f) => out.extend_from_slice(&f.to_bits().to_le_bytes()),
        Value::String(s) => write_bytes(out, s.as_bytes())?,
        Value::Array(items) => {
            let depth = enter(depth)?;
            write_len(out, items.len())?;
            for item in items {
                write_value(out, item, depth)?;
            }
        }
        Value::Map(entries) => {
            let depth = enter(depth)?;
            write_len(out, entries.len())?;
            for (key, item) in entries {
                write_bytes(out, key.as_bytes())?;
                write_value(out, item, depth)?;
            }
        }
    }
    Ok(())
}

fn enter(depth: usize) -> Result<usize, ProtocolError> {
    let depth = depth + 1;
    if depth > MAX_NESTING_DEPTH {
        return Err(ProtocolError::NestingTooDeep(MAX_NESTING_DEPTH));
    }
    Ok(depth)
}

// ---------------------------------------------------------------------------
// Decoding
// ---------------------------------------------------------------------------

struct Reader<'a> {
    buf: &'a [u8],
    pos: usize,
}

impl<'a> Reader<'a> {
    fn remaining(&self) -> usize {
        self.buf.len() - self.pos
    }

    fn take(&mut self, n: usize) -> Result<&'a [u8], ProtocolError> {
        let available = self.remaining();
        if n > available {
            return Err(ProtocolError::Truncated {
                needed: n,
                available,
            });
        }
        let slice = &self.buf[self.pos..self.pos + n];
        self.pos += n;
        Ok(slice)
    }

    fn take_array<const N: usize>(&mut self) -> Result<[u8; N], ProtocolError> {
        let mut out = [0u8; N];
        out.copy_from_slice(self.take(N)?);
        Ok(out)
    }

    fn read_len(&mut self) -> Result<usize, ProtocolError> {
        Ok(u32::from_le_bytes(self.take_array()?) as usize)
    }

    fn read_string(&mut self) -> Result<String, ProtocolError> {
        let len = self.read_len()?;
        let bytes = self.take(len)?;
        std::str::from_utf8(bytes)
            .map(str::to_owned)
            .map_err(|_| ProtocolError::InvalidUtf8)
    }

    fn read_value(&mut self, depth: usize) -> Result<Value, ProtocolError> {
        let [tag] = self.take_array::<1>()?;

        Ok(match Tag::try_from(tag)? {
            Tag::Null => Value::Null,
            Tag::Bool => {
                let [b] = self.take_array::<1>()?;
                Value::Bool(b != 0)
            }
            Tag::Int => Value::Int(i64::from_le_bytes(self.take_array()?)),
            Tag::Float => Value::Float(f64::from_bits(u64::from_le_bytes(self.take_array()?))),
            Tag::String => Value::String(self.read_string()?),
            Tag::Array => {
                let depth = enter(depth)?;
                let count = self.read_len()?;
                // A hostile count can't force a huge allocation: each item
                // needs at least one byte.
                let mut items = Vec::with_capacity(count.min(self.remaining()));
                for _ in 0..count {
                    items.push(self.read_value(depth)?);
                }
                Value::Array(items)
            }
            Tag::Map => {
                let depth = enter(depth)?;
                let count = self.read_len()?;
                let mut entries = BTreeMap::new();
                for _ in 0..count {
                    let key = self.read_string()?;
                    let item = self.read_value(depth)?;
                    entries.insert(key, item);
                }
                Value::Map(entries)
            }
        })
    }
}
