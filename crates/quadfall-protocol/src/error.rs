//! Error types for the protocol layer.
//!
//! Each crate in Quadfall defines its own error enum. When you see a
//! `ProtocolError`, you know the problem is in the bytes or in the shape
//! of a decoded message, not in networking or game state.

/// Errors that can occur in the protocol layer.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ProtocolError {
    /// The buffer ended before the value was complete.
    ///
    /// `needed` is how many bytes the decoder wanted at that point,
    /// `available` is how many were left.
    #[error("truncated value: needed {needed} bytes, {available} available")]
    Truncated { needed: usize, available: usize },

    /// The tag byte does not name any value variant.
    #[error("unknown value tag {0}")]
    UnknownTag(u8),

    /// A string or map key was not valid UTF-8.
    #[error("string is not valid UTF-8")]
    InvalidUtf8,

    /// A complete value was decoded but bytes were left over.
    #[error("{0} trailing bytes after value")]
    TrailingBytes(usize),

    /// Arrays and maps were nested deeper than the decoder allows.
    #[error("value nested deeper than {0} levels")]
    NestingTooDeep(usize),

    /// A string, array, or map is too long for its 32-bit length field.
    #[error("length {0} does not fit in a 32-bit length field")]
    TooLong(usize),

    /// The decoded message is not a map with a string `type` key.
    #[error("message has no `type` field")]
    MissingType,

    /// The `type` field names a message the server doesn't know.
    #[error("unknown message type `{0}`")]
    UnknownType(String),

    /// A field is missing or holds the wrong kind of value.
    #[error("invalid field `{field}`: {reason}")]
    InvalidField {
        field: &'static str,
        reason: &'static str,
    },
}
