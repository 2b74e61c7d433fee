//! Wire protocol for Quadfall.
//!
//! This crate defines the "language" that clients and the server speak:
//!
//! - **Value model** ([`Value`]) — a self-describing tagged value used as
//!   the in-memory form of every message.
//! - **Codec** ([`Codec`] trait, [`BinaryCodec`]) — how values are turned
//!   into bytes and back, plus the length-prefixed framing used on TCP.
//! - **Messages** ([`ClientMessage`], [`ClientRequest`], [`ServerMessage`])
//!   — closed enums decoded once from a [`Value`] at the network boundary.
//! - **Errors** ([`ProtocolError`]) — what can go wrong while decoding.
//!
//! # Architecture
//!
//! The protocol layer sits between transport (raw frames) and the game.
//! It doesn't know about sockets or boards; it only knows how to move
//! values in and out of bytes.
//!
//! ```text
//! Transport (frame bytes) → Protocol (Value → ClientMessage) → Game
//! ```

mod codec;
mod error;
mod message;
mod types;
mod value;

pub use codec::{
    BinaryCodec, Codec, FRAME_HEADER_LEN, MAX_NESTING_DEPTH, deserialize, frame_len, pack,
    serialize,
};
pub use error::ProtocolError;
pub use message::{ClientMessage, ClientRequest, ConnectStatus, Direction, ServerMessage};
pub use types::PlayerId;
pub use value::{Tag, Value};
