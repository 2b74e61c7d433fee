//! Transport layer for Quadfall.
//!
//! Provides the [`Transport`] trait, a TCP implementation
//! ([`TcpTransport`]), and the two halves every connection is split into:
//!
//! - [`FrameReader`] — pulls one length-prefixed frame at a time off the
//!   read half.
//! - [`PeerHandle`] — a cheap, cloneable sender that queues whole frames
//!   for a dedicated writer task.
//!
//! Frames are opaque bytes here; decoding them is the protocol layer's job.

#![allow(async_fn_in_trait)]

mod error;
mod frame;
mod peer;
mod tcp;

pub use error::TransportError;
pub use frame::FrameReader;
pub use peer::{PeerHandle, spawn_writer};
pub use tcp::{TcpConnection, TcpTransport};

use std::fmt;
use std::net::SocketAddr;

/// Opaque identifier for a connection.
///
/// Assigned by the accepting transport, starting at 1, never reused by
/// that transport.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ConnectionId(u64);

impl ConnectionId {
    pub fn new(id: u64) -> Self {
        Self(id)
    }

    pub fn into_inner(self) -> u64 {
        self.0
    }
}

impl fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "conn-{}", self.0)
    }
}

/// Accepts new incoming connections.
pub trait Transport: Send + Sync + 'static {
    /// The connection type produced by this transport.
    type Connection: Send + 'static;
    /// The error type for transport operations.
    type Error: std::error::Error + Send + Sync;

    /// Waits for and accepts the next incoming connection.
    async fn accept(&mut self) -> Result<Self::Connection, Self::Error>;

    /// The address the transport is listening on.
    fn local_addr(&self) -> Result<SocketAddr, Self::Error>;
}
