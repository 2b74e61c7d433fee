//! Outbound side of a connection: a queue and the task that drains it.
//!
//! Senders never touch the socket. They push complete frames onto an
//! unbounded channel, and one writer task per connection writes them out
//! in order. A slow client therefore never blocks the task that produced
//! the message, and frames from different producers can't interleave.

use std::net::SocketAddr;

use tokio::io::{AsyncWrite, AsyncWriteExt};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::{ConnectionId, TransportError};

/// A cloneable handle for queueing frames to one connection.
#[derive(Debug, Clone)]
pub struct PeerHandle {
    id: ConnectionId,
    addr: SocketAddr,
    tx: mpsc::UnboundedSender<Vec<u8>>,
}

impl PeerHandle {
    pub fn new(id: ConnectionId, addr: SocketAddr, tx: mpsc::UnboundedSender<Vec<u8>>) -> Self {
        Self { id, addr, tx }
    }

    pub fn id(&self) -> ConnectionId {
        self.id
    }

    pub fn addr(&self) -> SocketAddr {
        self.addr
    }

    /// Queues an already framed message. Never blocks.
    ///
    /// # Errors
    /// Returns [`TransportError::ConnectionClosed`] once the writer task
    /// has stopped (socket error or connection torn down).
    pub fn send(&self, frame: Vec<u8>) -> Result<(), TransportError> {
        self.tx
            .send(frame)
            .map_err(|_| TransportError::ConnectionClosed(self.id))
    }

    pub fn is_closed(&self) -> bool {
        self.tx.is_closed()
    }
}

/// Spawns the writer task for `writer` and returns its queue.
///
/// The task ends when every sender has been dropped or a write fails;
/// either way it shuts the write half down on the way out.
pub fn spawn_writer<W>(
    id: ConnectionId,
    mut writer: W,
) -> (mpsc::UnboundedSender<Vec<u8>>, JoinHandle<()>)
where
    W: AsyncWrite + Unpin + Send + 'static,
{
    let (tx, mut rx) = mpsc::unbounded_channel::<Vec<u8>>();

    let task = tokio::spawn(async move {
        while let Some(frame) = rx.recv().await {
            if let Err(e) = writer.write_all(&frame).await {
                tracing::warn!(%id, error = %e, "write failed, stopping writer");
                break;
            }
        }
        rx.close();
        let _ = writer.shutdown().await;
        tracing::debug!(%id, "writer stopped");
    });

    (tx, task)
}
