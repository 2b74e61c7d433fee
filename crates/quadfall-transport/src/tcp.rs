//! TCP transport.

use std::net::SocketAddr;

use tokio::net::tcp::OwnedReadHalf;
use tokio::net::{TcpListener, TcpStream, ToSocketAddrs};

use crate::{ConnectionId, FrameReader, PeerHandle, Transport, TransportError, spawn_writer};

/// A TCP [`Transport`] that listens for incoming connections.
///
/// Connection ids come from a counter owned by this transport, so two
/// servers in one process number their connections independently.
pub struct TcpTransport {
    listener: TcpListener,
    next_id: u64,
}

impl TcpTransport {
    /// Binds a new TCP transport to the given address.
    pub async fn bind(addr: impl ToSocketAddrs) -> Result<Self, TransportError> {
        let listener = TcpListener::bind(addr)
            .await
            .map_err(TransportError::BindFailed)?;
        let local = listener.local_addr().map_err(TransportError::LocalAddr)?;
        tracing::info!(%local, "TCP transport listening");
        Ok(Self {
            listener,
            next_id: 1,
        })
    }
}

impl Transport for TcpTransport {
    type Connection = TcpConnection;
    type Error = TransportError;

    async fn accept(&mut self) -> Result<Self::Connection, Self::Error> {
        let (stream, addr) = self
            .listener
            .accept()
            .await
            .map_err(TransportError::AcceptFailed)?;

        if let Err(e) = stream.set_nodelay(true) {
            tracing::debug!(%addr, error = %e, "could not set TCP_NODELAY");
        }

        let id = ConnectionId::new(self.next_id);
        self.next_id += 1;
        tracing::debug!(%id, %addr, "accepted TCP connection");

        Ok(TcpConnection { id, addr, stream })
    }

    fn local_addr(&self) -> Result<SocketAddr, Self::Error> {
        self.listener.local_addr().map_err(TransportError::LocalAddr)
    }
}

/// A single accepted TCP connection, not yet split.
#[derive(Debug)]
pub struct TcpConnection {
    id: ConnectionId,
    addr: SocketAddr,
    stream: TcpStream,
}

impl TcpConnection {
    pub fn id(&self) -> ConnectionId {
        self.id
    }

    pub fn peer_addr(&self) -> SocketAddr {
        self.addr
    }

    /// Splits the socket into a frame reader and a peer handle backed by a
    /// freshly spawned writer task.
    ///
    /// The writer keeps running while any clone of the handle is alive.
    pub fn split(self, max_frame_len: usize) -> (FrameReader<OwnedReadHalf>, PeerHandle) {
        let (read, write) = self.stream.into_split();
        let (tx, _task) = spawn_writer(self.id, write);
        (
            FrameReader::new(read, max_frame_len),
            PeerHandle::new(self.id, self.addr, tx),
        )
    }
}
