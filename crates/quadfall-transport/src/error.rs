use std::io;

/// Errors that can occur in the transport layer.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    /// Binding the listening socket failed.
    #[error("bind failed: {0}")]
    BindFailed(#[source] io::Error),

    /// The listener's local address could not be read.
    #[error("local address unavailable: {0}")]
    LocalAddr(#[source] io::Error),

    /// Accepting a connection failed.
    #[error("accept failed: {0}")]
    AcceptFailed(#[source] io::Error),

    /// Reading from the socket failed.
    #[error("receive failed: {0}")]
    ReceiveFailed(#[source] io::Error),

    /// The peer closed the stream in the middle of a frame body.
    #[error("short read: frame of {expected} bytes was cut off")]
    ShortRead { expected: usize },

    /// A frame header announced more bytes than the server accepts.
    #[error("frame of {len} bytes exceeds limit of {max}")]
    FrameTooLarge { len: usize, max: usize },

    /// The connection's writer task is gone.
    #[error("connection {0} closed")]
    ConnectionClosed(crate::ConnectionId),
}
