//! Length-prefixed frame reader.

use std::io::ErrorKind;

use quadfall_protocol::{FRAME_HEADER_LEN, frame_len};
use tokio::io::{AsyncRead, AsyncReadExt};

use crate::TransportError;

/// Reads `[u32 BE length][body]` frames from a byte stream.
///
/// Frames arrive strictly in order; a frame is handed out only once its
/// whole body is in.
#[derive(Debug)]
pub struct FrameReader<R> {
    inner: R,
    max_frame_len: usize,
}

impl<R: AsyncRead + Unpin> FrameReader<R> {
    pub fn new(inner: R, max_frame_len: usize) -> Self {
        Self {
            inner,
            max_frame_len,
        }
    }

    /// Reads the next frame body.
    ///
    /// Returns `Ok(None)` when the stream ends before or inside a header.
    ///
    /// # Errors
    /// - [`TransportError::FrameTooLarge`] if the header announces more than
    ///   `max_frame_len` bytes. The body is not read.
    /// - [`TransportError::ShortRead`] if the stream ends inside a body.
    /// - [`TransportError::ReceiveFailed`] for any other I/O error.
    pub async fn read_frame(&mut self) -> Result<Option<Vec<u8>>, TransportError> {
        let mut header = [0u8; FRAME_HEADER_LEN];
        match self.inner.read_exact(&mut header).await {
            Ok(_) => {}
            Err(e) if e.kind() == ErrorKind::UnexpectedEof => return Ok(None),
            Err(e) => return Err(TransportError::ReceiveFailed(e)),
        }

        let len = frame_len(header);
        if len > self.max_frame_len {
            return Err(TransportError::FrameTooLarge {
                len,
                max: self.max_frame_len,
            });
        }

        let mut body = vec![0u8; len];
        match self.inner.read_exact(&mut body).await {
            Ok(_) => {}
            Err(e) if e.kind() == ErrorKind::UnexpectedEof => {
                return Err(TransportError::ShortRead { expected: len });
            }
            Err(e) => return Err(TransportError::ReceiveFailed(e)),
        }

        tracing::trace!(len, "frame received");
        Ok(Some(body))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn framed(body: &[u8]) -> Vec<u8> {
        let mut out = (body.len() as u32).to_be_bytes().to_vec();
        out.extend_from_slice(body);
        out
    }

    #[tokio::test]
    async fn test_read_frame_returns_bodies_in_order() {
        let mut stream = framed(b"one");
        stream.extend(framed(b""));
        stream.extend(framed(b"three"));
        let mut reader = FrameReader::new(stream.as_slice(), 1024);

        assert_eq!(reader.read_frame().await.unwrap(), Some(b"one".to_vec()));
        assert_eq!(reader.read_frame().await.unwrap(), Some(Vec::new()));
        assert_eq!(reader.read_frame().await.unwrap(), Some(b"three".to_vec()));
        assert_eq!(reader.read_frame().await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_read_frame_eof_inside_header_is_closed() {
        let stream = [0u8, 0];
        let mut reader = FrameReader::new(&stream[..], 1024);
        assert_eq!(reader.read_frame().await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_read_frame_eof_inside_body_is_short_read() {
        let mut stream = framed(b"abcdef");
        stream.truncate(stream.len() - 2);
        let mut reader = FrameReader::new(stream.as_slice(), 1024);

        let err = reader.read_frame().await.unwrap_err();
        assert!(matches!(err, TransportError::ShortRead { expected: 6 }));
    }

    #[tokio::test]
    async fn test_read_frame_over_limit_is_rejected() {
        let stream = framed(&[0u8; 32]);
        let mut reader = FrameReader::new(stream.as_slice(), 16);

        let err = reader.read_frame().await.unwrap_err();
        assert!(matches!(err, TransportError::FrameTooLarge { len: 32, max: 16 }));
    }
}
