//! Unified error type for the Quadfall server.

use quadfall_game::GameError;
use quadfall_protocol::ProtocolError;
use quadfall_transport::TransportError;

/// Top-level error that wraps all crate-specific errors.
///
/// The `#[from]` attribute on each variant generates a `From` impl, so
/// `?` converts sub-crate errors automatically.
#[derive(Debug, thiserror::Error)]
pub enum QuadfallError {
    /// Sockets: bind, accept, read, framing.
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// Bytes or message shape.
    #[error(transparent)]
    Protocol(#[from] ProtocolError),

    /// Player table.
    #[error(transparent)]
    Game(#[from] GameError),
}

#[cfg(test)]
mod tests {
    use super::*;
    use quadfall_protocol::PlayerId;

    #[test]
    fn test_from_transport_error() {
        let err = TransportError::FrameTooLarge { len: 10, max: 5 };
        let quadfall_err: QuadfallError = err.into();
        assert!(matches!(quadfall_err, QuadfallError::Transport(_)));
        assert!(quadfall_err.to_string().contains("exceeds limit"));
    }

    #[test]
    fn test_from_protocol_error() {
        let quadfall_err: QuadfallError = ProtocolError::MissingType.into();
        assert!(matches!(quadfall_err, QuadfallError::Protocol(_)));
    }

    #[test]
    fn test_from_game_error() {
        let quadfall_err: QuadfallError = GameError::UnknownPlayer(PlayerId(3)).into();
        assert!(matches!(quadfall_err, QuadfallError::Game(_)));
        assert!(quadfall_err.to_string().contains("P-3"));
    }
}
