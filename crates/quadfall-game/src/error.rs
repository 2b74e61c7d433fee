//! Error types for the game layer.

use quadfall_protocol::PlayerId;

/// Errors that can occur during engine operations.
///
/// Illegal moves are not errors; they leave the state unchanged.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GameError {
    /// No session exists for this player.
    #[error("player {0} not found")]
    UnknownPlayer(PlayerId),

    /// A session for this player already exists.
    #[error("player {0} already exists")]
    PlayerExists(PlayerId),
}
