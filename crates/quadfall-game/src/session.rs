//! Per-player game state.

use quadfall_protocol::{PlayerId, Value};

use crate::{Board, Piece};

/// Everything the server knows about one player's game.
///
/// Created by the connect handshake, dropped when the connection closes.
#[derive(Debug, Clone, PartialEq)]
pub struct PlayerSession {
    pub id: PlayerId,
    /// May be empty.
    pub nickname: String,
    /// Never decreases.
    pub score: u64,
    pub board: Board,
    /// At most one active piece; `None` before the first spawn and after
    /// a top-out.
    pub piece: Option<Piece>,
    /// Reported in snapshots; nothing in the game depends on it.
    pub ready: bool,
    pub game_over: bool,
}

impl PlayerSession {
    pub fn new(id: PlayerId, nickname: impl Into<String>) -> Self {
        Self {
            id,
            nickname: nickname.into(),
            score: 0,
            board: Board::new(),
            piece: None,
            ready: false,
            game_over: false,
        }
    }

    /// The snapshot entry for this player (no `player_id`; the snapshot
    /// map is keyed by it).
    pub fn snapshot_value(&self) -> Value {
        [
            ("score", Value::from(self.score)),
            ("board", self.board.to_value()),
            ("nickname", Value::from(self.nickname.as_str())),
            ("ready", Value::Bool(self.ready)),
            ("game_over", Value::Bool(self.game_over)),
            ("current_piece", Value::from(self.piece.as_ref().map(Piece::to_value))),
            ("position", Value::from(self.piece.as_ref().map(Piece::position_value))),
        ]
        .into_iter()
        .collect()
    }

    /// The per-player state map: the snapshot entry plus `player_id`.
    pub fn state_value(&self) -> Value {
        let mut v = self.snapshot_value();
        v.insert("player_id", self.id);
        v
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Tetromino;

    #[test]
    fn test_new_session_defaults() {
        let s = PlayerSession::new(PlayerId(1), "");
        assert_eq!(s.score, 0);
        assert!(s.board.is_clear());
        assert!(s.piece.is_none());
        assert!(!s.ready);
        assert!(!s.game_over);
    }

    #[test]
    fn test_state_value_without_piece_has_null_piece_fields() {
        let v = PlayerSession::new(PlayerId(4), "zed").state_value();
        assert_eq!(v.get("player_id").and_then(Value::as_int), Some(4));
        assert_eq!(v.get("nickname").and_then(Value::as_str), Some("zed"));
        assert_eq!(v.get("current_piece"), Some(&Value::Null));
        assert_eq!(v.get("position"), Some(&Value::Null));
    }

    #[test]
    fn test_snapshot_value_has_no_player_id() {
        let mut s = PlayerSession::new(PlayerId(2), "a");
        s.piece = Some(Piece::spawn(Tetromino::I));
        let v = s.snapshot_value();
        assert!(v.get("player_id").is_none());
        assert_eq!(v.get("position"), Some(&Value::from(vec![0i64, 3])));
        assert_eq!(
            v.get("current_piece")
                .and_then(|p| p.get("block_type"))
                .and_then(Value::as_int),
            Some(1)
        );
    }
}
