//! Typed messages on top of the value model.
//!
//! Clients send maps like `{"type": "move_request", "direction": -1}`.
//! Instead of poking at string keys all over the server, a [`Value`] is
//! decoded exactly once at the network boundary into a [`ClientMessage`],
//! and everything downstream matches on the enum. Adding a message type
//! then forces every `match` to handle it.
//!
//! Outbound messages go the other way: [`ServerMessage::to_value`] builds
//! the map the client expects.

use crate::{PlayerId, ProtocolError, Value};

/// Horizontal direction of a shift request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    Left,
    Right,
}

impl Direction {
    /// Column delta: −1 for left, +1 for right.
    pub fn dx(self) -> i32 {
        match self {
            Self::Left => -1,
            Self::Right => 1,
        }
    }
}

impl TryFrom<i64> for Direction {
    type Error = ProtocolError;

    fn try_from(dx: i64) -> Result<Self, Self::Error> {
        match dx {
            -1 => Ok(Self::Left),
            1 => Ok(Self::Right),
            _ => Err(ProtocolError::InvalidField {
                field: "direction",
                reason: "must be -1 or 1",
            }),
        }
    }
}

/// A gameplay request from a player who has completed the handshake.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ClientRequest {
    /// `request_new_piece`
    NewPiece,
    /// `move_request` with a direction, or legacy `move_left` / `move_right`.
    Move(Direction),
    /// `rotate_request` or legacy `rotate`.
    Rotate,
    /// `move_down_request` or legacy `move_down`.
    SoftDrop,
    /// `hard_drop_request` or legacy `hard_drop`.
    HardDrop,
    /// `request_game_state`: broadcast a full snapshot.
    GameState,
}

/// Everything a client can send.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClientMessage {
    /// The handshake. A missing nickname is an empty string.
    Connect { nickname: String },
    Request(ClientRequest),
}

impl ClientMessage {
    /// The wire `type` string this message is sent with.
    ///
    /// Legacy aliases decode fine but are never produced.
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::Connect { .. } => "connect",
            Self::Request(ClientRequest::NewPiece) => "request_new_piece",
            Self::Request(ClientRequest::Move(_)) => "move_request",
            Self::Request(ClientRequest::Rotate) => "rotate_request",
            Self::Request(ClientRequest::SoftDrop) => "move_down_request",
            Self::Request(ClientRequest::HardDrop) => "hard_drop_request",
            Self::Request(ClientRequest::GameState) => "request_game_state",
        }
    }

    /// Builds the map a client puts on the wire for this message.
    pub fn to_value(&self) -> Value {
        let mut v = Value::map();
        v.insert("type", self.type_name());
        match self {
            Self::Connect { nickname } => {
                v.insert("nickname", nickname.as_str());
            }
            Self::Request(ClientRequest::Move(direction)) => {
                v.insert("direction", direction.dx());
            }
            Self::Request(_) => {}
        }
        v
    }
}

impl TryFrom<&Value> for ClientMessage {
    type Error = ProtocolError;

    fn try_from(value: &Value) -> Result<Self, Self::Error> {
        let kind = value
            .get("type")
            .and_then(Value::as_str)
            .ok_or(ProtocolError::MissingType)?;

        let request = match kind {
            "connect" => {
                let nickname = match value.get("nickname") {
                    None | Some(Value::Null) => String::new(),
                    Some(Value::String(s)) => s.clone(),
                    Some(_) => {
                        return Err(ProtocolError::InvalidField {
                            field: "nickname",
                            reason: "must be a string",
                        });
                    }
                };
                return Ok(Self::Connect { nickname });
            }
            "request_new_piece" => ClientRequest::NewPiece,
            "move_request" => {
                let dx = value
                    .get("direction")
                    .and_then(Value::as_int)
                    .ok_or(ProtocolError::InvalidField {
                        field: "direction",
                        reason: "must be an integer",
                    })?;
                ClientRequest::Move(Direction::try_from(dx)?)
            }
            "move_left" => ClientRequest::Move(Direction::Left),
            "move_right" => ClientRequest::Move(Direction::Right),
            "rotate_request" | "rotate" => ClientRequest::Rotate,
            "move_down_request" | "move_down" => ClientRequest::SoftDrop,
            "hard_drop_request" | "hard_drop" => ClientRequest::HardDrop,
            "request_game_state" => ClientRequest::GameState,
            other => return Err(ProtocolError::UnknownType(other.to_owned())),
        };
        Ok(Self::Request(request))
    }
}

/// Result of a handshake.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectStatus {
    Ok,
}

impl ConnectStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Ok => "ok",
        }
    }
}

/// Everything the server sends.
///
/// The state-carrying variants hold engine-built maps as-is; the game
/// layer owns their field layout.
#[derive(Debug, Clone, PartialEq)]
pub enum ServerMessage {
    /// Sent only to the connecting client.
    ConnectResponse {
        player_id: PlayerId,
        status: ConnectStatus,
    },
    /// One player's state map (already containing `player_id`).
    PlayerStateUpdate(Value),
    /// The full snapshot map, keyed by decimal player id.
    GameStateUpdate(Value),
    /// A player topped out.
    GameOver { player_id: PlayerId, score: u64 },
}

impl ServerMessage {
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::ConnectResponse { .. } => "connect_response",
            Self::PlayerStateUpdate(_) => "player_state_update",
            Self::GameStateUpdate(_) => "game_state_update",
            Self::GameOver { .. } => "game_over",
        }
    }

    /// Builds the map sent on the wire.
    pub fn to_value(&self) -> Value {
        let mut v = match self {
            Self::PlayerStateUpdate(state) if state.as_map().is_some() => state.clone(),
            _ => Value::map(),
        };
        v.insert("type", self.type_name());

        match self {
            Self::ConnectResponse { player_id, status } => {
                v.insert("player_id", *player_id);
                v.insert("status", status.as_str());
            }
            Self::PlayerStateUpdate(_) => {}
            Self::GameStateUpdate(players) => {
                v.insert("players", players.clone());
            }
            Self::GameOver { player_id, score } => {
                v.insert("player_id", *player_id);
                v.insert("score", *score);
            }
        }
        v
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn msg(pairs: &[(&str, Value)]) -> Value {
        pairs.iter().cloned().collect()
    }

    #[test]
    fn test_decode_connect_without_nickname_is_empty() {
        let v = msg(&[("type", "connect".into())]);
        assert_eq!(
            ClientMessage::try_from(&v).unwrap(),
            ClientMessage::Connect {
                nickname: String::new()
            }
        );
    }

    #[test]
    fn test_decode_connect_with_nickname() {
        let v = msg(&[("type", "connect".into()), ("nickname", "ada".into())]);
        assert_eq!(
            ClientMessage::try_from(&v).unwrap(),
            ClientMessage::Connect {
                nickname: "ada".into()
            }
        );
    }

    #[test]
    fn test_decode_move_request_reads_direction() {
        let v = msg(&[("type", "move_request".into()), ("direction", (-1i64).into())]);
        assert_eq!(
            ClientMessage::try_from(&v).unwrap(),
            ClientMessage::Request(ClientRequest::Move(Direction::Left))
        );
    }

    #[test]
    fn test_decode_move_request_bad_direction_is_invalid_field() {
        let v = msg(&[("type", "move_request".into()), ("direction", 2i64.into())]);
        assert!(matches!(
            ClientMessage::try_from(&v),
            Err(ProtocolError::InvalidField {
                field: "direction",
                ..
            })
        ));

        let v = msg(&[("type", "move_request".into())]);
        assert!(ClientMessage::try_from(&v).is_err());
    }

    #[test]
    fn test_decode_legacy_aliases() {
        let cases = [
            ("move_left", ClientRequest::Move(Direction::Left)),
            ("move_right", ClientRequest::Move(Direction::Right)),
            ("rotate", ClientRequest::Rotate),
            ("move_down", ClientRequest::SoftDrop),
            ("hard_drop", ClientRequest::HardDrop),
        ];
        for (name, expected) in cases {
            let v = msg(&[("type", name.into())]);
            assert_eq!(
                ClientMessage::try_from(&v).unwrap(),
                ClientMessage::Request(expected),
                "alias {name}"
            );
        }
    }

    #[test]
    fn test_decode_missing_type_returns_missing_type() {
        let v = msg(&[("direction", 1i64.into())]);
        assert_eq!(ClientMessage::try_from(&v), Err(ProtocolError::MissingType));
        assert_eq!(
            ClientMessage::try_from(&Value::Int(1)),
            Err(ProtocolError::MissingType)
        );
    }

    #[test]
    fn test_decode_unknown_type_returns_unknown_type() {
        let v = msg(&[("type", "teleport".into())]);
        assert_eq!(
            ClientMessage::try_from(&v),
            Err(ProtocolError::UnknownType("teleport".into()))
        );
    }

    #[test]
    fn test_client_to_value_decodes_back() {
        let messages = [
            ClientMessage::Connect {
                nickname: "bob".into(),
            },
            ClientMessage::Request(ClientRequest::NewPiece),
            ClientMessage::Request(ClientRequest::Move(Direction::Right)),
            ClientMessage::Request(ClientRequest::GameState),
        ];
        for m in messages {
            assert_eq!(ClientMessage::try_from(&m.to_value()).unwrap(), m);
        }
    }

    #[test]
    fn test_connect_response_to_value() {
        let v = ServerMessage::ConnectResponse {
            player_id: PlayerId(3),
            status: ConnectStatus::Ok,
        }
        .to_value();
        assert_eq!(v.get("type").and_then(Value::as_str), Some("connect_response"));
        assert_eq!(v.get("player_id").and_then(Value::as_int), Some(3));
        assert_eq!(v.get("status").and_then(Value::as_str), Some("ok"));
    }

    #[test]
    fn test_player_state_update_keeps_state_fields() {
        let state = msg(&[("player_id", 1i64.into()), ("score", 300i64.into())]);
        let v = ServerMessage::PlayerStateUpdate(state).to_value();
        assert_eq!(v.get("type").and_then(Value::as_str), Some("player_state_update"));
        assert_eq!(v.get("score").and_then(Value::as_int), Some(300));
    }

    #[test]
    fn test_game_over_to_value() {
        let v = ServerMessage::GameOver {
            player_id: PlayerId(2),
            score: 500,
        }
        .to_value();
        assert_eq!(v.get("type").and_then(Value::as_str), Some("game_over"));
        assert_eq!(v.get("score").and_then(Value::as_int), Some(500));
    }
}
