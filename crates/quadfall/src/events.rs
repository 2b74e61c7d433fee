//! Topics and payloads carried on the server's event bus.
//!
//! | topic | published by | handled by |
//! |---|---|---|
//! | `client_connected` | connection worker | peer registry, game service |
//! | `client_disconnected` | connection guard | peer registry, game service |
//! | `client_request` | connection worker | game service |
//! | `connect_accepted` | game service | peer registry |
//! | `player_state_changed` | game service | peer registry |
//! | `game_state_snapshot` | game service | peer registry |
//! | `game_over` | game service | peer registry |

use quadfall_bus::Dispatcher;
use quadfall_protocol::{ClientRequest, PlayerId, Value};
use quadfall_transport::PeerHandle;

/// Topic names.
pub mod topics {
    pub const CLIENT_CONNECTED: &str = "client_connected";
    pub const CLIENT_DISCONNECTED: &str = "client_disconnected";
    pub const CLIENT_REQUEST: &str = "client_request";
    pub const CONNECT_ACCEPTED: &str = "connect_accepted";
    pub const PLAYER_STATE_CHANGED: &str = "player_state_changed";
    pub const GAME_STATE_SNAPSHOT: &str = "game_state_snapshot";
    pub const GAME_OVER: &str = "game_over";
}

/// The bus every server component talks through.
pub type EventBus = Dispatcher<ServerEvent>;

/// Payload of every topic. Each variant belongs to exactly one topic.
#[derive(Debug, Clone)]
pub enum ServerEvent {
    /// Handshake received. Carries the connection's outbound handle.
    ClientConnected {
        player_id: PlayerId,
        peer: PeerHandle,
        nickname: String,
    },
    ClientDisconnected {
        player_id: PlayerId,
    },
    ClientRequest {
        player_id: PlayerId,
        request: ClientRequest,
    },
    /// The engine created the player's session.
    ConnectAccepted {
        player_id: PlayerId,
    },
    /// One player's state after an operation; goes only to that player.
    StateChanged {
        player_id: PlayerId,
        state: Value,
    },
    /// Every player's state; goes to everyone.
    Snapshot(Value),
    GameOver {
        player_id: PlayerId,
        score: u64,
    },
}

impl ServerEvent {
    pub fn topic(&self) -> &'static str {
        match self {
            Self::ClientConnected { .. } => topics::CLIENT_CONNECTED,
            Self::ClientDisconnected { .. } => topics::CLIENT_DISCONNECTED,
            Self::ClientRequest { .. } => topics::CLIENT_REQUEST,
            Self::ConnectAccepted { .. } => topics::CONNECT_ACCEPTED,
            Self::StateChanged { .. } => topics::PLAYER_STATE_CHANGED,
            Self::Snapshot(_) => topics::GAME_STATE_SNAPSHOT,
            Self::GameOver { .. } => topics::GAME_OVER,
        }
    }

    /// Publishes this event on its own topic.
    pub fn publish(self, bus: &EventBus) {
        bus.publish(self.topic(), self);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_topic_matches_variant() {
        let id = PlayerId(1);
        assert_eq!(
            ServerEvent::ClientDisconnected { player_id: id }.topic(),
            "client_disconnected"
        );
        assert_eq!(
            ServerEvent::ClientRequest {
                player_id: id,
                request: ClientRequest::Rotate
            }
            .topic(),
            "client_request"
        );
        assert_eq!(ServerEvent::Snapshot(Value::map()).topic(), "game_state_snapshot");
        assert_eq!(
            ServerEvent::GameOver {
                player_id: id,
                score: 0
            }
            .topic(),
            "game_over"
        );
    }

    #[test]
    fn test_publish_routes_by_topic() {
        use std::sync::Arc;
        use std::sync::atomic::{AtomicUsize, Ordering};

        let bus = EventBus::new();
        let hits = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&hits);
        bus.subscribe_fn(
            topics::CONNECT_ACCEPTED,
            move |_: &EventBus, _: &quadfall_bus::Event<ServerEvent>| {
                counter.fetch_add(1, Ordering::SeqCst);
            },
        );

        ServerEvent::ConnectAccepted {
            player_id: PlayerId(5),
        }
        .publish(&bus);
        ServerEvent::Snapshot(Value::map()).publish(&bus);

        assert_eq!(hits.load(Ordering::SeqCst), 1);
    }
}
