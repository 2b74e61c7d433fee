//! The bridge between bus events and the game engine.

use std::sync::Arc;

use quadfall_bus::{Event, Handler};
use quadfall_game::{GameEngine, GameError, Outcome};
use quadfall_protocol::{ClientRequest, PlayerId};

use crate::{EventBus, ServerEvent};

/// Applies connect, disconnect, and request events to the engine and
/// publishes what changed.
///
/// After every gameplay request the requesting player gets their new
/// state, and every player gets a full snapshot. Joins and leaves
/// broadcast a snapshot too.
pub struct GameService {
    engine: Arc<GameEngine>,
}

impl GameService {
    pub fn new(engine: Arc<GameEngine>) -> Self {
        Self { engine }
    }

    fn on_connected(&self, bus: &EventBus, player_id: PlayerId, nickname: &str) {
        match self.engine.add_player(player_id, nickname) {
            Ok(outcome) => {
                ServerEvent::ConnectAccepted { player_id }.publish(bus);
                self.publish_outcome(bus, player_id, outcome);
                self.publish_snapshot(bus);
            }
            Err(e) => tracing::warn!(%player_id, error = %e, "connect rejected"),
        }
    }

    fn on_disconnected(&self, bus: &EventBus, player_id: PlayerId) {
        if self.engine.remove_player(player_id) {
            self.publish_snapshot(bus);
        }
    }

    fn on_request(&self, bus: &EventBus, player_id: PlayerId, request: ClientRequest) {
        let result = match request {
            ClientRequest::NewPiece => self.engine.spawn_piece(player_id),
            ClientRequest::Move(direction) => self.engine.shift(player_id, direction),
            ClientRequest::Rotate => self.engine.rotate(player_id),
            ClientRequest::SoftDrop => self.engine.soft_drop(player_id),
            ClientRequest::HardDrop => self.engine.hard_drop(player_id),
            ClientRequest::GameState => {
                self.publish_snapshot(bus);
                return;
            }
        };

        match result {
            Ok(outcome) => {
                self.publish_outcome(bus, player_id, outcome);
                self.publish_snapshot(bus);
            }
            Err(GameError::UnknownPlayer(_)) => {
                tracing::debug!(%player_id, ?request, "request for departed player dropped");
            }
            Err(e) => tracing::warn!(%player_id, error = %e, "request failed"),
        }
    }

    fn publish_outcome(&self, bus: &EventBus, player_id: PlayerId, outcome: Outcome) {
        ServerEvent::StateChanged {
            player_id,
            state: outcome.state,
        }
        .publish(bus);

        if outcome.topped_out {
            ServerEvent::GameOver {
                player_id,
                score: outcome.score,
            }
            .publish(bus);
        }
    }

    fn publish_snapshot(&self, bus: &EventBus) {
        ServerEvent::Snapshot(self.engine.snapshot()).publish(bus);
    }
}

impl Handler<ServerEvent> for GameService {
    fn handle(&self, bus: &EventBus, event: &Event<ServerEvent>) {
        match &event.payload {
            ServerEvent::ClientConnected {
                player_id,
                nickname,
                ..
            } => self.on_connected(bus, *player_id, nickname),
            ServerEvent::ClientDisconnected { player_id } => self.on_disconnected(bus, *player_id),
            ServerEvent::ClientRequest { player_id, request } => {
                self.on_request(bus, *player_id, *request)
            }
            _ => {}
        }
    }
}
