//! Delivery of server messages to connected clients.

use std::collections::BTreeMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

use quadfall_bus::{Event, Handler};
use quadfall_protocol::{Codec, ConnectStatus, PlayerId, ServerMessage};
use quadfall_transport::PeerHandle;

use crate::{EventBus, ServerEvent};

#[derive(Default)]
struct Peers {
    /// Handshake seen, `connect_response` not yet queued.
    pending: BTreeMap<PlayerId, PeerHandle>,
    /// Accepted players; the broadcast targets.
    live: BTreeMap<PlayerId, PeerHandle>,
}

/// Maps players to their connection's outbound queue.
///
/// Registered before the game service on the same topics, so a player's
/// handle is in place by the time anything is addressed to them. A new
/// handle stays pending until its `connect_response` is queued, so a
/// client never sees a broadcast before its handshake reply.
pub struct PeerRegistry<C: Codec> {
    peers: Mutex<Peers>,
    codec: C,
}

impl<C: Codec> PeerRegistry<C> {
    pub fn new(codec: C) -> Self {
        Self {
            peers: Mutex::new(Peers::default()),
            codec,
        }
    }

    fn lock(&self) -> MutexGuard<'_, Peers> {
        self.peers.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Holds `peer` until [`accept`](Self::accept) is called for it.
    pub fn register(&self, player_id: PlayerId, peer: PeerHandle) {
        if self.lock().pending.insert(player_id, peer).is_some() {
            tracing::warn!(%player_id, "replaced pending peer handle");
        }
    }

    /// Queues `connect_response` for a pending player and makes them a
    /// broadcast target. Returns `false` if nobody was pending.
    pub fn accept(&self, player_id: PlayerId) -> bool {
        let Some(frame) = self.frame(&ServerMessage::ConnectResponse {
            player_id,
            status: ConnectStatus::Ok,
        }) else {
            return false;
        };

        // Under the lock, so no broadcast can slip in between the reply
        // and the promotion.
        let mut peers = self.lock();
        let Some(peer) = peers.pending.remove(&player_id) else {
            tracing::debug!(%player_id, "accept without pending peer");
            return false;
        };
        if let Err(e) = peer.send(frame) {
            tracing::warn!(%player_id, addr = %peer.addr(), error = %e, "send failed");
        }
        peers.live.insert(player_id, peer);
        true
    }

    pub fn unregister(&self, player_id: PlayerId) -> bool {
        let mut peers = self.lock();
        let pending = peers.pending.remove(&player_id).is_some();
        peers.live.remove(&player_id).is_some() || pending
    }

    /// Whether `player_id` is an accepted broadcast target.
    pub fn contains(&self, player_id: PlayerId) -> bool {
        self.lock().live.contains_key(&player_id)
    }

    pub fn len(&self) -> usize {
        self.lock().live.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().live.is_empty()
    }

    /// Frames `message` and queues it for one accepted player. Unknown
    /// players are skipped; they have already disconnected.
    pub fn send_to(&self, player_id: PlayerId, message: &ServerMessage) {
        let Some(peer) = self.lock().live.get(&player_id).cloned() else {
            tracing::debug!(%player_id, "no peer for outbound message");
            return;
        };
        let Some(frame) = self.frame(message) else {
            return;
        };
        if let Err(e) = peer.send(frame) {
            tracing::warn!(%player_id, addr = %peer.addr(), error = %e, "send failed");
        }
    }

    /// Frames `message` once and queues it for every accepted player.
    ///
    /// A failed send is logged and the rest still receive it.
    pub fn broadcast(&self, message: &ServerMessage) {
        let Some(frame) = self.frame(message) else {
            return;
        };
        let targets: Vec<(PlayerId, PeerHandle)> = self
            .lock()
            .live
            .iter()
            .map(|(id, peer)| (*id, peer.clone()))
            .collect();

        for (player_id, peer) in targets {
            if let Err(e) = peer.send(frame.clone()) {
                tracing::warn!(%player_id, addr = %peer.addr(), error = %e, "broadcast send failed");
            }
        }
    }

    fn frame(&self, message: &ServerMessage) -> Option<Vec<u8>> {
        match self.codec.frame(&message.to_value()) {
            Ok(frame) => Some(frame),
            Err(e) => {
                tracing::error!(error = %e, "could not encode outbound message");
                None
            }
        }
    }
}

impl<C: Codec> Handler<ServerEvent> for PeerRegistry<C> {
    fn handle(&self, _bus: &EventBus, event: &Event<ServerEvent>) {
        match &event.payload {
            ServerEvent::ClientConnected {
                player_id, peer, ..
            } => self.register(*player_id, peer.clone()),
            ServerEvent::ClientDisconnected { player_id } => {
                self.unregister(*player_id);
            }
            ServerEvent::ConnectAccepted { player_id } => {
                self.accept(*player_id);
            }
            ServerEvent::StateChanged { player_id, state } => {
                self.send_to(*player_id, &ServerMessage::PlayerStateUpdate(state.clone()))
            }
            ServerEvent::Snapshot(snapshot) => {
                self.broadcast(&ServerMessage::GameStateUpdate(snapshot.clone()))
            }
            ServerEvent::GameOver { player_id, score } => self.broadcast(&ServerMessage::GameOver {
                player_id: *player_id,
                score: *score,
            }),
            ServerEvent::ClientRequest { .. } => {}
        }
    }
}
