//! Per-connection worker: read frames, decode, publish.
//!
//! Each accepted connection gets its own Tokio task running
//! [`handle_connection`]. The flow is:
//!   1. Split the socket into a frame reader and an outbound peer handle
//!   2. Wait for `connect` → publish `client_connected`
//!   3. Loop: decode each frame → publish `client_request`
//!   4. On close or read error the guard publishes `client_disconnected`
//!
//! A frame that fails to decode, or decodes to something that isn't a
//! known message, is logged and skipped. Only transport failures end the
//! connection.

use std::sync::Arc;

use quadfall_protocol::{ClientMessage, Codec, PlayerId};
use quadfall_transport::TcpConnection;

use crate::server::ServerState;
use crate::{EventBus, QuadfallError, ServerEvent};

/// Announces the player's departure when the worker exits, however it
/// exits.
struct ConnectionGuard {
    player_id: PlayerId,
    bus: Arc<EventBus>,
}

impl Drop for ConnectionGuard {
    fn drop(&mut self) {
        ServerEvent::ClientDisconnected {
            player_id: self.player_id,
        }
        .publish(&self.bus);
    }
}

/// Handles a single connection from accept to close.
pub(crate) async fn handle_connection<C: Codec>(
    conn: TcpConnection,
    state: Arc<ServerState<C>>,
) -> Result<(), QuadfallError> {
    let player_id = PlayerId(conn.id().into_inner());
    let addr = conn.peer_addr();
    tracing::debug!(%player_id, %addr, "handling new connection");

    let (mut reader, peer) = conn.split(state.config.max_frame_len);
    let mut guard: Option<ConnectionGuard> = None;

    loop {
        let data = match reader.read_frame().await? {
            Some(data) => data,
            None => {
                tracing::info!(%player_id, "connection closed");
                break;
            }
        };

        let value = match state.codec.decode(&data) {
            Ok(value) => value,
            Err(e) => {
                tracing::warn!(%player_id, error = %e, "dropping undecodable frame");
                continue;
            }
        };

        let message = match ClientMessage::try_from(&value) {
            Ok(message) => message,
            Err(e) => {
                tracing::warn!(%player_id, error = %e, "dropping invalid message");
                continue;
            }
        };

        match message {
            ClientMessage::Connect { nickname } => {
                if guard.is_some() {
                    tracing::debug!(%player_id, "ignoring repeated connect");
                    continue;
                }
                guard = Some(ConnectionGuard {
                    player_id,
                    bus: Arc::clone(&state.bus),
                });
                ServerEvent::ClientConnected {
                    player_id,
                    peer: peer.clone(),
                    nickname,
                }
                .publish(&state.bus);
            }
            ClientMessage::Request(request) => {
                if guard.is_none() {
                    tracing::warn!(%player_id, ?request, "request before connect dropped");
                    continue;
                }
                ServerEvent::ClientRequest { player_id, request }.publish(&state.bus);
            }
        }
    }

    // guard drops here → client_disconnected fires.
    Ok(())
}
