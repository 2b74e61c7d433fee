//! `QuadfallServer` builder and accept loop.
//!
//! This ties the layers together: transport → protocol → bus → game.

use std::net::SocketAddr;
use std::sync::Arc;

use quadfall_game::{GameEngine, PieceSource, RandomPieces};
use quadfall_protocol::{BinaryCodec, Codec};
use quadfall_transport::{TcpTransport, Transport};

use crate::handler::handle_connection;
use crate::{EventBus, GameService, PeerRegistry, QuadfallError, ServerConfig, topics};

/// Shared state handed to each connection task.
pub(crate) struct ServerState<C: Codec> {
    pub(crate) bus: Arc<EventBus>,
    pub(crate) codec: C,
    pub(crate) config: ServerConfig,
}

/// Builder for configuring and starting a Quadfall server.
///
/// # Example
///
/// ```rust,no_run
/// use quadfall::prelude::*;
///
/// # async fn start() -> Result<(), QuadfallError> {
/// let server = QuadfallServer::builder()
///     .bind("127.0.0.1:0")
///     .piece_source(PieceCycle::repeat(Tetromino::I))
///     .build()
///     .await?;
/// println!("listening on {}", server.local_addr()?);
/// # Ok(())
/// # }
/// ```
pub struct QuadfallServerBuilder {
    config: ServerConfig,
    pieces: Option<Box<dyn PieceSource>>,
}

impl QuadfallServerBuilder {
    /// Creates a new builder with default settings.
    pub fn new() -> Self {
        Self {
            config: ServerConfig::default(),
            pieces: None,
        }
    }

    /// Sets the address to bind the server to.
    pub fn bind(mut self, addr: &str) -> Self {
        self.config.bind_addr = addr.to_string();
        self
    }

    pub fn max_frame_len(mut self, len: usize) -> Self {
        self.config.max_frame_len = len;
        self
    }

    /// Replaces the whole configuration.
    pub fn config(mut self, config: ServerConfig) -> Self {
        self.config = config;
        self
    }

    /// Draws pieces from `source` instead of at random.
    pub fn piece_source(mut self, source: impl PieceSource + 'static) -> Self {
        self.pieces = Some(Box::new(source));
        self
    }

    /// Binds the listener and wires the bus.
    pub async fn build(self) -> Result<QuadfallServer, QuadfallError> {
        let transport = TcpTransport::bind(self.config.bind_addr.as_str()).await?;

        let pieces = self
            .pieces
            .unwrap_or_else(|| Box::new(RandomPieces::new()));
        let engine = Arc::new(GameEngine::with_boxed_source(pieces));

        let bus = Arc::new(EventBus::new());
        let registry = Arc::new(PeerRegistry::new(BinaryCodec));
        let service = Arc::new(GameService::new(Arc::clone(&engine)));

        // Registry first: a connecting player's handle must exist before
        // the service answers them.
        for topic in [
            topics::CLIENT_CONNECTED,
            topics::CLIENT_DISCONNECTED,
            topics::CONNECT_ACCEPTED,
            topics::PLAYER_STATE_CHANGED,
            topics::GAME_STATE_SNAPSHOT,
            topics::GAME_OVER,
        ] {
            bus.subscribe(topic, registry.clone());
        }
        for topic in [
            topics::CLIENT_CONNECTED,
            topics::CLIENT_DISCONNECTED,
            topics::CLIENT_REQUEST,
        ] {
            bus.subscribe(topic, service.clone());
        }

        let state = Arc::new(ServerState {
            bus,
            codec: BinaryCodec,
            config: self.config,
        });

        Ok(QuadfallServer {
            transport,
            engine,
            state,
        })
    }
}

impl Default for QuadfallServerBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// A bound Quadfall server.
///
/// Call [`run()`](Self::run) to start accepting connections.
pub struct QuadfallServer {
    transport: TcpTransport,
    engine: Arc<GameEngine>,
    state: Arc<ServerState<BinaryCodec>>,
}

impl QuadfallServer {
    pub fn builder() -> QuadfallServerBuilder {
        QuadfallServerBuilder::new()
    }

    pub fn local_addr(&self) -> Result<SocketAddr, QuadfallError> {
        Ok(self.transport.local_addr()?)
    }

    /// The authoritative game state.
    pub fn engine(&self) -> Arc<GameEngine> {
        Arc::clone(&self.engine)
    }

    /// Runs the accept loop until the process is terminated.
    ///
    /// Every connection gets its own task. A failed accept is logged and
    /// the loop keeps going.
    pub async fn run(mut self) -> Result<(), QuadfallError> {
        tracing::info!(addr = %self.state.config.bind_addr, "quadfall server running");

        loop {
            match self.transport.accept().await {
                Ok(conn) => {
                    let state = Arc::clone(&self.state);
                    tokio::spawn(async move {
                        let conn_id = conn.id();
                        if let Err(e) = handle_connection(conn, state).await {
                            tracing::info!(%conn_id, error = %e, "connection ended with error");
                        }
                    });
                }
                Err(e) => {
                    tracing::error!(error = %e, "accept failed");
                }
            }
        }
    }
}
