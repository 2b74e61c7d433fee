//! # Quadfall
//!
//! A multiplayer falling-block game server. Every client drives its own
//! board over a TCP connection; the server owns the authoritative state and
//! pushes updates back.
//!
//! ## How a request travels
//!
//! ```text
//! socket → FrameReader → Value → ClientMessage ─publish─→ EventBus
//!                                                           │
//!            ┌──────────── GameService (mutates GameEngine) ┘
//!            │ publish state / snapshot / game over
//!            ▼
//!        PeerRegistry → frame → writer task → socket(s)
//! ```
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use quadfall::prelude::*;
//!
//! # async fn start() -> Result<(), QuadfallError> {
//! let server = QuadfallServer::builder()
//!     .bind("0.0.0.0:12345")
//!     .build()
//!     .await?;
//! server.run().await
//! # }
//! ```

mod config;
mod error;
mod events;
mod handler;
mod outbound;
mod server;
mod service;

pub use config::{DEFAULT_MAX_FRAME_LEN, DEFAULT_PORT, ServerConfig};
pub use error::QuadfallError;
pub use events::{EventBus, ServerEvent, topics};
pub use outbound::PeerRegistry;
pub use server::{QuadfallServer, QuadfallServerBuilder};
pub use service::GameService;

pub mod prelude {
    pub use crate::{QuadfallError, QuadfallServer, QuadfallServerBuilder, ServerConfig};
    pub use quadfall_game::{GameEngine, PieceCycle, PieceSource, RandomPieces, Tetromino};
    pub use quadfall_protocol::{
        ClientMessage, ClientRequest, Direction, PlayerId, ServerMessage, Value,
    };
}
