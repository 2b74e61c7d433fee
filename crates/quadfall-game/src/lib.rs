//! The Quadfall game engine.
//!
//! Every connected player owns an independent 10×20 board and at most one
//! falling piece. The [`GameEngine`] keeps all of them in one table and
//! exposes the moves a client can ask for: spawn, shift, rotate, soft
//! drop, and hard drop.
//!
//! # Key types
//!
//! - [`GameEngine`] — the player table and every game operation
//! - [`Outcome`] — what an operation did (new state, lines, top-out)
//! - [`Board`], [`Piece`], [`Shape`], [`Tetromino`] — the geometry
//! - [`PieceSource`] — where the next piece comes from ([`RandomPieces`],
//!   [`PieceCycle`])
//!
//! The engine is synchronous and lock-protected; it can be called from
//! any task or thread.

mod board;
mod engine;
mod error;
mod piece;
mod session;
mod source;

pub use board::{BOARD_HEIGHT, BOARD_WIDTH, Board};
pub use engine::{GameEngine, Outcome, POINTS_PER_LINE};
pub use error::GameError;
pub use piece::{Anchor, Piece, Shape, Tetromino, is_valid_move};
pub use session::PlayerSession;
pub use source::{PieceCycle, PieceSource, RandomPieces};
