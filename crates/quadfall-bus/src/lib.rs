//! Event dispatch for Quadfall.
//!
//! Connection workers never touch game state directly. They publish a
//! topic on the [`Dispatcher`]; whoever subscribed to that topic (the game
//! service, the outbound peer registry) reacts, possibly by publishing
//! follow-up topics of its own.
//!
//! # How it fits in the stack
//!
//! ```text
//! Connection worker ──publish──→ Dispatcher ──handle──→ Game service
//!                                    ↑                      │
//!                                    └──────publish─────────┘
//!                                    │
//!                                    └──handle──→ Peer registry → sockets
//! ```

mod dispatcher;

pub use dispatcher::{Dispatcher, Event, Handler};
