//! The player table and every game operation.
//!
//! # Concurrency
//!
//! All state lives behind one `Mutex`. Each public method takes the lock
//! once, so a compound step like "freeze, clear lines, spawn the next
//! piece" is atomic with respect to every other caller. The lock is never
//! held outside a method call.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::{Mutex, MutexGuard, PoisonError};

use quadfall_protocol::{Direction, PlayerId, Value};

use crate::{GameError, Piece, PieceSource, PlayerSession, RandomPieces, is_valid_move};

/// Score awarded per cleared row.
pub const POINTS_PER_LINE: u64 = 100;

/// What a mutating operation did to one player.
#[derive(Debug, Clone, PartialEq)]
pub struct Outcome {
    /// The player's state map after the operation (with `player_id`).
    pub state: Value,
    /// The player's score after the operation.
    pub score: u64,
    /// Rows removed by this operation.
    pub lines_cleared: usize,
    /// `true` only on the call that moved the player into game over.
    pub topped_out: bool,
}

#[derive(Debug, Default, Clone, Copy)]
struct Step {
    lines_cleared: usize,
    topped_out: bool,
}

struct Tables {
    players: BTreeMap<PlayerId, PlayerSession>,
    pieces: Box<dyn PieceSource>,
}

/// Owns every player's session.
///
/// ## Player lifecycle
///
/// ```text
/// add_player ──→ [Active] ──shift/rotate/soft_drop──→ [Active]
///                   │
///                   ├─ hard_drop / blocked soft_drop: freeze, clear, spawn
///                   │                    │
///                   │                    ▼ spawn blocked
///                   │               [Game over] (ignores every move)
///                   ▼
///              remove_player
/// ```
pub struct GameEngine {
    inner: Mutex<Tables>,
}

impl GameEngine {
    /// An engine drawing uniformly random pieces.
    pub fn new() -> Self {
        Self::with_source(RandomPieces::new())
    }

    /// An engine drawing pieces from `source`.
    pub fn with_source(source: impl PieceSource + 'static) -> Self {
        Self::with_boxed_source(Box::new(source))
    }

    pub fn with_boxed_source(source: Box<dyn PieceSource>) -> Self {
        Self {
            inner: Mutex::new(Tables {
                players: BTreeMap::new(),
                pieces: source,
            }),
        }
    }

    fn lock(&self) -> MutexGuard<'_, Tables> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Creates a session with an empty board and spawns its first piece.
    ///
    /// # Errors
    /// Returns [`GameError::PlayerExists`] if `id` is already present.
    pub fn add_player(
        &self,
        id: PlayerId,
        nickname: impl Into<String>,
    ) -> Result<Outcome, GameError> {
        let mut guard = self.lock();
        let Tables { players, pieces } = &mut *guard;

        if players.contains_key(&id) {
            return Err(GameError::PlayerExists(id));
        }

        let mut session = PlayerSession::new(id, nickname);
        let topped_out = spawn(&mut session, &mut **pieces);
        let state = session.state_value();
        tracing::info!(player_id = %id, nickname = %session.nickname, "player joined");
        players.insert(id, session);

        Ok(Outcome {
            state,
            score: 0,
            lines_cleared: 0,
            topped_out,
        })
    }

    /// Drops a session. Returns whether it existed.
    pub fn remove_player(&self, id: PlayerId) -> bool {
        let removed = self.lock().players.remove(&id).is_some();
        if removed {
            tracing::info!(player_id = %id, "player left");
        }
        removed
    }

    /// Replaces the active piece with a freshly drawn one.
    ///
    /// If the new piece doesn't fit at its spawn position, nothing is
    /// placed and the player is game over.
    pub fn spawn_piece(&self, id: PlayerId) -> Result<Outcome, GameError> {
        self.apply(id, |session, pieces| Step {
            lines_cleared: 0,
            topped_out: spawn(session, pieces),
        })
    }

    /// Moves the active piece one column, if it fits.
    pub fn shift(&self, id: PlayerId, direction: Direction) -> Result<Outcome, GameError> {
        self.apply(id, |session, _| {
            try_move(session, 0, direction.dx());
            Step::default()
        })
    }

    /// Rotates the active piece clockwise in place, if it fits.
    pub fn rotate(&self, id: PlayerId) -> Result<Outcome, GameError> {
        self.apply(id, |session, _| {
            let board = &session.board;
            if let Some(piece) = session.piece.as_mut() {
                let turned = piece.shape.rotate_cw();
                if is_valid_move(board, &turned, piece.anchor) {
                    piece.shape = turned;
                }
            }
            Step::default()
        })
    }

    /// Moves the active piece down one row; when blocked, freezes it.
    pub fn soft_drop(&self, id: PlayerId) -> Result<Outcome, GameError> {
        self.apply(id, |session, pieces| {
            if session.piece.is_none() || try_move(session, 1, 0) {
                Step::default()
            } else {
                freeze(session, pieces)
            }
        })
    }

    /// Drops the active piece as far as it goes and freezes it.
    pub fn hard_drop(&self, id: PlayerId) -> Result<Outcome, GameError> {
        self.apply(id, |session, pieces| {
            if session.piece.is_none() {
                return Step::default();
            }
            while try_move(session, 1, 0) {}
            freeze(session, pieces)
        })
    }

    /// Every live player's state, keyed by decimal player id.
    pub fn snapshot(&self) -> Value {
        self.lock()
            .players
            .iter()
            .map(|(id, session)| (id.as_key(), session.snapshot_value()))
            .collect()
    }

    /// One player's state map (with `player_id`).
    pub fn player(&self, id: PlayerId) -> Result<Value, GameError> {
        self.lock()
            .players
            .get(&id)
            .map(PlayerSession::state_value)
            .ok_or(GameError::UnknownPlayer(id))
    }

    /// A copy of one player's session.
    pub fn session(&self, id: PlayerId) -> Result<PlayerSession, GameError> {
        self.lock()
            .players
            .get(&id)
            .cloned()
            .ok_or(GameError::UnknownPlayer(id))
    }

    /// Ids of every live player, ascending.
    pub fn player_ids(&self) -> Vec<PlayerId> {
        self.lock().players.keys().copied().collect()
    }

    pub fn len(&self) -> usize {
        self.lock().players.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().players.is_empty()
    }

    /// Runs `op` on one session under the lock. Game-over sessions are
    /// left untouched.
    fn apply<F>(&self, id: PlayerId, op: F) -> Result<Outcome, GameError>
    where
        F: FnOnce(&mut PlayerSession, &mut dyn PieceSource) -> Step,
    {
        let mut guard = self.lock();
        let Tables { players, pieces } = &mut *guard;
        let session = players.get_mut(&id).ok_or(GameError::UnknownPlayer(id))?;

        let step = if session.game_over {
            Step::default()
        } else {
            op(session, &mut **pieces)
        };

        if step.lines_cleared > 0 {
            tracing::debug!(
                player_id = %id,
                lines = step.lines_cleared,
                score = session.score,
                "lines cleared"
            );
        }
        if step.topped_out {
            tracing::info!(player_id = %id, score = session.score, "game over");
        }

        Ok(Outcome {
            state: session.state_value(),
            score: session.score,
            lines_cleared: step.lines_cleared,
            topped_out: step.topped_out,
        })
    }
}

impl Default for GameEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for GameEngine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GameEngine")
            .field("players", &self.player_ids())
            .finish()
    }
}

// ---------------------------------------------------------------------------
// Steps on a single session
// ---------------------------------------------------------------------------

/// Places a new piece. Returns `true` if it didn't fit (top-out).
fn spawn(session: &mut PlayerSession, pieces: &mut dyn PieceSource) -> bool {
    let piece = Piece::spawn(pieces.next_piece());
    if is_valid_move(&session.board, &piece.shape, piece.anchor) {
        session.piece = Some(piece);
        false
    } else {
        session.piece = None;
        session.game_over = true;
        true
    }
}

/// Moves the active piece by `(drow, dcol)` if the target fits.
fn try_move(session: &mut PlayerSession, drow: i32, dcol: i32) -> bool {
    let board = &session.board;
    let Some(piece) = session.piece.as_mut() else {
        return false;
    };

    let target = piece.anchor.offset(drow, dcol);
    if !is_valid_move(board, &piece.shape, target) {
        return false;
    }
    piece.anchor = target;
    true
}

/// Writes the active piece into the board, clears full rows, scores them,
/// and spawns the next piece.
fn freeze(session: &mut PlayerSession, pieces: &mut dyn PieceSource) -> Step {
    let Some(piece) = session.piece.take() else {
        return Step::default();
    };

    let type_id = piece.kind.type_id();
    for (row, col) in piece.cells() {
        // Cells above the board are dropped.
        session.board.set(row, col, type_id);
    }

    let lines_cleared = session.board.clear_full_rows();
    session.score += lines_cleared as u64 * POINTS_PER_LINE;

    Step {
        lines_cleared,
        topped_out: spawn(session, pieces),
    }
}
