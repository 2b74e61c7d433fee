//! Where the next piece comes from.

use std::fmt;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::Tetromino;

/// Supplies the kind of every spawned piece.
///
/// The engine holds one source for all players behind its lock, so
/// implementations only need `Send`.
pub trait PieceSource: Send {
    fn next_piece(&mut self) -> Tetromino;
}

/// Uniformly random pieces. The default for a running server.
pub struct RandomPieces {
    rng: StdRng,
}

impl RandomPieces {
    /// Seeded from the operating system.
    pub fn new() -> Self {
        Self {
            rng: StdRng::from_os_rng(),
        }
    }

    /// Reproducible sequence for a given seed.
    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }
}

impl Default for RandomPieces {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for RandomPieces {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RandomPieces").finish_non_exhaustive()
    }
}

impl PieceSource for RandomPieces {
    fn next_piece(&mut self) -> Tetromino {
        Tetromino::ALL[self.rng.random_range(0..Tetromino::ALL.len())]
    }
}

/// A fixed sequence, repeated forever.
///
/// Tests and demos use this to script a game. An empty sequence cycles
/// through all seven kinds in type-id order.
#[derive(Debug, Clone)]
pub struct PieceCycle {
    sequence: Vec<Tetromino>,
    next: usize,
}

impl PieceCycle {
    pub fn new(sequence: impl IntoIterator<Item = Tetromino>) -> Self {
        let mut sequence: Vec<_> = sequence.into_iter().collect();
        if sequence.is_empty() {
            sequence = Tetromino::ALL.to_vec();
        }
        Self { sequence, next: 0 }
    }

    /// The same kind every time.
    pub fn repeat(kind: Tetromino) -> Self {
        Self::new([kind])
    }
}

impl PieceSource for PieceCycle {
    fn next_piece(&mut self) -> Tetromino {
        let kind = self.sequence[self.next];
        self.next = (self.next + 1) % self.sequence.len();
        kind
    }
}
