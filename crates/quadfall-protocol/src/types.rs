//! Identity types shared by every layer.

use std::fmt;

/// A unique identifier for a connected player.
///
/// This is a "newtype wrapper" around the integer id the server assigns
/// when it accepts a connection. Ids start at 1 and are never reused
/// while the process runs.
///
/// On the wire a `PlayerId` is an Integer value (`player_id` fields) or a
/// decimal string (keys of the snapshot map).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PlayerId(pub u64);

impl PlayerId {
    /// Returns the id as the decimal string used for snapshot map keys.
    pub fn as_key(&self) -> String {
        self.0.to_string()
    }
}

/// `tracing::info!(%player_id, "joined")` prints "P-42".
impl fmt::Display for PlayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "P-{}", self.0)
    }
}

impl From<u64> for PlayerId {
    fn from(id: u64) -> Self {
        Self(id)
    }
}
