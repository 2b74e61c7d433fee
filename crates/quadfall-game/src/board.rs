//! The 10×20 playfield.
//!
//! Row 0 is the top, row 19 the bottom. A cell holds 0 when empty or the
//! type id (1–7) of the tetromino that froze there.

use quadfall_protocol::Value;

pub const BOARD_WIDTH: usize = 10;
pub const BOARD_HEIGHT: usize = 20;

const EMPTY: u8 = 0;

type Row = [u8; BOARD_WIDTH];

/// One player's grid.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Board {
    rows: [Row; BOARD_HEIGHT],
}

impl Board {
    /// Creates an empty board.
    pub fn new() -> Self {
        Self {
            rows: [[EMPTY; BOARD_WIDTH]; BOARD_HEIGHT],
        }
    }

    /// Returns the cell at `(row, col)`, or `None` when out of bounds.
    pub fn get(&self, row: i32, col: i32) -> Option<u8> {
        let (r, c) = Self::index(row, col)?;
        Some(self.rows[r][c])
    }

    /// Writes `cell` at `(row, col)`. Returns `false` when out of bounds.
    pub fn set(&mut self, row: i32, col: i32, cell: u8) -> bool {
        match Self::index(row, col) {
            Some((r, c)) => {
                self.rows[r][c] = cell;
                true
            }
            None => false,
        }
    }

    pub fn is_empty_at(&self, row: i32, col: i32) -> bool {
        self.get(row, col) == Some(EMPTY)
    }

    pub fn is_row_full(&self, row: usize) -> bool {
        self.rows
            .get(row)
            .is_some_and(|cells| cells.iter().all(|&c| c != EMPTY))
    }

    /// Removes every full row and drops the rows above into the gap.
    ///
    /// Surviving rows keep their relative order; the same number of empty
    /// rows appear at the top. Returns how many rows were removed.
    pub fn clear_full_rows(&mut self) -> usize {
        let mut write = BOARD_HEIGHT;
        for read in (0..BOARD_HEIGHT).rev() {
            if self.is_row_full(read) {
                continue;
            }
            write -= 1;
            if write != read {
                self.rows[write] = self.rows[read];
            }
        }

        for row in &mut self.rows[..write] {
            *row = [EMPTY; BOARD_WIDTH];
        }
        write
    }

    /// Iterates over the rows, top first.
    pub fn rows(&self) -> impl Iterator<Item = &[u8]> {
        self.rows.iter().map(|r| r.as_slice())
    }

    /// `true` if no cell is filled.
    pub fn is_clear(&self) -> bool {
        self.rows.iter().flatten().all(|&c| c == EMPTY)
    }

    /// The board as an Array of 20 rows, each an Array of 10 Integers.
    pub fn to_value(&self) -> Value {
        Value::Array(
            self.rows
                .iter()
                .map(|row| Value::Array(row.iter().map(|&c| Value::from(c)).collect()))
                .collect(),
        )
    }

    fn index(row: i32, col: i32) -> Option<(usize, usize)> {
        let r = usize::try_from(row).ok().filter(|&r| r < BOARD_HEIGHT)?;
        let c = usize::try_from(col).ok().filter(|&c| c < BOARD_WIDTH)?;
        Some((r, c))
    }
}

impl Default for Board {
    fn default() -> Self {
        Self::new()
    }
}
