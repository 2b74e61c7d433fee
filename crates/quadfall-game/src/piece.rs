//! Tetromino shapes, rotation, and the collision rule.

use quadfall_protocol::Value;

use crate::{BOARD_HEIGHT, BOARD_WIDTH, Board};

/// The seven canonical tetrominoes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Tetromino {
    I,
    J,
    L,
    O,
    S,
    T,
    Z,
}

impl Tetromino {
    pub const ALL: [Tetromino; 7] = [
        Self::I,
        Self::J,
        Self::L,
        Self::O,
        Self::S,
        Self::T,
        Self::Z,
    ];

    /// The value written into board cells and sent as `block_type`.
    pub fn type_id(self) -> u8 {
        match self {
            Self::I => 1,
            Self::J => 2,
            Self::L => 3,
            Self::O => 4,
            Self::S => 5,
            Self::T => 6,
            Self::Z => 7,
        }
    }

    /// Spawn orientation, row-major.
    pub fn shape(self) -> Shape {
        let rows: &[&[u8]] = match self {
            Self::I => &[&[1, 1, 1, 1]],
            Self::J => &[&[1, 0, 0], &[1, 1, 1]],
            Self::L => &[&[0, 0, 1], &[1, 1, 1]],
            Self::O => &[&[1, 1], &[1, 1]],
            Self::S => &[&[0, 1, 1], &[1, 1, 0]],
            Self::T => &[&[0, 1, 0], &[1, 1, 1]],
            Self::Z => &[&[1, 1, 0], &[0, 1, 1]],
        };
        Shape {
            cells: rows.iter().map(|r| r.to_vec()).collect(),
        }
    }
}

/// A 0/1 occupancy matrix.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Shape {
    cells: Vec<Vec<u8>>,
}

impl Shape {
    pub fn rows(&self) -> usize {
        self.cells.len()
    }

    pub fn cols(&self) -> usize {
        self.cells.first().map_or(0, Vec::len)
    }

    /// The shape turned 90° clockwise: `new[c][r] = old[rows-1-r][c]`.
    pub fn rotate_cw(&self) -> Shape {
        let (rows, cols) = (self.rows(), self.cols());
        let cells = (0..cols)
            .map(|c| (0..rows).map(|r| self.cells[rows - 1 - r][c]).collect())
            .collect();
        Shape { cells }
    }

    /// Offsets `(row, col)` of every occupied cell.
    pub fn occupied(&self) -> impl Iterator<Item = (i32, i32)> + '_ {
        self.cells.iter().enumerate().flat_map(|(r, row)| {
            row.iter()
                .enumerate()
                .filter(|&(_, &cell)| cell != 0)
                .map(move |(c, _)| (r as i32, c as i32))
        })
    }

    pub fn to_value(&self) -> Value {
        Value::Array(
            self.cells
                .iter()
                .map(|row| Value::Array(row.iter().map(|&c| Value::from(c)).collect()))
                .collect(),
        )
    }
}

/// Top-left corner of a piece's shape matrix on the board.
///
/// `row` may be negative while a piece pokes out above the board.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Anchor {
    pub row: i32,
    pub col: i32,
}

impl Anchor {
    pub fn offset(self, drow: i32, dcol: i32) -> Anchor {
        Anchor {
            row: self.row + drow,
            col: self.col + dcol,
        }
    }
}

/// A falling piece: kind, current orientation, and position.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Piece {
    pub kind: Tetromino,
    pub shape: Shape,
    pub anchor: Anchor,
}

impl Piece {
    /// A piece in spawn orientation, top row, horizontally centred.
    ///
    /// The column is `10/2 - width/2`, so an I piece starts at column 3.
    pub fn spawn(kind: Tetromino) -> Self {
        let shape = kind.shape();
        let col = (BOARD_WIDTH / 2 - shape.cols() / 2) as i32;
        Self {
            kind,
            shape,
            anchor: Anchor { row: 0, col },
        }
    }

    /// Board cells this piece covers.
    pub fn cells(&self) -> impl Iterator<Item = (i32, i32)> + '_ {
        let Anchor { row, col } = self.anchor;
        self.shape.occupied().map(move |(r, c)| (row + r, col + c))
    }

    /// `{shape, block_type}` as sent in `current_piece`.
    pub fn to_value(&self) -> Value {
        [
            ("shape", self.shape.to_value()),
            ("block_type", Value::from(self.kind.type_id())),
        ]
        .into_iter()
        .collect()
    }

    /// `[row, col]` as sent in `position`.
    pub fn position_value(&self) -> Value {
        Value::from(vec![self.anchor.row, self.anchor.col])
    }
}

/// Whether `shape` fits on `board` with its top-left at `anchor`.
///
/// Every occupied cell needs `0 <= col < 10` and `row < 20`. Cells above
/// the board (`row < 0`) are allowed and never collide; cells on the board
/// must be empty.
pub fn is_valid_move(board: &Board, shape: &Shape, anchor: Anchor) -> bool {
    shape.occupied().all(|(r, c)| {
        let row = anchor.row + r;
        let col = anchor.col + c;

        if !(0..BOARD_WIDTH as i32).contains(&col) || row >= BOARD_HEIGHT as i32 {
            return false;
        }
        row < 0 || board.is_empty_at(row, col)
    })
}
