//! Cell coordinates.
//!
//! Every card slot on the board is addressed by a `Position`: a 0-based
//! `(row, col)` pair. Positions are plain values; they never borrow the
//! board and are safe to use as map keys.
//!
//! ## Usage
//!
//! ```
//! use memory_board::core::Position;
//!
//! let pos = Position::new(1, 2);
//! assert_eq!(pos.index(3), 5);
//! assert_eq!(Position::from_index(5, 3), pos);
//! assert!(pos.in_bounds(2, 3));
//! assert!(!pos.in_bounds(1, 3));
//! ```

use serde::{Deserialize, Serialize};

/// A `(row, col)` coordinate on the board, 0-indexed.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Position {
    pub row: usize,
    pub col: usize,
}

impl Position {
    /// Create a new position.
    #[must_use]
    pub const fn new(row: usize, col: usize) -> Self {
        Self { row, col }
    }

    /// Row-major index into a grid with `cols` columns.
    #[must_use]
    pub const fn index(self, cols: usize) -> usize {
        self.row * cols + self.col
    }

    /// Inverse of [`Position::index`].
    #[must_use]
    pub const fn from_index(index: usize, cols: usize) -> Self {
        Self {
            row: index / cols,
            col: index % cols,
        }
    }

    /// Check whether this position lies on a `rows x cols` grid.
    #[must_use]
    pub const fn in_bounds(self, rows: usize, cols: usize) -> bool {
        self.row < rows && self.col < cols
    }

    /// Iterate over every position of a `rows x cols` grid in row-major order.
    pub fn all(rows: usize, cols: usize) -> impl Iterator<Item = Position> {
        (0..rows * cols).map(move |i| Position::from_index(i, cols))
    }
}

impl From<(usize, usize)> for Position {
    fn from((row, col): (usize, usize)) -> Self {
        Self { row, col }
    }
}

impl std::fmt::Display for Position {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({},{})", self.row, self.col)
    }
}
