//! Player-facing snapshots of the board.
//!
//! `BoardView` is what `look` and `watch` return in structured form. Its
//! `Display` output is the text format:
//!
//! ```text
//! 2x2
//! my A
//! down ?
//! up B
//! none
//! ```
//!
//! One header line with the dimensions, then one line per cell in row-major
//! order. Every line ends with a newline.

use serde::{Deserialize, Serialize};

use crate::core::Position;

/// What one player sees in one cell.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CellView {
    /// The card was removed.
    None,
    /// Face-down card.
    Down,
    /// Face-up card not controlled by the viewer.
    Up(String),
    /// Face-up card controlled by the viewer.
    Mine(String),
}

impl std::fmt::Display for CellView {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CellView::None => f.write_str("none"),
            CellView::Down => f.write_str("down ?"),
            CellView::Up(value) => write!(f, "up {}", value),
            CellView::Mine(value) => write!(f, "my {}", value),
        }
    }
}

/// A whole-board snapshot from one player's point of view.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoardView {
    pub rows: usize,
    pub cols: usize,
    /// Cells in row-major order.
    pub cells: Vec<CellView>,
}

impl BoardView {
    /// The view of a single cell.
    #[must_use]
    pub fn at(&self, pos: Position) -> Option<&CellView> {
        if !pos.in_bounds(self.rows, self.cols) {
            return None;
        }
        self.cells.get(pos.index(self.cols))
    }
}

impl std::fmt::Display for BoardView {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "{}x{}", self.rows, self.cols)?;
        for cell in &self.cells {
            writeln!(f, "{}", cell)?;
        }
        Ok(())
    }
}

/// Observer-independent visible state: existence and value-if-face-up per
/// cell. Two boards look identical to every player iff these are equal.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct VisibleState(pub(crate) Vec<Option<Option<String>>>);
