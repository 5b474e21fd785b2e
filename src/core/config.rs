//! Board configuration.
//!
//! A `BoardSpec` is the validated `(rows, cols, values)` triple a board is
//! built from. It can be constructed directly or parsed from the board file
//! format:
//!
//! ```text
//! 2x2
//! A
//! B
//! A
//! B
//! ```
//!
//! The first non-blank line gives the dimensions; the following `rows * cols`
//! lines give card values in row-major order. Values are single tokens with
//! no whitespace. Blank lines are ignored.
//!
//! ```
//! use memory_board::core::BoardSpec;
//!
//! let spec = BoardSpec::parse("2x2\nA\nB\nA\nB\n").unwrap();
//! assert_eq!(spec.rows(), 2);
//! assert_eq!(spec.values()[3], "B");
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::SetupError;

/// Validated board dimensions and initial card values.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoardSpec {
    rows: usize,
    cols: usize,
    values: Vec<String>,
}

impl BoardSpec {
    /// Create a spec, checking that dimensions are positive and that there
    /// is exactly one value per cell.
    pub fn new(rows: usize, cols: usize, values: Vec<String>) -> Result<Self, SetupError> {
        if rows == 0 || cols == 0 {
            return Err(SetupError::InvalidBoardSize(format!(
                "dimensions must be positive, got {}x{}",
                rows, cols
            )));
        }
        let cells = cell_count(rows, cols)?;
        if values.len() != cells {
            return Err(SetupError::InvalidBoardSize(format!(
                "{}x{} board needs {} cards, got {}",
                rows,
                cols,
                cells,
                values.len()
            )));
        }
        Ok(Self { rows, cols, values })
    }

    /// Parse the board file format.
    pub fn parse(text: &str) -> Result<Self, SetupError> {
        let mut lines = text
            .lines()
            .enumerate()
            .map(|(i, line)| (i + 1, line.trim()))
            .filter(|(_, line)| !line.is_empty());

        let (header_line, header) = lines.next().ok_or(SetupError::Parse {
            line: 1,
            message: "missing dimension line".to_string(),
        })?;
        let (rows, cols) = parse_dimensions(header).ok_or_else(|| SetupError::Parse {
            line: header_line,
            message: format!("expected ROWSxCOLS, found {:?}", header),
        })?;

        let mut values = Vec::with_capacity(cell_count(rows, cols)?.min(1 << 16));
        for (line, value) in lines {
            if value.split_whitespace().nth(1).is_some() {
                return Err(SetupError::Parse {
                    line,
                    message: format!("card value {:?} contains whitespace", value),
                });
            }
            values.push(value.to_string());
        }

        Self::new(rows, cols, values)
    }

    /// Read and parse a board file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, SetupError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| SetupError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let spec = Self::parse(&text)?;
        debug!(path = %path.display(), rows = spec.rows, cols = spec.cols, "loaded board file");
        Ok(spec)
    }

    /// Number of rows.
    #[must_use]
    pub fn rows(&self) -> usize {
        self.rows
    }

    /// Number of columns.
    #[must_use]
    pub fn cols(&self) -> usize {
        self.cols
    }

    /// Card values in row-major order.
    #[must_use]
    pub fn values(&self) -> &[String] {
        &self.values
    }

    /// Consume the board spec, yielding `(rows, cols, values)`.
    #[must_use]
    pub fn into_parts(self) -> (usize, usize, Vec<String>) {
        (self.rows, self.cols, self.values)
    }
}

/// Total cells on a `rows x cols` board, rejecting sizes that overflow.
fn cell_count(rows: usize, cols: usize) -> Result<usize, SetupError> {
    rows.checked_mul(cols).ok_or_else(|| {
        SetupError::InvalidBoardSize(format!("{}x{} board is too large", rows, cols))
    })
}

fn parse_dimensions(token: &str) -> Option<(usize, usize)> {
    let (rows, cols) = token.split_once('x')?;
    let rows = rows.trim().parse().ok()?;
    let cols = cols.trim().parse().ok()?;
    Some((rows, cols))
}

impl std::fmt::Display for BoardSpec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "{}x{}", self.rows, self.cols)?;
        for value in &self.values {
            writeln!(f, "{}", value)?;
        }
        Ok(())
    }
}
