//! Error types.
//!
//! `BoardError` is returned by the four board operations; `SetupError` by
//! everything that happens before a board exists (parsing, sizing,
//! installation as the process-wide board).

use std::path::PathBuf;

use crate::core::{PlayerId, Position};

/// Errors returned by board operations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BoardError {
    #[error("player {0} not found")]
    PlayerNotFound(PlayerId),

    #[error("no card at {0}")]
    PositionEmpty(Position),

    #[error("card at {0} is controlled by another player")]
    CardUnavailable(Position),

    #[error("position {pos} is outside the {rows}x{cols} board")]
    OutOfBounds {
        pos: Position,
        rows: usize,
        cols: usize,
    },

    #[error("transform failed: {0}")]
    TransformFailed(String),
}

/// Errors raised while building a board.
#[derive(Debug, thiserror::Error)]
pub enum SetupError {
    #[error("invalid board size: {0}")]
    InvalidBoardSize(String),

    #[error("a board is already installed for this process")]
    DuplicateBoard,

    #[error("line {line}: {message}")]
    Parse { line: usize, message: String },

    #[error("failed to read board file {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
}
