//! # memory-board
//!
//! A memory-matching card board shared by many players at once.
//!
//! ## Design Principles
//!
//! 1. **One Owner**: The `Board` owns every card and every player's turn
//!    state. Callers hold a `&Board` or `Arc<Board>` and act only through
//!    its four operations.
//!
//! 2. **Atomic Steps**: Board state lives behind one lock that is never held
//!    across an `.await`. Every step between suspension points is atomic.
//!
//! 3. **Wake Then Recheck**: Parked operations are woken with one-shot
//!    hints and always re-read the board before acting.
//!
//! ## Rules
//!
//! - A turn is two flips. The first card is claimed (face up, controlled);
//!   if another player controls it, the flip waits.
//! - The second card is claimed only if free. Otherwise the flip fails and
//!   the first card is released.
//! - A matching pair stays controlled until the player's next first flip,
//!   which removes it. A non-matching pair is released face up and turned
//!   back down on the player's next first flip, unless someone has claimed
//!   it in the meantime.
//!
//! ## Modules
//!
//! - `core`: Positions, players, board configuration
//! - `cards`: Card value and flags
//! - `board`: The shared board, its wake-up registries and views
//! - `sim`: Seeded random players for load-style runs
//! - `error`: Error types

pub mod board;
pub mod cards;
pub mod core;
pub mod error;
pub mod sim;

// Re-export commonly used types
pub use crate::core::{BoardSpec, PlayerId, PlayerRecord, Players, Position};

pub use crate::cards::{Card, CardState};

pub use crate::board::{install, installed, Board, BoardView, CellView};

pub use crate::error::{BoardError, SetupError};

pub use crate::sim::{simulate, FlipRng, SimulationConfig, SimulationStats};
