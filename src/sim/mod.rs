//! Simulated players.
//!
//! Drives a board with seeded random flips from many concurrent tasks. Used
//! to exercise the board's invariants under arbitrary interleavings.
//!
//! ## Key Types
//!
//! - `SimulationConfig`: player count, flip budget, seed, pacing
//! - `FlipRng`: per-player deterministic randomness
//! - `SimulationStats`: what happened

pub mod config;
pub mod driver;
pub mod rng;

pub use config::SimulationConfig;
pub use driver::{simulate, SimulationStats};
pub use rng::FlipRng;
