//! Core value types: positions, players, board configuration.
//!
//! These types carry no synchronization of their own; the `board` module
//! owns every mutable instance and guards it.

pub mod config;
pub mod player;
pub mod position;

pub use config::BoardSpec;
pub use player::{PlayerId, PlayerRecord, Players};
pub use position::Position;
