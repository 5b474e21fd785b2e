//! Card model.
//!
//! ## Key Types
//!
//! - `Card`: value plus face-up and busy flags
//! - `CardState`: the lifecycle state those flags encode

pub mod card;

pub use card::{Card, CardState};
