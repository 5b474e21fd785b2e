//! A single card on the board.
//!
//! The card's true `value` is always present; what other players may see is
//! derived at read time by [`Card::observable_value`].
//!
//! ## States
//!
//! | state                  | face_up | busy  |
//! |------------------------|---------|-------|
//! | `Hidden`               | false   | false |
//! | `ControlledVisible`    | true    | true  |
//! | `UncontrolledVisible`  | true    | false |
//!
//! A removed card is not a `Card` at all: its cell holds `None`.

use serde::{Deserialize, Serialize};

/// Lifecycle state derived from a card's flags.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum CardState {
    /// Face down, nobody controls it.
    Hidden,
    /// Face up and held by a player as part of their turn.
    ControlledVisible,
    /// Face up, held by nobody.
    UncontrolledVisible,
}

/// A card occupying a board cell.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Card {
    /// The card's value, visible only while face up.
    pub value: String,

    /// Is the card face up?
    pub face_up: bool,

    /// Is the card controlled by some player's in-progress turn?
    pub busy: bool,
}

impl Card {
    /// Create a face-down, uncontrolled card.
    #[must_use]
    pub fn new(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            face_up: false,
            busy: false,
        }
    }

    /// The value as seen by players: `Some` only while face up.
    #[must_use]
    pub fn observable_value(&self) -> Option<&str> {
        self.face_up.then_some(self.value.as_str())
    }

    /// Current lifecycle state.
    ///
    /// A busy card is always face up; a face-down busy card would violate the
    /// board invariants and is reported as `ControlledVisible`.
    #[must_use]
    pub fn state(&self) -> CardState {
        match (self.face_up, self.busy) {
            (_, true) => CardState::ControlledVisible,
            (true, false) => CardState::UncontrolledVisible,
            (false, false) => CardState::Hidden,
        }
    }

    /// Take control: turn face up and mark busy.
    pub fn claim(&mut self) {
        self.face_up = true;
        self.busy = true;
    }

    /// Give up control, leaving the card face up.
    pub fn release(&mut self) {
        self.busy = false;
    }

    /// Turn face down if nobody controls the card.
    ///
    /// Returns `true` if the visible state changed.
    pub fn turn_down(&mut self) -> bool {
        if self.busy || !self.face_up {
            return false;
        }
        self.face_up = false;
        true
    }
}
