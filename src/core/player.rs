//! Player identification and per-player turn bookkeeping.
//!
//! ## PlayerId
//!
//! Opaque string identifier. Any string names a player; records are
//! created on first reference and never removed.
//!
//! ## PlayerRecord
//!
//! The in-progress turn (at most two held cells) and the backlog of cells
//! from the last finished, non-matching turn that still need to be turned
//! face down.
//!
//! ## Players
//!
//! `PlayerId -> PlayerRecord` storage backed by `FxHashMap`.

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use super::position::Position;

/// Opaque player identifier.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PlayerId(pub String);

impl PlayerId {
    /// Create a new player ID.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Borrow the raw identifier.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for PlayerId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl From<String> for PlayerId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl std::fmt::Display for PlayerId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Turn state for one player.
///
/// `held` is the turn stack: the cells this player currently controls.
/// It holds one cell mid-turn, and two cells only after a matching pair
/// (kept until the player's next first-card flip removes them).
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PlayerRecord {
    /// Cells controlled by this player, in flip order.
    pub held: SmallVec<[Position; 2]>,

    /// Face-up cells from the last non-matching turn, awaiting turn-down.
    pub backlog: SmallVec<[Position; 2]>,
}

impl PlayerRecord {
    /// True when the player holds exactly one cell (the next flip is a second card).
    #[must_use]
    pub fn mid_turn(&self) -> bool {
        self.held.len() == 1
    }

    /// True when the player holds a matched pair waiting for removal.
    #[must_use]
    pub fn holds_match(&self) -> bool {
        self.held.len() == 2
    }

    /// Check whether this player controls `pos`.
    #[must_use]
    pub fn controls(&self, pos: Position) -> bool {
        self.held.contains(&pos)
    }

    /// Move every held cell into the backlog, ending the turn.
    pub fn release_held(&mut self) -> SmallVec<[Position; 2]> {
        let released = std::mem::take(&mut self.held);
        self.backlog.extend(released.iter().copied());
        released
    }
}

/// All known players.
#[derive(Clone, Debug, Default)]
pub struct Players {
    records: FxHashMap<PlayerId, PlayerRecord>,
}

impl Players {
    /// Create an empty player table.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Get a player's record, creating an empty one if the id is unknown.
    pub fn get_or_create(&mut self, player: &PlayerId) -> &mut PlayerRecord {
        if !self.records.contains_key(player) {
            tracing::trace!(%player, "registering player");
        }
        self.records.entry(player.clone()).or_default()
    }

    /// Get a player's record if it exists.
    #[must_use]
    pub fn get(&self, player: &PlayerId) -> Option<&PlayerRecord> {
        self.records.get(player)
    }

    /// Check whether a player has been seen.
    #[must_use]
    pub fn contains(&self, player: &PlayerId) -> bool {
        self.records.contains_key(player)
    }

    /// Number of known players.
    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// True when no player has been seen yet.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Iterate over `(PlayerId, &PlayerRecord)` pairs in arbitrary order.
    pub fn iter(&self) -> impl Iterator<Item = (&PlayerId, &PlayerRecord)> {
        self.records.iter()
    }
}
