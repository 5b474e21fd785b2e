//! Board state and its synchronous transitions.
//!
//! `BoardState` owns the grid, the player table and both wake-up
//! registries. Every method here runs to completion under the board lock;
//! the async layer in `board::Board` only decides when to call them and
//! what to await in between.
//!
//! ## Flip protocol
//!
//! A turn is two flips. The first flip of a turn retires the player's
//! previous turn (backlog turned face down, matched pair removed), then
//! claims the target, parking on the cell if another player holds it. The
//! second flip never parks: an empty or held target fails and releases the
//! first card. Two claimed cards with equal values stay held until the next
//! first flip removes them; unequal cards are released face up into the
//! backlog.

use rustc_hash::FxHashMap;
use smallvec::SmallVec;
use tracing::{debug, trace};

use super::view::{BoardView, CellView, VisibleState};
use super::waiters::{CellWaiters, ChangeWaiters, Wake};
use crate::cards::Card;
use crate::core::{BoardSpec, PlayerId, Players, Position};
use crate::error::BoardError;

/// Outcome of one attempt at a flip.
#[derive(Debug)]
pub enum FlipStep {
    /// The flip completed.
    Done,
    /// The target is held by another player; retry after the wake fires.
    Wait(Wake),
}

/// Outcome of one attempt at a watch.
#[derive(Debug)]
pub enum WatchStep {
    /// The visible state differs from the baseline.
    Changed(BoardView),
    /// Nothing changed yet; retry after the wake fires.
    Wait(Wake),
}

/// All mutable board data.
#[derive(Debug)]
pub struct BoardState {
    rows: usize,
    cols: usize,
    cells: Vec<Option<Card>>,
    pub(crate) players: Players,
    pub(crate) cell_waiters: CellWaiters,
    pub(crate) change_waiters: ChangeWaiters,
}

impl BoardState {
    /// Build a board with every card face down.
    #[must_use]
    pub fn new(spec: BoardSpec) -> Self {
        let (rows, cols, values) = spec.into_parts();
        Self {
            rows,
            cols,
            cells: values.into_iter().map(|v| Some(Card::new(v))).collect(),
            players: Players::new(),
            cell_waiters: CellWaiters::new(),
            change_waiters: ChangeWaiters::new(),
        }
    }

    /// `(rows, cols)`.
    #[must_use]
    pub fn dimensions(&self) -> (usize, usize) {
        (self.rows, self.cols)
    }

    /// The card at `pos`, if the position is on the board and not empty.
    #[must_use]
    pub fn card(&self, pos: Position) -> Option<&Card> {
        if !pos.in_bounds(self.rows, self.cols) {
            return None;
        }
        self.cells[pos.index(self.cols)].as_ref()
    }

    fn card_mut(&mut self, pos: Position) -> Option<&mut Card> {
        if !pos.in_bounds(self.rows, self.cols) {
            return None;
        }
        self.cells[pos.index(self.cols)].as_mut()
    }

    fn check_bounds(&self, pos: Position) -> Result<(), BoardError> {
        if pos.in_bounds(self.rows, self.cols) {
            Ok(())
        } else {
            Err(BoardError::OutOfBounds {
                pos,
                rows: self.rows,
                cols: self.cols,
            })
        }
    }

    /// Wake every watcher.
    pub fn broadcast(&mut self) {
        let woken = self.change_waiters.broadcast();
        if woken > 0 {
            trace!(woken, "broadcast change");
        }
    }

    // === Flip ===

    /// Attempt a flip for `player` at `pos`.
    ///
    /// Safe to call again after a `Wait`: retiring an already-retired turn
    /// is a no-op.
    pub fn flip_step(&mut self, player: &PlayerId, pos: Position) -> Result<FlipStep, BoardError> {
        self.check_bounds(pos)?;

        if self.players.get_or_create(player).mid_turn() {
            self.flip_second(player, pos)?;
            return Ok(FlipStep::Done);
        }

        self.retire_turn(player);
        self.flip_first(player, pos)
    }

    fn flip_first(&mut self, player: &PlayerId, pos: Position) -> Result<FlipStep, BoardError> {
        let idx = pos.index(self.cols);
        let Some(card) = self.cells[idx].as_mut() else {
            debug!(%player, %pos, "first card missing");
            return Err(BoardError::PositionEmpty(pos));
        };

        if card.busy {
            trace!(%player, %pos, "waiting for controlled card");
            return Ok(FlipStep::Wait(self.cell_waiters.register(pos)));
        }

        card.claim();
        debug!(%player, %pos, value = %card.value, "flipped first card");
        self.players.get_or_create(player).held.push(pos);
        self.broadcast();
        Ok(FlipStep::Done)
    }

    fn flip_second(&mut self, player: &PlayerId, pos: Position) -> Result<(), BoardError> {
        let claimed = match self.card_mut(pos) {
            None => Err(BoardError::PositionEmpty(pos)),
            Some(card) if card.busy => Err(BoardError::CardUnavailable(pos)),
            Some(card) => {
                card.claim();
                Ok(card.value.clone())
            }
        };

        let second_value = match claimed {
            Ok(value) => value,
            Err(err) => {
                debug!(%player, %pos, %err, "second card unavailable, releasing first");
                self.relinquish(player);
                return Err(err);
            }
        };

        let record = self.players.get_or_create(player);
        record.held.push(pos);
        let first = record.held[0];

        let matched = self
            .card(first)
            .is_some_and(|card| card.value == second_value);

        if matched {
            debug!(%player, %first, second = %pos, value = %second_value, "matched pair");
        } else {
            debug!(%player, %first, second = %pos, "no match");
            let released = self.players.get_or_create(player).release_held();
            self.release_cells(&released);
        }

        self.broadcast();
        Ok(())
    }

    /// End a turn early: the held card goes to the backlog, still face up.
    fn relinquish(&mut self, player: &PlayerId) {
        let released = self.players.get_or_create(player).release_held();
        self.release_cells(&released);
        self.broadcast();
    }

    fn release_cells(&mut self, positions: &[Position]) {
        for &pos in positions {
            if let Some(card) = self.card_mut(pos) {
                card.release();
            }
            if self.cell_waiters.wake_one(pos) {
                trace!(%pos, "woke cell waiter");
            }
        }
    }

    /// Clean up the player's previous turn before a new first card.
    ///
    /// Backlog cells are turned face down unless someone has claimed them
    /// since; a held matched pair is removed from the board.
    fn retire_turn(&mut self, player: &PlayerId) {
        let record = self.players.get_or_create(player);
        let backlog = std::mem::take(&mut record.backlog);
        let matched: SmallVec<[Position; 2]> = if record.holds_match() {
            std::mem::take(&mut record.held)
        } else {
            SmallVec::new()
        };

        let mut changed = false;

        for pos in backlog {
            let Some(card) = self.card_mut(pos) else {
                continue;
            };
            if card.busy {
                continue;
            }
            if !card.turn_down() {
                continue;
            }
            trace!(%player, %pos, "turned face down");
            changed = true;
            if self.cell_waiters.wake_one(pos) {
                trace!(%pos, "woke cell waiter");
            }
        }

        for pos in matched {
            let idx = pos.index(self.cols);
            if self.cells[idx].take().is_some() {
                changed = true;
            }
            let woken = self.cell_waiters.wake_all(pos);
            trace!(%player, %pos, woken, "removed matched card");
        }

        if changed {
            debug!(%player, "retired previous turn");
            self.broadcast();
        }
    }

    // === Observation ===

    /// Render the board as `player` sees it.
    #[must_use]
    pub fn view(&self, player: &PlayerId) -> BoardView {
        let record = self.players.get(player);
        let cells = self
            .cells
            .iter()
            .enumerate()
            .map(|(i, cell)| match cell {
                None => CellView::None,
                Some(card) if !card.face_up => CellView::Down,
                Some(card) => {
                    let pos = Position::from_index(i, self.cols);
                    if card.busy && record.is_some_and(|r| r.controls(pos)) {
                        CellView::Mine(card.value.clone())
                    } else {
                        CellView::Up(card.value.clone())
                    }
                }
            })
            .collect();

        BoardView {
            rows: self.rows,
            cols: self.cols,
            cells,
        }
    }

    /// Observer-independent visible state, for change detection.
    #[must_use]
    pub fn visible(&self) -> VisibleState {
        VisibleState(
            self.cells
                .iter()
                .map(|cell| cell.as_ref().map(|card| card.observable_value().map(str::to_owned)))
                .collect(),
        )
    }

    /// Compare against `baseline`; register for the next change if equal.
    pub fn watch_step(&mut self, player: &PlayerId, baseline: &VisibleState) -> WatchStep {
        if self.visible() != *baseline {
            return WatchStep::Changed(self.view(player));
        }
        WatchStep::Wait(self.change_waiters.register())
    }

    // === Map ===

    /// Group every present card position by value.
    #[must_use]
    pub fn value_groups(&self) -> FxHashMap<String, Vec<Position>> {
        let mut groups: FxHashMap<String, Vec<Position>> = FxHashMap::default();
        for (i, cell) in self.cells.iter().enumerate() {
            if let Some(card) = cell {
                groups
                    .entry(card.value.clone())
                    .or_default()
                    .push(Position::from_index(i, self.cols));
            }
        }
        groups
    }

    /// Replace `old` with `new` at each of `positions` still holding `old`.
    ///
    /// Returns the number of cards rewritten.
    pub fn apply_group(&mut self, old: &str, new: &str, positions: &[Position]) -> usize {
        if old == new {
            return 0;
        }
        let mut rewritten = 0;
        for &pos in positions {
            if let Some(card) = self.card_mut(pos) {
                if card.value == old {
                    card.value = new.to_string();
                    rewritten += 1;
                }
            }
        }
        rewritten
    }

    // === Invariants ===

    /// Verify the control invariants.
    ///
    /// - every turn stack holds at most two cells
    /// - no cell is held by two players
    /// - a cell is busy iff some player holds it
    /// - held cells exist and are face up
    pub fn check_invariants(&self) -> Result<(), String> {
        let mut holders: FxHashMap<Position, &PlayerId> = FxHashMap::default();

        for (player, record) in self.players.iter() {
            if record.held.len() > 2 {
                return Err(format!("{} holds {} cells", player, record.held.len()));
            }
            for &pos in &record.held {
                if let Some(other) = holders.insert(pos, player) {
                    return Err(format!("{} held by both {} and {}", pos, other, player));
                }
                match self.card(pos) {
                    None => return Err(format!("{} holds empty cell {}", player, pos)),
                    Some(card) if !card.busy || !card.face_up => {
                        return Err(format!("{} holds {} but it is {:?}", player, pos, card.state()))
                    }
                    Some(_) => {}
                }
            }
        }

        for (i, cell) in self.cells.iter().enumerate() {
            let pos = Position::from_index(i, self.cols);
            if let Some(card) = cell {
                if card.busy && !holders.contains_key(&pos) {
                    return Err(format!("{} is busy but held by nobody", pos));
                }
            }
        }

        Ok(())
    }
}
