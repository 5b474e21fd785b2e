//! The shared board.
//!
//! `Board` is the concurrency core: many player tasks call `flip`, `look`,
//! `map` and `watch` on one board at the same time. All state sits behind a
//! single mutex that is never held across an `.await`, so each synchronous
//! step is atomic and tasks interleave only at three suspension points:
//!
//! - a first-card flip parked on a card another player controls
//! - a watch parked until the visible board changes
//! - a map awaiting its transform tasks
//!
//! ## Wake-ups are hints
//!
//! Releasing a card wakes the oldest parked flip for that cell, which then
//! re-runs the whole flip decision. A caller that was not parked may claim
//! the card first, in which case the woken flip parks again at the back of
//! the queue. There is no fairness guarantee beyond that.
//!
//! ## Usage
//!
//! ```
//! use memory_board::{Board, BoardSpec, PlayerId, Position};
//!
//! # tokio::runtime::Builder::new_current_thread().build().unwrap().block_on(async {
//! let spec = BoardSpec::parse("1x2\nA\nA\n").unwrap();
//! let board = Board::new(spec);
//! let alice = PlayerId::new("alice");
//!
//! board.flip(&alice, Position::new(0, 0)).await.unwrap();
//! board.flip(&alice, Position::new(0, 1)).await.unwrap();
//! assert_eq!(board.look(&alice), "1x2\nmy A\nmy A\n");
//! # });
//! ```

pub mod state;
pub mod view;
pub mod waiters;

use std::future::Future;
use std::path::Path;
use std::sync::{Arc, Mutex, OnceLock, PoisonError};

use tokio::task::JoinSet;
use tracing::{debug, info, trace, warn};

use crate::cards::Card;
use crate::core::{BoardSpec, PlayerId, Position};
use crate::error::{BoardError, SetupError};

pub use state::{BoardState, FlipStep, WatchStep};
pub use view::{BoardView, CellView, VisibleState};
pub use waiters::{CellWaiters, ChangeWaiters, Wake};

/// A memory board shared by any number of concurrent players.
#[derive(Debug)]
pub struct Board {
    rows: usize,
    cols: usize,
    state: Mutex<BoardState>,
}

impl Board {
    /// Build a board from a validated spec. Every card starts face down.
    #[must_use]
    pub fn new(spec: BoardSpec) -> Self {
        let (rows, cols) = (spec.rows(), spec.cols());
        debug!(rows, cols, "created board");
        Self {
            rows,
            cols,
            state: Mutex::new(BoardState::new(spec)),
        }
    }

    /// Parse a board file and build a board from it.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, SetupError> {
        BoardSpec::from_file(path).map(Self::new)
    }

    /// `(rows, cols)`.
    #[must_use]
    pub fn dimensions(&self) -> (usize, usize) {
        (self.rows, self.cols)
    }

    fn with_state<R>(&self, f: impl FnOnce(&mut BoardState) -> R) -> R {
        let mut guard = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        f(&mut guard)
    }

    // === Operations ===

    /// Flip the card at `pos` for `player`.
    ///
    /// The first flip of a turn waits while another player controls the
    /// card. The second flip never waits: if the card is gone or controlled
    /// it fails, and the player's first card is released as a side effect.
    pub async fn flip(&self, player: &PlayerId, pos: Position) -> Result<(), BoardError> {
        loop {
            match self.with_state(|s| s.flip_step(player, pos))? {
                FlipStep::Done => return Ok(()),
                FlipStep::Wait(wake) => CellWait::new(self, pos, wake).wait().await,
            }
        }
    }

    /// Text snapshot of the board as `player` sees it.
    pub fn look(&self, player: &PlayerId) -> String {
        self.view(player).to_string()
    }

    /// Structured snapshot of the board as `player` sees it.
    ///
    /// Registers `player` if unknown.
    pub fn view(&self, player: &PlayerId) -> BoardView {
        self.with_state(|s| {
            s.players.get_or_create(player);
            s.view(player)
        })
    }

    /// Replace every card value `v` with `transform(v)`.
    ///
    /// `transform` runs once per distinct value, and all cards sharing a
    /// value receive the same result, so matching cards keep matching.
    /// Distinct values are transformed concurrently and each group is
    /// written back as soon as its transform finishes; readers may see a
    /// mix of old and new groups until the call returns. Watchers are
    /// notified once, at the end.
    ///
    /// Fails with `PlayerNotFound` if `player` has never been seen. If a
    /// transform panics the remaining groups are still applied and the
    /// call fails with `TransformFailed`.
    pub async fn map<F, Fut>(&self, player: &PlayerId, transform: F) -> Result<(), BoardError>
    where
        F: Fn(String) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = String> + Send + 'static,
    {
        let groups = self.with_state(|s| {
            if s.players.contains(player) {
                Ok(s.value_groups())
            } else {
                Err(BoardError::PlayerNotFound(player.clone()))
            }
        })?;

        let transform = Arc::new(transform);
        let mut tasks = JoinSet::new();
        for old in groups.keys().cloned() {
            let transform = Arc::clone(&transform);
            tasks.spawn(async move {
                let new = transform(old.clone()).await;
                (old, new)
            });
        }

        let mut failure = None;
        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok((old, new)) => {
                    let Some(positions) = groups.get(&old) else {
                        continue;
                    };
                    let rewritten = self.with_state(|s| s.apply_group(&old, &new, positions));
                    trace!(%player, %old, %new, rewritten, "applied map group");
                }
                Err(err) => {
                    warn!(%player, %err, "map transform failed");
                    failure.get_or_insert_with(|| err.to_string());
                }
            }
        }

        self.with_state(|s| s.broadcast());
        debug!(%player, groups = groups.len(), "map complete");

        match failure {
            Some(message) => Err(BoardError::TransformFailed(message)),
            None => Ok(()),
        }
    }

    /// Wait until the visible board differs from its state at call time,
    /// then return `player`'s text snapshot.
    pub async fn watch(&self, player: &PlayerId) -> String {
        self.watch_view(player).await.to_string()
    }

    /// Structured form of [`Board::watch`].
    ///
    /// Changes of control alone (a card switching from `up` to `my`) do not
    /// count; only existence, face-up state and face-up values do.
    pub async fn watch_view(&self, player: &PlayerId) -> BoardView {
        let baseline = self.with_state(|s| {
            s.players.get_or_create(player);
            s.visible()
        });

        loop {
            match self.with_state(|s| s.watch_step(player, &baseline)) {
                WatchStep::Changed(view) => {
                    debug!(%player, "watch resolved");
                    return view;
                }
                WatchStep::Wait(wake) => {
                    let _ = wake.await;
                }
            }
        }
    }

    // === Inspection ===

    /// A copy of the card at `pos`, or `None` if empty or off the board.
    #[must_use]
    pub fn card_at(&self, pos: Position) -> Option<Card> {
        self.with_state(|s| s.card(pos).cloned())
    }

    /// Cells currently controlled by `player`, in flip order.
    #[must_use]
    pub fn held_by(&self, player: &PlayerId) -> Vec<Position> {
        self.with_state(|s| {
            s.players
                .get(player)
                .map(|record| record.held.to_vec())
                .unwrap_or_default()
        })
    }

    /// Number of flips parked on `pos`.
    #[must_use]
    pub fn waiters_at(&self, pos: Position) -> usize {
        self.with_state(|s| s.cell_waiters.waiting(pos))
    }

    /// Number of parked watches.
    #[must_use]
    pub fn watchers(&self) -> usize {
        self.with_state(|s| s.change_waiters.len())
    }

    /// Check the control invariants; see [`BoardState::check_invariants`].
    pub fn check_invariants(&self) -> Result<(), String> {
        self.with_state(|s| s.check_invariants())
    }
}

/// A flip parked on one cell.
///
/// If the parked flip is dropped after its wake fired but before it ran,
/// the wake is passed to the next waiter so the release is not lost.
struct CellWait<'a> {
    board: &'a Board,
    pos: Position,
    wake: Wake,
    finished: bool,
}

impl<'a> CellWait<'a> {
    fn new(board: &'a Board, pos: Position, wake: Wake) -> Self {
        Self {
            board,
            pos,
            wake,
            finished: false,
        }
    }

    async fn wait(mut self) {
        let _ = (&mut self.wake).await;
        self.finished = true;
    }
}

impl Drop for CellWait<'_> {
    fn drop(&mut self) {
        if !self.finished && self.wake.try_recv().is_ok() {
            let pos = self.pos;
            trace!(%pos, "forwarding wake from cancelled flip");
            self.board.with_state(|s| s.cell_waiters.wake_one(pos));
        }
    }
}

static INSTALLED: OnceLock<Arc<Board>> = OnceLock::new();

/// Publish `board` as the process-wide board.
///
/// Only one board may be installed per process; later calls fail with
/// `DuplicateBoard`.
pub fn install(board: Board) -> Result<Arc<Board>, SetupError> {
    let board = Arc::new(board);
    INSTALLED
        .set(Arc::clone(&board))
        .map_err(|_| SetupError::DuplicateBoard)?;
    let (rows, cols) = board.dimensions();
    info!(rows, cols, "installed process board");
    Ok(board)
}

/// The process-wide board, if one was installed.
#[must_use]
pub fn installed() -> Option<Arc<Board>> {
    INSTALLED.get().cloned()
}
