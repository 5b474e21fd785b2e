//! Random-flip driver.
//!
//! Spawns one task per player. Each task flips random cells, then finishes
//! its turn so that no card stays controlled once the run ends. A player
//! only ever parks while holding nothing, so parked players cannot form a
//! cycle and the run always terminates.

use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tokio::task::JoinSet;
use tracing::{debug, info, warn};

use super::config::SimulationConfig;
use super::rng::FlipRng;
use crate::board::Board;
use crate::core::PlayerId;
use crate::error::BoardError;

/// Counters collected over a run.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SimulationStats {
    pub attempted: usize,
    pub succeeded: usize,
    pub matches: usize,
    pub position_empty: usize,
    pub card_unavailable: usize,
    pub other_errors: usize,
}

impl SimulationStats {
    fn record(&mut self, result: &Result<(), BoardError>) {
        self.attempted += 1;
        match result {
            Ok(()) => self.succeeded += 1,
            Err(BoardError::PositionEmpty(_)) => self.position_empty += 1,
            Err(BoardError::CardUnavailable(_)) => self.card_unavailable += 1,
            Err(_) => self.other_errors += 1,
        }
    }

    /// Add another player's counters into this one.
    pub fn merge(&mut self, other: &SimulationStats) {
        self.attempted += other.attempted;
        self.succeeded += other.succeeded;
        self.matches += other.matches;
        self.position_empty += other.position_empty;
        self.card_unavailable += other.card_unavailable;
        self.other_errors += other.other_errors;
    }

    /// Failed flips of any kind.
    #[must_use]
    pub fn failed(&self) -> usize {
        self.position_empty + self.card_unavailable + self.other_errors
    }
}

/// Run `config.players` random players against `board` until each has made
/// `config.flips_per_player` flips. Turn-finishing flips are not counted.
pub async fn simulate(board: Arc<Board>, config: &SimulationConfig) -> SimulationStats {
    let (rows, cols) = board.dimensions();
    let root = FlipRng::new(config.seed);
    info!(players = config.players, flips = config.flips_per_player, seed = config.seed, "starting simulation");

    let mut tasks = JoinSet::new();
    for name in config.player_names() {
        let board = Arc::clone(&board);
        let player = PlayerId::new(name);
        let mut rng = root.for_player(&player);
        let flips = config.flips_per_player;
        let max_delay_ms = config.max_delay_ms;

        tasks.spawn(async move {
            let mut stats = SimulationStats::default();
            for _ in 0..flips {
                let delay = rng.delay_ms(max_delay_ms);
                if delay > 0 {
                    tokio::time::sleep(Duration::from_millis(delay)).await;
                } else {
                    tokio::task::yield_now().await;
                }

                let pos = rng.position(rows, cols);
                let result = board.flip(&player, pos).await;
                if result.is_ok() && board.held_by(&player).len() == 2 {
                    stats.matches += 1;
                }
                stats.record(&result);
            }
            finish_turn(&board, &player).await;
            debug!(%player, ?stats, "player finished");
            stats
        });
    }

    let mut total = SimulationStats::default();
    while let Some(joined) = tasks.join_next().await {
        match joined {
            Ok(stats) => total.merge(&stats),
            Err(err) => warn!(%err, "simulated player failed"),
        }
    }

    info!(?total, "simulation complete");
    total
}

/// Give up whatever `player` still controls without parking.
///
/// A lone held card is released by re-flipping it as the second card. A
/// matched pair is removed by starting a new turn on one of its own cells,
/// which then fails as empty.
async fn finish_turn(board: &Board, player: &PlayerId) {
    let held = board.held_by(player);
    if let Some(&first) = held.first() {
        let _ = board.flip(player, first).await;
    }
}
