//! Simulation configuration.

use serde::{Deserialize, Serialize};

/// Parameters for a random-flip run.
///
/// ```
/// use memory_board::SimulationConfig;
///
/// let config = SimulationConfig::new(3)
///     .with_flips_per_player(50)
///     .with_seed(7)
///     .with_max_delay_ms(2);
///
/// assert_eq!(config.players, 3);
/// assert_eq!(config.player_names()[2], "player-2");
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    /// Number of concurrent players.
    pub players: usize,

    /// Flips each player attempts before finishing its turn.
    pub flips_per_player: usize,

    /// Run seed; each player derives its own stream from it.
    pub seed: u64,

    /// Upper bound of the random pause before each flip. 0 yields instead.
    pub max_delay_ms: u64,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            players: 4,
            flips_per_player: 100,
            seed: 0,
            max_delay_ms: 0,
        }
    }
}

impl SimulationConfig {
    /// Create a configuration for `players` players.
    pub fn new(players: usize) -> Self {
        assert!(players > 0, "Must have at least 1 player");
        Self {
            players,
            ..Self::default()
        }
    }

    /// Set the number of flips per player.
    #[must_use]
    pub fn with_flips_per_player(mut self, flips: usize) -> Self {
        self.flips_per_player = flips;
        self
    }

    /// Set the run seed.
    #[must_use]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Set the maximum pause before each flip.
    #[must_use]
    pub fn with_max_delay_ms(mut self, max_delay_ms: u64) -> Self {
        self.max_delay_ms = max_delay_ms;
        self
    }

    /// Player ids used by the run.
    #[must_use]
    pub fn player_names(&self) -> Vec<String> {
        (0..self.players).map(|i| format!("player-{}", i)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder() {
        let config = SimulationConfig::new(2)
            .with_flips_per_player(10)
            .with_seed(99)
            .with_max_delay_ms(5);

        assert_eq!(config.players, 2);
        assert_eq!(config.flips_per_player, 10);
        assert_eq!(config.seed, 99);
        assert_eq!(config.max_delay_ms, 5);
    }

    #[test]
    fn test_partial_deserialize_uses_defaults() {
        let config: SimulationConfig = serde_json::from_str(r#"{"players": 8}"#).unwrap();
        assert_eq!(config.players, 8);
        assert_eq!(config.flips_per_player, 100);
        assert_eq!(config.max_delay_ms, 0);
    }

    #[test]
    #[should_panic(expected = "Must have at least 1 player")]
    fn test_zero_players() {
        SimulationConfig::new(0);
    }
}
