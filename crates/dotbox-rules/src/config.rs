//! Match configuration.

use serde::{Deserialize, Serialize};

use crate::{Grid, RulesError};

/// Default board size, in boxes per side.
pub const DEFAULT_GRID_SIZE: u32 = 6;

/// Largest accepted board, in boxes per side.
pub const MAX_GRID_SIZE: u32 = 256;

/// Settings fixed when a match is created.
///
/// The computer opponent counts towards both player limits.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchConfig {
    /// Boxes per side of the (square) board.
    pub grid_size: u32,

    /// Minimum players required to start.
    pub min_players: usize,

    /// Maximum players allowed to join.
    pub max_players: usize,
}

impl Default for MatchConfig {
    fn default() -> Self {
        Self {
            grid_size: DEFAULT_GRID_SIZE,
            min_players: 2,
            max_players: 8,
        }
    }
}

impl MatchConfig {
    pub fn grid(&self) -> Grid {
        Grid::square(self.grid_size)
    }

    /// Rejects configurations that can't produce a playable match.
    pub fn validate(&self) -> Result<(), RulesError> {
        if self.grid_size == 0 {
            return Err(RulesError::InvalidConfig("grid_size must be at least 1".into()));
        }
        if self.grid_size > MAX_GRID_SIZE {
            return Err(RulesError::InvalidConfig(format!(
                "grid_size {} exceeds the maximum of {MAX_GRID_SIZE}",
                self.grid_size
            )));
        }
        if self.min_players == 0 {
            return Err(RulesError::InvalidConfig("min_players must be at least 1".into()));
        }
        if self.max_players < self.min_players {
            return Err(RulesError::InvalidConfig(format!(
                "max_players ({}) is below min_players ({})",
                self.max_players, self.min_players
            )));
        }
        Ok(())
    }
}
