//! Win/loss/tie statistics.

use dotbox_protocol::PlayerId;
use dotbox_rules::Outcome;
use serde::{Deserialize, Serialize};

/// How a finished match went for one player.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GameResult {
    Win,
    Loss,
    Tie,
}

impl GameResult {
    /// `player`'s result under `outcome`, or `None` if the match is
    /// still undecided.
    ///
    /// Players sharing a tied top score get `Tie`; everyone below the
    /// top gets `Loss`.
    pub fn for_player(outcome: &Outcome, player: &PlayerId) -> Option<Self> {
        match outcome {
            Outcome::Undecided => None,
            Outcome::Winner(w) if w == player => Some(Self::Win),
            Outcome::Winner(_) => Some(Self::Loss),
            Outcome::Tie(tied) if tied.contains(player) => Some(Self::Tie),
            Outcome::Tie(_) => Some(Self::Loss),
        }
    }
}

/// Lifetime totals for one player.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserStats {
    pub wins: u32,
    pub losses: u32,
    pub ties: u32,
}

impl UserStats {
    pub fn record(&mut self, result: GameResult) {
        match result {
            GameResult::Win => self.wins += 1,
            GameResult::Loss => self.losses += 1,
            GameResult::Tie => self.ties += 1,
        }
    }

    pub fn games_played(&self) -> u32 {
        self.wins + self.losses + self.ties
    }
}
