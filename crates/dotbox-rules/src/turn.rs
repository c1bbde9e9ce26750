//! Turn rotation over a fixed roster.

use dotbox_protocol::PlayerId;

/// Tracks whose turn it is.
///
/// The roster is fixed when the manager is built; the cursor always
/// points at a valid index unless the roster is empty, in which case
/// [`current`](Self::current) is `None` and [`advance`](Self::advance)
/// does nothing.
#[derive(Debug, Clone, Default)]
pub struct TurnManager {
    players: Vec<PlayerId>,
    index: usize,
}

impl TurnManager {
    /// Creates a manager whose first turn belongs to `players[0]`.
    pub fn new(players: Vec<PlayerId>) -> Self {
        Self { players, index: 0 }
    }

    /// The player whose turn it is.
    pub fn current(&self) -> Option<&PlayerId> {
        self.players.get(self.index)
    }

    /// The roster, in turn order.
    pub fn players(&self) -> &[PlayerId] {
        &self.players
    }

    /// Returns `true` if it is `player`'s turn.
    pub fn is_turn_of(&self, player: &PlayerId) -> bool {
        self.current() == Some(player)
    }

    /// Passes the turn to the next player, wrapping around.
    pub fn advance(&mut self) {
        if self.players.is_empty() {
            return;
        }
        self.index = (self.index + 1) % self.players.len();
    }

    /// The player who would move after the current one.
    pub fn next_player(&self) -> Option<&PlayerId> {
        if self.players.is_empty() {
            return None;
        }
        self.players.get((self.index + 1) % self.players.len())
    }

    /// Points the cursor at `player`.
    ///
    /// Used to resynchronise from an authoritative remote update. An id
    /// that isn't on the roster (a stale or late update) is ignored.
    pub fn set_current_player(&mut self, player: &PlayerId) {
        match self.players.iter().position(|p| p == player) {
            Some(index) => self.index = index,
            None => tracing::debug!(%player, "ignoring turn for player not on roster"),
        }
    }
}
