//! Game-over and winner determination.
//!
//! Scores are passed as `(player, score)` pairs in whatever order the
//! caller wants ties broken by. `dotbox-sync` passes them in roster
//! order (see `Match::roster_scores`).

use dotbox_protocol::PlayerId;

/// The result of evaluating a set of scores.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// Squares remain unclaimed.
    Undecided,
    /// One player has the strictly highest score.
    Winner(PlayerId),
    /// Two or more players share the highest score, in iteration order.
    Tie(Vec<PlayerId>),
}

impl Outcome {
    pub fn is_over(&self) -> bool {
        !matches!(self, Self::Undecided)
    }
}

/// Returns `true` once the claimed squares reach `total_squares`.
///
/// `>=` rather than `==` so an over-count still ends the game.
pub fn is_game_over<'a>(
    scores: impl IntoIterator<Item = (&'a PlayerId, u32)>,
    total_squares: u32,
) -> bool {
    let claimed: u64 = scores.into_iter().map(|(_, s)| u64::from(s)).sum();
    claimed >= u64::from(total_squares)
}

/// The first player, in iteration order, to hold the top score.
///
/// `None` while the game isn't over. On a tie this still names the first
/// of the tied players; use [`outcome`] to tell ties apart.
pub fn winner<'a>(
    scores: impl IntoIterator<Item = (&'a PlayerId, u32)>,
    total_squares: u32,
) -> Option<PlayerId> {
    let scores: Vec<_> = scores.into_iter().collect();
    if !is_game_over(scores.iter().copied(), total_squares) {
        return None;
    }
    let mut best: Option<(&PlayerId, u32)> = None;
    for (player, score) in scores {
        if best.is_none_or(|(_, top)| score > top) {
            best = Some((player, score));
        }
    }
    best.map(|(player, _)| player.clone())
}

/// Evaluates the scores into an explicit [`Outcome`].
pub fn outcome<'a>(
    scores: impl IntoIterator<Item = (&'a PlayerId, u32)>,
    total_squares: u32,
) -> Outcome {
    let scores: Vec<_> = scores.into_iter().collect();
    if !is_game_over(scores.iter().copied(), total_squares) {
        return Outcome::Undecided;
    }
    let top = scores.iter().map(|(_, s)| *s).max().unwrap_or(0);
    let mut leaders: Vec<PlayerId> = scores
        .iter()
        .filter(|(_, s)| *s == top)
        .map(|(p, _)| (*p).clone())
        .collect();
    if leaders.len() == 1 {
        Outcome::Winner(leaders.remove(0))
    } else {
        Outcome::Tie(leaders)
    }
}
