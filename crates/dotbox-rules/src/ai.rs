//! Line picker for the computer opponent.
//!
//! Greedy and one move deep: take a box if one is available, otherwise
//! avoid handing the next player a box, otherwise draw anything.

use dotbox_protocol::{LineKey, Lines};
use rand::Rng;
use rand::seq::IndexedRandom;

use crate::grid::{self, Grid};

/// Chooses the next line for the computer opponent.
///
/// Preference order:
/// 1. a line that completes at least one square;
/// 2. a line that leaves every neighbouring square with at most two sides;
/// 3. any free line.
///
/// Candidates within a tier are picked with `rng`. Returns `None` when
/// every line is drawn.
pub fn choose_line<R: Rng + ?Sized>(grid: Grid, lines: &Lines, rng: &mut R) -> Option<LineKey> {
    let free: Vec<LineKey> = grid.lines().filter(|l| !lines.contains_key(l)).collect();

    let completing: Vec<LineKey> = free
        .iter()
        .copied()
        .filter(|l| sides_after(grid, *l, lines).any(|n| n == 4))
        .collect();
    if let Some(line) = completing.choose(rng) {
        tracing::debug!(%line, "ai takes a box");
        return Some(*line);
    }

    let safe: Vec<LineKey> = free
        .iter()
        .copied()
        .filter(|l| sides_after(grid, *l, lines).all(|n| n < 3))
        .collect();
    if let Some(line) = safe.choose(rng) {
        return Some(*line);
    }

    free.choose(rng).copied()
}

/// Side counts of each square next to `line`, as if `line` were drawn.
fn sides_after<'a>(grid: Grid, line: LineKey, lines: &'a Lines) -> impl Iterator<Item = usize> + 'a {
    grid.adjacent_squares(line)
        .into_iter()
        .map(move |sq| grid::sides_drawn(sq.row, sq.col, lines) + 1)
}
