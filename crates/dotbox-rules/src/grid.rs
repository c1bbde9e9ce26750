//! Grid model and completion checker.
//!
//! After a line is drawn only the (at most two) squares touching it can
//! change state, and completion is monotonic, so the checker looks at
//! those neighbours instead of rescanning the board. Every move costs
//! O(1) regardless of grid size.

use dotbox_protocol::{Dot, LineKey, Lines, Orientation, SquareKey};
use serde::{Deserialize, Serialize};

use crate::RulesError;

// ---------------------------------------------------------------------------
// Grid
// ---------------------------------------------------------------------------

/// Board dimensions, counted in boxes.
///
/// A `rows × cols` grid has `(rows + 1) × (cols + 1)` dots.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Grid {
    pub rows: u32,
    pub cols: u32,
}

impl Grid {
    pub const fn new(rows: u32, cols: u32) -> Self {
        Self { rows, cols }
    }

    /// A square board with `size` boxes per side.
    pub const fn square(size: u32) -> Self {
        Self::new(size, size)
    }

    /// Saturates at `u32::MAX` instead of wrapping.
    pub fn total_squares(&self) -> u32 {
        self.rows.saturating_mul(self.cols)
    }

    /// Number of drawable lines: horizontal plus vertical.
    pub fn line_count(&self) -> usize {
        let (rows, cols) = (self.rows as usize, self.cols as usize);
        (rows + 1) * cols + rows * (cols + 1)
    }

    pub fn contains_dot(&self, dot: Dot) -> bool {
        dot.row <= self.rows && dot.col <= self.cols
    }

    pub fn contains_square(&self, square: SquareKey) -> bool {
        square.row < self.rows && square.col < self.cols
    }

    /// Checks that `a`–`b` is a drawable line and returns its key.
    ///
    /// This is the validation the completion checker assumes has already
    /// happened: both dots on the board, axis-aligned, unit length.
    pub fn validate_line(&self, a: Dot, b: Dot) -> Result<LineKey, RulesError> {
        if !self.contains_dot(a) || !self.contains_dot(b) {
            return Err(RulesError::LineOutOfBounds(a, b));
        }
        let dr = a.row.abs_diff(b.row);
        let dc = a.col.abs_diff(b.col);
        if dr + dc != 1 {
            return Err(RulesError::NotAdjacent(a, b));
        }
        Ok(line_key(a, b))
    }

    /// Every line on the board: horizontal lines row by row, then
    /// vertical lines row by row.
    pub fn lines(&self) -> impl Iterator<Item = LineKey> + '_ {
        let horizontal = (0..=self.rows).flat_map(move |r| {
            (0..self.cols).map(move |c| line_key(Dot::new(r, c), Dot::new(r, c + 1)))
        });
        let vertical = (0..self.rows).flat_map(move |r| {
            (0..=self.cols).map(move |c| line_key(Dot::new(r, c), Dot::new(r + 1, c)))
        });
        horizontal.chain(vertical)
    }

    /// The in-bounds squares bordering `line`, above/left first.
    ///
    /// Interior lines have two neighbours, edge lines one.
    pub fn adjacent_squares(&self, line: LineKey) -> Vec<SquareKey> {
        let Dot { row, col } = line.start();
        let candidates = match line.orientation() {
            Some(Orientation::Horizontal) => [
                row.checked_sub(1).map(|r| SquareKey::new(r, col)),
                Some(SquareKey::new(row, col)),
            ],
            Some(Orientation::Vertical) => [
                col.checked_sub(1).map(|c| SquareKey::new(row, c)),
                Some(SquareKey::new(row, col)),
            ],
            None => [None, None],
        };
        candidates
            .into_iter()
            .flatten()
            .filter(|sq| self.contains_square(*sq))
            .collect()
    }
}

// ---------------------------------------------------------------------------
// Completion checker
// ---------------------------------------------------------------------------

/// Canonical key for the line between two dots. Commutative.
pub fn line_key(p1: Dot, p2: Dot) -> LineKey {
    LineKey::between(p1, p2)
}

/// Top, bottom, left and right sides of the square at `(r, c)`.
pub fn square_sides(r: u32, c: u32) -> [LineKey; 4] {
    [
        line_key(Dot::new(r, c), Dot::new(r, c + 1)),
        line_key(Dot::new(r + 1, c), Dot::new(r + 1, c + 1)),
        line_key(Dot::new(r, c), Dot::new(r + 1, c)),
        line_key(Dot::new(r, c + 1), Dot::new(r + 1, c + 1)),
    ]
}

/// How many of the square's four sides are drawn.
pub fn sides_drawn(r: u32, c: u32, lines: &Lines) -> usize {
    square_sides(r, c)
        .iter()
        .filter(|side| lines.contains_key(*side))
        .count()
}

/// Returns `true` iff all four sides of the square at `(r, c)` are drawn.
pub fn is_square_complete(r: u32, c: u32, lines: &Lines) -> bool {
    square_sides(r, c).iter().all(|side| lines.contains_key(side))
}

/// Squares next to a just-drawn `line` that are now complete.
///
/// `lines` must already contain `line`. Returns 0, 1 or 2 keys, above
/// (or left) before below (or right). Squares already credited in a
/// previous move are *not* filtered here; the caller skips those.
pub fn squares_affected_by_line(line: LineKey, lines: &Lines, grid: Grid) -> Vec<SquareKey> {
    grid.adjacent_squares(line)
        .into_iter()
        .filter(|sq| is_square_complete(sq.row, sq.col, lines))
        .collect()
}
