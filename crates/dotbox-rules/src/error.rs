//! Error types for the rules layer.

use dotbox_protocol::Dot;

/// Errors raised while validating player input against the grid.
///
/// The checker functions themselves never fail; these come from the
/// validation helpers callers run *before* handing a line to them.
#[derive(Debug, thiserror::Error)]
pub enum RulesError {
    /// One of the endpoints lies outside the dot grid.
    #[error("line {0}-{1} is outside the grid")]
    LineOutOfBounds(Dot, Dot),

    /// The endpoints are not orthogonal neighbours (diagonal, too long,
    /// or the same dot twice).
    #[error("dots {0} and {1} are not adjacent")]
    NotAdjacent(Dot, Dot),

    /// A match configuration that can't produce a playable board.
    #[error("invalid match config: {0}")]
    InvalidConfig(String),
}
