//! Rules for dotbox: the pure, synchronous core.
//!
//! Nothing in this crate owns state or performs I/O. Callers hold the
//! lines, scores and roster and pass them in.
//!
//! # Key items
//!
//! - [`grid`]: [`line_key`], [`is_square_complete`],
//!   [`squares_affected_by_line`] and the [`Grid`] model
//! - [`TurnManager`]: turn rotation over a fixed roster
//! - [`victory`]: [`is_game_over`], [`winner`], and the explicit [`Outcome`]
//! - [`ai`]: the computer opponent's line picker
//! - [`MatchConfig`]: board size and player limits

pub mod ai;
mod config;
mod error;
pub mod grid;
mod turn;
pub mod victory;

pub use config::{DEFAULT_GRID_SIZE, MAX_GRID_SIZE, MatchConfig};
pub use error::RulesError;
pub use grid::{Grid, is_square_complete, line_key, squares_affected_by_line};
pub use turn::TurnManager;
pub use victory::{Outcome, is_game_over, outcome, winner};
