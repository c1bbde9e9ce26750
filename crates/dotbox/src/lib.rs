//! # dotbox
//!
//! Dots-and-boxes for any number of players, synchronized through a
//! shared match document.
//!
//! The pieces live in separate crates and are re-exported here:
//!
//! - `dotbox-protocol`: the match document, its deltas and key encodings
//! - `dotbox-rules`: grid geometry, square completion, turns, victory and
//!   the computer opponent
//! - `dotbox-sync`: the store contract, an in-memory store and the
//!   [`MatchController`](prelude::MatchController) that ties them together
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use dotbox::prelude::*;
//!
//! # async fn run() -> Result<(), DotboxError> {
//! dotbox::init_tracing();
//!
//! let store = MemoryStore::spawn();
//! let mut game = MatchController::create(
//!     store,
//!     PlayerId::from("ada"),
//!     "Ada",
//!     MatchConfig::default(),
//! )
//! .await?;
//! game.add_ai_player("Orion").await?;
//! game.start().await?;
//! game.draw_line(&PlayerId::from("ada"), Dot::new(0, 0), Dot::new(0, 1)).await?;
//! # Ok(())
//! # }
//! ```

mod error;
mod logging;

pub use error::DotboxError;
pub use logging::init_tracing;

pub use dotbox_protocol as protocol;
pub use dotbox_rules as rules;
pub use dotbox_sync as sync;

pub mod prelude {
    pub use crate::DotboxError;
    pub use dotbox_protocol::{
        AI_PLAYER_ID, Dot, Lifecycle, LineKey, Match, MatchId, MatchSnapshot, MatchUpdate,
        PlayerId, SquareKey,
    };
    pub use dotbox_rules::{Grid, MatchConfig, Outcome, TurnManager, ai};
    pub use dotbox_sync::{
        GameResult, MatchController, MatchStore, MemoryStore, MoveSummary, StatsStore,
        Subscription, UserStats,
    };
}
