//! Match synchronization for dotbox.
//!
//! Glues the pure rules in `dotbox-rules` to a shared document store.
//! Any mutation (a player joining, play starting, a line drawn) becomes
//! a [`MatchUpdate`](dotbox_protocol::MatchUpdate) written to the store;
//! snapshots coming back from the store are overlaid on local state.
//!
//! # Key types
//!
//! - [`MatchStore`] / [`StatsStore`]: what a store must provide
//! - [`Subscription`]: a snapshot feed with explicit unsubscribe
//! - [`MemoryStore`]: in-process store running as a Tokio actor
//! - [`MatchController`]: one participant's session state and actions

mod controller;
mod error;
mod memory;
mod stats;
mod store;

pub use controller::{MatchController, MoveSummary};
pub use error::SyncError;
pub use memory::{MIN_ID_LENGTH, MemoryStore, StoreConfig};
pub use stats::{GameResult, UserStats};
pub use store::{MatchStore, StatsStore, Subscription};
