//! Shared data shapes for dotbox.
//!
//! This crate defines what every participant in a match agrees on:
//!
//! - **Keys** ([`Dot`], [`LineKey`], [`SquareKey`]): canonical,
//!   string-serializable coordinates for lines and boxes.
//! - **Types** ([`Match`], [`MatchUpdate`], [`MatchSnapshot`], ids):
//!   the match document, the deltas written after each move, and the
//!   snapshots received from the store.
//! - **Codec** ([`Codec`] trait, [`JsonCodec`]): bytes in, bytes out.
//! - **Errors** ([`ProtocolError`]).
//!
//! It knows nothing about game rules or stores; those live in
//! `dotbox-rules` and `dotbox-sync`.

mod codec;
mod error;
mod keys;
mod types;

pub use codec::Codec;
#[cfg(feature = "json")]
pub use codec::JsonCodec;
pub use error::ProtocolError;
pub use keys::{Dot, LineKey, Orientation, SquareKey};
pub use types::{
    AI_PLAYER_ID, Lifecycle, Lines, Match, MatchId, MatchSnapshot, MatchUpdate, PlayerId,
    Scores, Squares,
};
