//! Error types for the sync layer.

use dotbox_protocol::{LineKey, MatchId, PlayerId, ProtocolError};
use dotbox_rules::RulesError;

/// Errors that can occur while reading, writing or playing a match.
///
/// Store failures are returned to the caller untouched; the controller
/// never applies a delta locally unless the store accepted it.
#[derive(Debug, thiserror::Error)]
pub enum SyncError {
    /// No document exists under this id.
    #[error("match {0} not found")]
    NotFound(MatchId),

    /// The store's command channel is closed (store shut down).
    #[error("match store is unavailable")]
    Unavailable,

    /// The match is in a state that doesn't allow this operation,
    /// e.g. drawing a line in the lobby or joining a running match.
    #[error("invalid match state for this operation: {0}")]
    InvalidState(String),

    /// A player tried to move out of turn.
    #[error("it is not {0}'s turn")]
    NotYourTurn(PlayerId),

    /// The line has already been drawn.
    #[error("line {0} is already drawn")]
    LineTaken(LineKey),

    /// The lobby has reached its player limit.
    #[error("match {0} is full")]
    MatchFull(MatchId),

    /// The move broke a grid rule (out of bounds, not adjacent).
    #[error(transparent)]
    Rules(#[from] RulesError),

    /// The store refused a delta, or a document didn't decode.
    #[error(transparent)]
    Protocol(#[from] ProtocolError),
}
