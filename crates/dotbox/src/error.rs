//! Unified error type for dotbox.

use dotbox_protocol::ProtocolError;
use dotbox_rules::RulesError;
use dotbox_sync::SyncError;

/// Top-level error that wraps every sub-crate error.
///
/// Using the `dotbox` crate you deal with this single type instead of
/// importing errors from each sub-crate; `?` converts automatically.
#[derive(Debug, thiserror::Error)]
pub enum DotboxError {
    /// Encoding, decoding, bad keys or conflicting deltas.
    #[error(transparent)]
    Protocol(#[from] ProtocolError),

    /// Off-grid lines or a bad configuration.
    #[error(transparent)]
    Rules(#[from] RulesError),

    /// Store failures and rejected actions.
    #[error(transparent)]
    Sync(#[from] SyncError),
}
