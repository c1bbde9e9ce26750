//! Error types for the protocol layer.
//!
//! Each crate in dotbox defines its own error enum. A `ProtocolError`
//! means the problem is in the shape of the data (a malformed key, a
//! delta that contradicts the document, bytes that don't decode), not in
//! the game rules or the store.

/// Errors that can occur in the protocol layer.
#[derive(Debug, thiserror::Error)]
pub enum ProtocolError {
    /// Serialization failed (turning a Rust type into bytes).
    #[cfg(feature = "json")]
    #[error("encode failed: {0}")]
    Encode(serde_json::Error),

    /// Deserialization failed (turning bytes into a Rust type).
    ///
    /// Common causes: malformed JSON, missing required fields, or a
    /// line/square key that doesn't parse.
    #[cfg(feature = "json")]
    #[error("decode failed: {0}")]
    Decode(serde_json::Error),

    /// A line or square key string is not in the `r,c` / `r,c-r,c` form.
    #[error("invalid key {0:?}")]
    InvalidKey(String),

    /// A [`MatchUpdate`](crate::MatchUpdate) tried to draw a line or
    /// credit a square that the document already holds.
    ///
    /// Lines and squares are append-only, so the whole update is refused.
    #[error("conflicting update: {0} already present")]
    Conflict(String),
}
