//! Codec trait and implementations for turning match data into bytes.
//!
//! Store adapters that talk to a real document service need bytes on the
//! wire. The rest of dotbox only deals in [`Match`](crate::Match) and
//! [`MatchUpdate`](crate::MatchUpdate), so serialization sits behind the
//! [`Codec`] trait and adapters pick an implementation.

use serde::{de::DeserializeOwned, Serialize};

use crate::ProtocolError;

/// Encodes Rust values to bytes and back.
///
/// `Send + Sync + 'static` so a codec can live inside a long-running
/// store task.
pub trait Codec: Send + Sync + 'static {
    /// Serializes a value into bytes.
    ///
    /// # Errors
    /// Returns `ProtocolError::Encode` if serialization fails.
    fn encode<T: Serialize>(&self, value: &T) -> Result<Vec<u8>, ProtocolError>;

    /// Deserializes bytes back into a value.
    ///
    /// # Errors
    /// Returns `ProtocolError::Decode` if the bytes are malformed or
    /// don't match the expected type (including unparseable line keys).
    fn decode<T: DeserializeOwned>(&self, data: &[u8]) -> Result<T, ProtocolError>;
}

// ---------------------------------------------------------------------------
// JsonCodec
// ---------------------------------------------------------------------------

/// A [`Codec`] that uses JSON (via `serde_json`).
///
/// JSON matches the document shape used by hosted stores, where line
/// keys such as `"0,0-0,1"` appear verbatim as object keys.
///
/// ## Example
///
/// ```rust
/// use dotbox_protocol::{Codec, JsonCodec, Match, PlayerId};
///
/// let codec = JsonCodec;
/// let lobby = Match::new_lobby(PlayerId::from("p1"), "Ada", 3);
///
/// let bytes = codec.encode(&lobby).unwrap();
/// let decoded: Match = codec.decode(&bytes).unwrap();
/// assert_eq!(lobby, decoded);
/// ```
#[cfg(feature = "json")]
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonCodec;

#[cfg(feature = "json")]
impl Codec for JsonCodec {
    fn encode<T: Serialize>(&self, value: &T) -> Result<Vec<u8>, ProtocolError> {
        serde_json::to_vec(value).map_err(ProtocolError::Encode)
    }

    fn decode<T: DeserializeOwned>(&self, data: &[u8]) -> Result<T, ProtocolError> {
        serde_json::from_slice(data).map_err(ProtocolError::Decode)
    }
}
