//! Codec trait and implementations for serializing views.
//!
//! The core never talks HTTP. It hands views to a hosting web layer, and
//! that layer picks a [`Codec`] to turn them into response bodies. The
//! hosting layer uses the same codec in reverse to read request bodies and
//! catalog documents.
//!
//! Currently we provide [`JsonCodec`], matching the JSON-shaped records the
//! browser clients poll for.

use serde::{Serialize, de::DeserializeOwned};

use crate::ProtocolError;

/// A codec that can encode Rust types to bytes and decode bytes back.
///
/// `Send + Sync + 'static` because a single codec instance is shared by
/// every request handler for the lifetime of the process.
pub trait Codec: Send + Sync + 'static {
    /// Serializes a value into bytes.
    ///
    /// # Errors
    /// Returns `ProtocolError::Encode` if serialization fails.
    fn encode<T: Serialize>(
        &self,
        value: &T,
    ) -> Result<Vec<u8>, ProtocolError>;

    /// Deserializes bytes back into a value.
    ///
    /// # Errors
    /// Returns `ProtocolError::Decode` if the bytes are malformed,
    /// incomplete, or don't match the expected type.
    fn decode<T: DeserializeOwned>(
        &self,
        data: &[u8],
    ) -> Result<T, ProtocolError>;
}

// ---------------------------------------------------------------------------
// JsonCodec
// ---------------------------------------------------------------------------

/// A [`Codec`] that uses JSON (via `serde_json`).
///
/// ## Example
///
/// ```rust
/// use imposter_protocol::{Codec, JsonCodec, RevealCard};
///
/// let codec = JsonCodec;
/// let card = RevealCard {
///     already_viewed: false,
///     is_imposter: false,
///     word: Some("lighthouse".into()),
/// };
///
/// let bytes = codec.encode(&card).unwrap();
/// let decoded: RevealCard = codec.decode(&bytes).unwrap();
/// assert_eq!(card, decoded);
/// ```
#[cfg(feature = "json")]
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonCodec;

#[cfg(feature = "json")]
impl Codec for JsonCodec {
    fn encode<T: Serialize>(
        &self,
        value: &T,
    ) -> Result<Vec<u8>, ProtocolError> {
        serde_json::to_vec(value).map_err(ProtocolError::Encode)
    }

    fn decode<T: DeserializeOwned>(
        &self,
        data: &[u8],
    ) -> Result<T, ProtocolError> {
        serde_json::from_slice(data).map_err(ProtocolError::Decode)
    }
}
