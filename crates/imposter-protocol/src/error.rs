//! Error types for the protocol layer.

/// Errors that can occur while encoding views or parsing identifiers.
#[derive(Debug, thiserror::Error)]
pub enum ProtocolError {
    /// Serialization failed (turning a view into bytes).
    #[cfg(feature = "json")]
    #[error("encode failed: {0}")]
    Encode(serde_json::Error),

    /// Deserialization failed (turning bytes into a value).
    ///
    /// Common causes: malformed JSON, missing required fields, or a
    /// category document that isn't a map of string lists.
    #[cfg(feature = "json")]
    #[error("decode failed: {0}")]
    Decode(serde_json::Error),

    /// A client-supplied identifier has the wrong shape, e.g. a join
    /// code that isn't six alphanumeric characters.
    #[error("invalid identifier: {0}")]
    InvalidIdentifier(String),
}
