//! Error types for the directory layer.

use imposter_protocol::ProtocolError;
use imposter_store::StoreError;

/// Errors that can occur while resolving or issuing identifiers.
#[derive(Debug, thiserror::Error)]
pub enum DirectoryError {
    /// No session has this slug or join code.
    #[error("session {0} not found")]
    SessionNotFound(String),

    /// The player reference doesn't belong to this session.
    #[error("player not found in session {0}")]
    PlayerNotFound(String),

    /// The join code is valid but the session has already started.
    #[error("session {0} is no longer accepting players")]
    NotJoinable(String),

    /// The client sent a malformed identifier.
    #[error(transparent)]
    InvalidIdentifier(#[from] ProtocolError),

    #[error(transparent)]
    Store(#[from] StoreError),
}
