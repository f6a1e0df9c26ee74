//! Error types for the storage layer.

use std::fmt;

use imposter_protocol::SessionId;

/// Which uniqueness constraint a write collided with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UniqueField {
    Slug,
    JoinCode,
    Token,
    /// The same external identity twice in one session.
    Membership,
}

impl fmt::Display for UniqueField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Slug => "slug",
            Self::JoinCode => "join code",
            Self::Token => "player token",
            Self::Membership => "session membership",
        };
        f.write_str(name)
    }
}

/// Errors that can occur in a [`GameStore`](crate::GameStore).
///
/// Conditional outcomes (already viewed, not waiting, ...) are NOT errors;
/// they come back as outcome enums. This enum is for writes that could not
/// be applied at all.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// A generated identifier is already taken. Nothing was written;
    /// callers regenerate and try again.
    #[error("{0} already exists")]
    Conflict(UniqueField),

    /// The referenced session does not exist.
    #[error("session {0} not found")]
    SessionNotFound(SessionId),

    /// A stored value could not be mapped back into a row type.
    #[error("corrupt record: {0}")]
    Corrupt(String),

    /// The backend itself failed (I/O, lock poisoning, SQL error).
    #[error("storage backend failed: {0}")]
    Backend(String),
}

#[cfg(feature = "sqlite")]
impl From<rusqlite::Error> for StoreError {
    fn from(err: rusqlite::Error) -> Self {
        Self::Backend(err.to_string())
    }
}
