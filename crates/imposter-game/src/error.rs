//! Error types for the game layer.

use imposter_directory::DirectoryError;
use imposter_store::StoreError;

/// Failures a game operation reports to its caller.
///
/// Everything except [`GameError::Store`] is the client's doing: the
/// caller maps it to a message and [`GameError::status_code`] and moves on.
/// The core never retries these.
#[derive(Debug, thiserror::Error)]
pub enum GameError {
    /// The selected categories don't yield enough candidate words.
    /// The player can fix this by selecting more categories.
    #[error("word pool too small: {found} words, need at least {required}")]
    InsufficientPool { found: usize, required: usize },

    /// A slug, join code, token, or player id that doesn't resolve.
    #[error("{0} not found")]
    NotFound(String),

    /// The card can't be revealed yet; the moderator hasn't started.
    #[error("game is not active")]
    GameNotActive,

    /// The session has left `waiting`; it can't be started again.
    #[error("game already started")]
    AlreadyStarted,

    /// The join code is right but the session is no longer waiting.
    #[error("game is no longer accepting players")]
    GameNotJoinable,

    /// This identity already holds a seat in the session.
    #[error("already joined this game")]
    DuplicateParticipant,

    /// Only the session's moderator can do this.
    #[error("only the moderator can do this")]
    NotModerator,

    /// Malformed input: empty names, oversized messages, bad counts.
    #[error("invalid input: {0}")]
    Validation(String),

    /// Too few players to draw imposters from.
    #[error("not enough players: {found} joined, need at least {required}")]
    NotEnoughPlayers { found: usize, required: usize },

    #[error(transparent)]
    Store(#[from] StoreError),
}

impl GameError {
    /// The HTTP status a web layer should answer with.
    pub fn status_code(&self) -> u16 {
        match self {
            GameError::NotFound(_) => 404,
            GameError::GameNotActive
            | GameError::AlreadyStarted
            | GameError::GameNotJoinable
            | GameError::DuplicateParticipant => 409,
            GameError::InsufficientPool { .. }
            | GameError::Validation(_)
            | GameError::NotEnoughPlayers { .. } => 422,
            GameError::NotModerator => 403,
            GameError::Store(StoreError::SessionNotFound(_)) => 404,
            GameError::Store(_) => 500,
        }
    }
}

impl From<DirectoryError> for GameError {
    fn from(err: DirectoryError) -> Self {
        match err {
            DirectoryError::SessionNotFound(what) => GameError::NotFound(format!("session {what}")),
            DirectoryError::PlayerNotFound(slug) => {
                GameError::NotFound(format!("player in session {slug}"))
            }
            DirectoryError::NotJoinable(_) => GameError::GameNotJoinable,
            DirectoryError::InvalidIdentifier(e) => GameError::Validation(e.to_string()),
            DirectoryError::Store(e) => GameError::Store(e),
        }
    }
}
