//! Unified error type for the Imposter crates.

use imposter_game::GameError;
use imposter_protocol::ProtocolError;
use imposter_store::StoreError;

/// Top-level error that wraps all crate-specific errors.
///
/// Directory errors reach callers already translated into
/// [`GameError`] variants, so there is no separate directory case.
#[derive(Debug, thiserror::Error)]
pub enum ImposterError {
    /// A game-rule failure (not found, already started, pool too small).
    #[error(transparent)]
    Game(#[from] GameError),

    /// An encode or decode failure, or a malformed identifier.
    #[error(transparent)]
    Protocol(#[from] ProtocolError),

    /// A storage failure outside any game operation, such as opening the
    /// database.
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl ImposterError {
    /// The HTTP status a web layer should answer with.
    pub fn status_code(&self) -> u16 {
        match self {
            ImposterError::Game(e) => e.status_code(),
            ImposterError::Protocol(ProtocolError::Encode(_)) => 500,
            ImposterError::Protocol(_) => 400,
            ImposterError::Store(_) => 500,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_game_error() {
        let err: ImposterError = GameError::NotModerator.into();
        assert!(matches!(err, ImposterError::Game(GameError::NotModerator)));
        assert_eq!(err.status_code(), 403);
    }

    #[test]
    fn test_from_protocol_error() {
        let err: ImposterError = ProtocolError::InvalidIdentifier("?".into()).into();
        assert!(matches!(err, ImposterError::Protocol(_)));
        assert_eq!(err.status_code(), 400);
    }

    #[test]
    fn test_from_store_error() {
        let err: ImposterError = StoreError::Backend("locked".into()).into();
        assert!(matches!(err, ImposterError::Store(_)));
        assert!(err.to_string().contains("locked"));
        assert_eq!(err.status_code(), 500);
    }

    #[test]
    fn test_transparent_display() {
        let err: ImposterError = GameError::AlreadyStarted.into();
        assert_eq!(err.to_string(), GameError::AlreadyStarted.to_string());
    }
}
