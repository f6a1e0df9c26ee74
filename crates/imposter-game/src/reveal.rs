//! The one-shot card reveal.

use std::sync::Arc;

use chrono::Utc;
use imposter_directory::{PlayerRef, SessionDirectory};
use imposter_protocol::{RevealCard, Slug};
use imposter_store::{GameStore, ViewOutcome};
use rand::RngCore;

use crate::GameError;

/// Hands each player their card exactly once.
///
/// The first reveal stamps `viewed_at` with a compare-and-set in the
/// store; only the caller that wins it sees the word. Every later call,
/// concurrent or not, gets `already_viewed = true` and no word. Imposter
/// status is repeated on every call. Imposters never receive the word.
pub struct RevealGate<S, R> {
    store: Arc<S>,
    directory: SessionDirectory<S, R>,
}

impl<S, R> Clone for RevealGate<S, R> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            directory: self.directory.clone(),
        }
    }
}

impl<S, R> RevealGate<S, R>
where
    S: GameStore,
    R: RngCore + Send + 'static,
{
    pub fn new(store: Arc<S>, directory: SessionDirectory<S, R>) -> Self {
        Self { store, directory }
    }

    /// Reveals `player`'s card in the session at `slug`.
    ///
    /// # Errors
    /// - [`GameError::NotFound`]: unknown slug, or the player isn't in it
    /// - [`GameError::GameNotActive`]: the moderator hasn't started yet
    pub async fn reveal(&self, slug: &Slug, player: &PlayerRef) -> Result<RevealCard, GameError> {
        let (session, player) = self.directory.session_and_player(slug, player).await?;
        if !session.status.is_active() {
            return Err(GameError::GameNotActive);
        }

        match self
            .store
            .mark_viewed(session.id, player.id, Utc::now())
            .await?
        {
            ViewOutcome::FirstView(player) => {
                tracing::info!(
                    session_id = %session.id,
                    player_id = %player.id,
                    "card revealed"
                );
                Ok(RevealCard {
                    already_viewed: false,
                    is_imposter: player.is_imposter,
                    word: (!player.is_imposter).then_some(session.word),
                })
            }
            ViewOutcome::AlreadyViewed(player) => {
                tracing::debug!(
                    session_id = %session.id,
                    player_id = %player.id,
                    "card already revealed"
                );
                Ok(RevealCard {
                    already_viewed: true,
                    is_imposter: player.is_imposter,
                    word: None,
                })
            }
            ViewOutcome::PlayerMissing => Err(GameError::NotFound(format!(
                "player {} in session {}",
                player.id, session.slug
            ))),
        }
    }
}
