//! The session directory: issues public identifiers and resolves them.

use std::sync::Arc;

use imposter_protocol::{
    JoinCode, PlayerId, PlayerToken, SessionMode, SessionStatus, Slug, UserId,
};
use imposter_store::{
    GameStore, JoinOutcome, NewPlayer, NewSession, PlayerRow, SessionRow,
    StoreError,
};
use rand::RngCore;

use crate::ids::{generate_join_code, generate_slug, generate_token};
use crate::{DirectoryConfig, DirectoryError, Entropy};

/// A session to register, minus the identifiers the directory issues.
///
/// A join code is issued iff `mode` is [`SessionMode::CodeJoined`].
#[derive(Debug, Clone)]
pub struct SessionDraft {
    pub mode: SessionMode,
    pub status: SessionStatus,
    pub categories: Vec<String>,
    pub word: String,
    pub imposter_count: usize,
    pub moderator: Option<UserId>,
}

/// A player to register, minus the token the directory issues.
#[derive(Debug, Clone)]
pub struct PlayerDraft {
    pub name: String,
    pub user: Option<UserId>,
    pub is_imposter: bool,
    pub is_moderator: bool,
}

/// How a client refers to a player: by the secret token from their
/// one-shot link, or by id from a lobby listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlayerRef {
    Id(PlayerId),
    Token(PlayerToken),
}

/// Maps public identifiers to session and player rows.
///
/// Cheap to clone: it holds an `Arc` to the store and a shared handle to
/// the random source.
pub struct SessionDirectory<S, R> {
    store: Arc<S>,
    entropy: Entropy<R>,
    config: DirectoryConfig,
}

impl<S, R> Clone for SessionDirectory<S, R> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            entropy: self.entropy.clone(),
            config: self.config.clone(),
        }
    }
}

impl<S, R> SessionDirectory<S, R>
where
    S: GameStore,
    R: RngCore + Send + 'static,
{
    pub fn new(store: Arc<S>, entropy: Entropy<R>, config: DirectoryConfig) -> Self {
        Self {
            store,
            entropy,
            config,
        }
    }

    pub fn config(&self) -> &DirectoryConfig {
        &self.config
    }

    pub fn entropy(&self) -> &Entropy<R> {
        &self.entropy
    }

    // -- Issuing ------------------------------------------------------------

    /// Inserts a session and its initial roster under freshly issued
    /// identifiers.
    ///
    /// Collisions on slug, join code, or token are an artifact of random
    /// generation, not a user error: the whole batch is regenerated and
    /// retried until the store accepts it.
    pub async fn register_session(
        &self,
        draft: SessionDraft,
        players: Vec<PlayerDraft>,
    ) -> Result<(SessionRow, Vec<PlayerRow>), DirectoryError> {
        loop {
            let (session, new_players) = self
                .entropy
                .with(|rng| {
                    let session = NewSession {
                        slug: generate_slug(rng, self.config.effective_slug_len()),
                        join_code: (draft.mode == SessionMode::CodeJoined)
                            .then(|| generate_join_code(rng)),
                        mode: draft.mode,
                        status: draft.status,
                        categories: draft.categories.clone(),
                        word: draft.word.clone(),
                        imposter_count: draft.imposter_count,
                        moderator: draft.moderator,
                    };
                    let players = players
                        .iter()
                        .map(|p| self.issue_player(rng, p))
                        .collect::<Vec<_>>();
                    (session, players)
                })
                .await;

            match self.store.create_session(session, new_players).await {
                Ok(created) => return Ok(created),
                Err(StoreError::Conflict(field)) => {
                    tracing::debug!(%field, "identifier collision, regenerating");
                }
                Err(e) => return Err(e.into()),
            }
        }
    }

    /// Appends a player to a waiting session under a fresh token,
    /// retrying on token collisions.
    pub async fn register_player(
        &self,
        session: &SessionRow,
        draft: PlayerDraft,
    ) -> Result<JoinOutcome, DirectoryError> {
        loop {
            let player = self.entropy.with(|rng| self.issue_player(rng, &draft)).await;
            match self.store.join_player(session.id, player).await {
                Ok(outcome) => return Ok(outcome),
                Err(StoreError::Conflict(field)) => {
                    tracing::debug!(%field, slug = %session.slug, "token collision, regenerating");
                }
                Err(e) => return Err(e.into()),
            }
        }
    }

    fn issue_player(&self, rng: &mut R, draft: &PlayerDraft) -> NewPlayer {
        NewPlayer {
            name: draft.name.clone(),
            token: generate_token(rng, self.config.effective_token_len()),
            user: draft.user,
            is_imposter: draft.is_imposter,
            is_moderator: draft.is_moderator,
        }
    }

    /// The one-shot link a player opens to reveal their card.
    pub fn player_link(&self, slug: &Slug, token: &PlayerToken) -> String {
        format!(
            "{}/games/{}/players/{}",
            self.config.public_base_url.trim_end_matches('/'),
            slug,
            token.as_str()
        )
    }

    // -- Resolving ----------------------------------------------------------

    /// Resolves a slug to its session.
    pub async fn session(&self, slug: &Slug) -> Result<SessionRow, DirectoryError> {
        self.store
            .session_by_slug(slug)
            .await?
            .ok_or_else(|| DirectoryError::SessionNotFound(slug.to_string()))
    }

    /// Resolves a join code typed by a player, case-insensitively, to a
    /// session that is still accepting players.
    ///
    /// # Errors
    /// - [`DirectoryError::InvalidIdentifier`]: not six letters/digits
    /// - [`DirectoryError::SessionNotFound`]: no session has this code
    /// - [`DirectoryError::NotJoinable`]: the session already started
    pub async fn joinable_session(&self, code: &str) -> Result<SessionRow, DirectoryError> {
        let code = JoinCode::parse(code)?;
        let session = self
            .store
            .session_by_code(&code)
            .await?
            .ok_or_else(|| DirectoryError::SessionNotFound(code.to_string()))?;

        if !session.status.is_joinable() {
            return Err(DirectoryError::NotJoinable(code.to_string()));
        }
        Ok(session)
    }

    /// Resolves a player reference within a session.
    pub async fn player(
        &self,
        session: &SessionRow,
        player: &PlayerRef,
    ) -> Result<PlayerRow, DirectoryError> {
        let found = match player {
            PlayerRef::Id(id) => self.store.player(session.id, *id).await?,
            PlayerRef::Token(token) => self.store.player_by_token(session.id, token).await?,
        };
        found.ok_or_else(|| {
            tracing::warn!(slug = %session.slug, "player reference did not resolve");
            DirectoryError::PlayerNotFound(session.slug.to_string())
        })
    }

    /// Resolves `(slug, player ref)` in one step.
    pub async fn session_and_player(
        &self,
        slug: &Slug,
        player: &PlayerRef,
    ) -> Result<(SessionRow, PlayerRow), DirectoryError> {
        let session = self.session(slug).await?;
        let player = self.player(&session, player).await?;
        Ok((session, player))
    }
}

#[cfg(test)]
mod tests {
    //! Unit tests for `SessionDirectory`, run against `MemoryStore`.

    use imposter_store::MemoryStore;
    use rand::rngs::StdRng;

    use super::*;

    // -- Helpers ----------------------------------------------------------

    fn directory() -> SessionDirectory<MemoryStore, StdRng> {
        SessionDirectory::new(
            Arc::new(MemoryStore::new()),
            Entropy::seeded(1),
            DirectoryConfig {
                public_base_url: "https://party.example/".into(),
                ..DirectoryConfig::default()
            },
        )
    }

    fn code_draft() -> SessionDraft {
        SessionDraft {
            mode: SessionMode::CodeJoined,
            status: SessionStatus::Waiting,
            categories: vec![],
            word: String::new(),
            imposter_count: 0,
            moderator: Some(UserId(1)),
        }
    }

    fn anon_draft() -> SessionDraft {
        SessionDraft {
            mode: SessionMode::AnonymousLink,
            status: SessionStatus::Active,
            categories: vec!["animals".into()],
            word: "otter".into(),
            imposter_count: 1,
            moderator: None,
        }
    }

    fn named(name: &str) -> PlayerDraft {
        PlayerDraft {
            name: name.into(),
            user: None,
            is_imposter: false,
            is_moderator: false,
        }
    }

    // =====================================================================
    // register_session()
    // =====================================================================

    #[tokio::test]
    async fn test_register_session_code_mode_issues_join_code() {
        let dir = directory();
        let (session, _) = dir.register_session(code_draft(), vec![]).await.unwrap();
        assert!(session.join_code.is_some());
        assert_eq!(session.slug.as_str().len(), 10);
    }

    #[tokio::test]
    async fn test_register_session_anonymous_mode_has_no_join_code() {
        let dir = directory();
        let (session, players) = dir
            .register_session(anon_draft(), vec![named("A"), named("B")])
            .await
            .unwrap();
        assert!(session.join_code.is_none());
        assert_eq!(players.len(), 2);
        assert_ne!(players[0].token, players[1].token);
        assert_eq!(players[0].token.as_str().len(), 40);
    }

    #[tokio::test]
    async fn test_register_session_many_sessions_get_distinct_slugs() {
        let dir = directory();
        let mut slugs = std::collections::HashSet::new();
        for _ in 0..50 {
            let (s, _) = dir.register_session(anon_draft(), vec![]).await.unwrap();
            assert!(slugs.insert(s.slug));
        }
    }

    #[tokio::test]
    async fn test_register_session_zero_slug_len_still_issues_unique_slugs() {
        let dir = SessionDirectory::new(
            Arc::new(MemoryStore::new()),
            Entropy::seeded(2),
            DirectoryConfig {
                slug_len: 0,
                ..DirectoryConfig::default()
            },
        );
        let (first, _) = dir.register_session(anon_draft(), vec![]).await.unwrap();
        let (second, _) = dir.register_session(anon_draft(), vec![]).await.unwrap();
        assert_eq!(first.slug.as_str().len(), 8);
        assert_ne!(first.slug, second.slug);
    }

    // =====================================================================
    // joinable_session()
    // =====================================================================

    #[tokio::test]
    async fn test_joinable_session_lowercase_code_resolves() {
        let dir = directory();
        let (session, _) = dir.register_session(code_draft(), vec![]).await.unwrap();
        let typed = session.join_code.as_ref().unwrap().as_str().to_lowercase();

        let found = dir.joinable_session(&typed).await.unwrap();
        assert_eq!(found.id, session.id);
    }

    #[tokio::test]
    async fn test_joinable_session_unknown_code_not_found() {
        let dir = directory();
        let result = dir.joinable_session("ZZZZZZ").await;
        assert!(matches!(result, Err(DirectoryError::SessionNotFound(_))));
    }

    #[tokio::test]
    async fn test_joinable_session_malformed_code_rejected() {
        let dir = directory();
        let result = dir.joinable_session("nope").await;
        assert!(matches!(result, Err(DirectoryError::InvalidIdentifier(_))));
    }

    // =====================================================================
    // player() / player_link()
    // =====================================================================

    #[tokio::test]
    async fn test_player_by_token_and_by_id_agree() {
        let dir = directory();
        let (session, players) = dir
            .register_session(anon_draft(), vec![named("A")])
            .await
            .unwrap();

        let by_token = dir
            .player(&session, &PlayerRef::Token(players[0].token.clone()))
            .await
            .unwrap();
        let by_id = dir.player(&session, &PlayerRef::Id(players[0].id)).await.unwrap();
        assert_eq!(by_token, by_id);
    }

    #[tokio::test]
    async fn test_player_from_other_session_not_found() {
        let dir = directory();
        let (first, players) = dir
            .register_session(anon_draft(), vec![named("A")])
            .await
            .unwrap();
        let (second, _) = dir.register_session(anon_draft(), vec![]).await.unwrap();
        assert_ne!(first.id, second.id);

        let result = dir.player(&second, &PlayerRef::Id(players[0].id)).await;
        assert!(matches!(result, Err(DirectoryError::PlayerNotFound(_))));
    }

    #[tokio::test]
    async fn test_session_unknown_slug_not_found() {
        let dir = directory();
        let result = dir.session(&Slug::new("missing")).await;
        assert!(matches!(result, Err(DirectoryError::SessionNotFound(_))));
    }

    #[test]
    fn test_player_link_trims_trailing_slash() {
        let dir = directory();
        let link = dir.player_link(&Slug::new("abc"), &PlayerToken::new("tok"));
        assert_eq!(link, "https://party.example/games/abc/players/tok");
    }
}
