//! The game session service: create, join, and start.
//!
//! A session moves `waiting → active` and, in this version, stays there.
//! The two modes differ only in when that happens:
//!
//! - **anonymous-link**: the creator supplies every name up front. The
//!   word and the single imposter are drawn at creation and the session
//!   is born `active`.
//! - **code-joined**: a moderator opens a `waiting` session, players join
//!   with the short code, and the moderator's start draws the word and
//!   the imposters.
//!
//! Every mutation lands in the store as one conditional write, so two
//! browsers racing on the same session can't corrupt it.

use std::sync::Arc;

use imposter_directory::{Entropy, PlayerDraft, SessionDirectory, SessionDraft};
use imposter_protocol::{
    AnonymousSessionCreated, CodeSessionCreated, Identity, JoinedSession, PlayerId, PlayerLink,
    SessionMode, SessionStarted, SessionStatus, Slug, UserId,
};
use imposter_store::{GameStore, JoinOutcome, StartOutcome, StartPlan, StoreError};
use rand::RngCore;

use crate::{GameConfig, GameError, WordCatalog, assign_imposters};

/// Runs the session state machine on top of a [`GameStore`].
///
/// Cheap to clone; every handle shares the store, the catalog, and the
/// random source.
pub struct GameSessions<S, R> {
    pub(crate) store: Arc<S>,
    pub(crate) directory: SessionDirectory<S, R>,
    pub(crate) entropy: Entropy<R>,
    pub(crate) catalog: Arc<WordCatalog>,
    pub(crate) config: GameConfig,
}

impl<S, R> Clone for GameSessions<S, R> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            directory: self.directory.clone(),
            entropy: self.entropy.clone(),
            catalog: Arc::clone(&self.catalog),
            config: self.config.clone(),
        }
    }
}

impl<S, R> GameSessions<S, R>
where
    S: GameStore,
    R: RngCore + Send + 'static,
{
    pub fn new(
        store: Arc<S>,
        directory: SessionDirectory<S, R>,
        catalog: Arc<WordCatalog>,
        config: GameConfig,
    ) -> Self {
        let entropy = directory.entropy().clone();
        Self {
            store,
            directory,
            entropy,
            catalog,
            config,
        }
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    pub fn catalog(&self) -> &WordCatalog {
        &self.catalog
    }

    // -----------------------------------------------------------------------
    // Anonymous-link mode
    // -----------------------------------------------------------------------

    /// Creates an `active` session for a fixed list of players and returns
    /// each player's one-shot link.
    ///
    /// The word and exactly one imposter are fixed here. Nothing is
    /// persisted unless every check passes.
    ///
    /// # Errors
    /// - [`GameError::NotEnoughPlayers`]: fewer than three names
    /// - [`GameError::Validation`]: a blank or overlong name, or no categories
    /// - [`GameError::InsufficientPool`]: the categories yield too few words
    pub async fn create_anonymous(
        &self,
        names: Vec<String>,
        categories: Vec<String>,
    ) -> Result<AnonymousSessionCreated, GameError> {
        let names = names
            .iter()
            .map(|name| self.validate_name(name))
            .collect::<Result<Vec<_>, _>>()?;
        let min_players = self.config.effective_min_players();
        if names.len() < min_players {
            return Err(GameError::NotEnoughPlayers {
                found: names.len(),
                required: min_players,
            });
        }

        let categories = normalize_categories(categories)?;
        let pool = self.catalog.resolve(&categories, self.config.min_pool_size)?;

        let (word, imposters) = self
            .entropy
            .with(|rng| {
                let word = pool.choose(rng).map(str::to_string);
                (word, assign_imposters(rng, names.len(), 1))
            })
            .await;
        let word = word.ok_or(GameError::InsufficientPool {
            found: 0,
            required: 1,
        })?;

        let drafts = names
            .into_iter()
            .enumerate()
            .map(|(position, name)| PlayerDraft {
                name,
                user: None,
                is_imposter: imposters.contains(&position),
                is_moderator: false,
            })
            .collect();

        let draft = SessionDraft {
            mode: SessionMode::AnonymousLink,
            status: SessionStatus::Active,
            categories,
            word,
            imposter_count: imposters.len(),
            moderator: None,
        };
        let (session, players) = self.directory.register_session(draft, drafts).await?;

        tracing::info!(
            session_id = %session.id,
            slug = %session.slug,
            players = players.len(),
            "anonymous session created"
        );

        let players = players
            .iter()
            .map(|p| PlayerLink {
                name: p.name.clone(),
                url: self.directory.player_link(&session.slug, &p.token),
            })
            .collect();

        Ok(AnonymousSessionCreated {
            slug: session.slug,
            players,
        })
    }

    // -----------------------------------------------------------------------
    // Code-joined mode
    // -----------------------------------------------------------------------

    /// Opens a `waiting` session owned by `moderator`.
    ///
    /// The moderator takes seat 0 so they can't also join as a player.
    pub async fn create_code(
        &self,
        moderator: Identity,
    ) -> Result<CodeSessionCreated, GameError> {
        let name = self.validate_name(&moderator.name)?;

        let draft = SessionDraft {
            mode: SessionMode::CodeJoined,
            status: SessionStatus::Waiting,
            categories: Vec::new(),
            word: String::new(),
            imposter_count: 0,
            moderator: Some(moderator.user),
        };
        let seat = PlayerDraft {
            name,
            user: Some(moderator.user),
            is_imposter: false,
            is_moderator: true,
        };
        let (session, _) = self.directory.register_session(draft, vec![seat]).await?;

        let join_code = session.join_code.ok_or_else(|| {
            StoreError::Corrupt(format!("code session {} has no join code", session.id))
        })?;

        tracing::info!(
            session_id = %session.id,
            slug = %session.slug,
            moderator = %moderator.user,
            "code session created"
        );

        Ok(CodeSessionCreated {
            slug: session.slug,
            join_code,
        })
    }

    /// Seats `identity` in the waiting session behind `code`.
    ///
    /// The code is matched case-insensitively.
    ///
    /// # Errors
    /// - [`GameError::NotFound`]: no session has this code
    /// - [`GameError::GameNotJoinable`]: the session already started
    /// - [`GameError::DuplicateParticipant`]: `identity` already has a seat
    pub async fn join(
        &self,
        code: &str,
        identity: Identity,
    ) -> Result<JoinedSession, GameError> {
        let name = self.validate_name(&identity.name)?;
        let session = self.directory.joinable_session(code).await?;

        let draft = PlayerDraft {
            name,
            user: Some(identity.user),
            is_imposter: false,
            is_moderator: false,
        };
        match self.directory.register_player(&session, draft).await? {
            JoinOutcome::Joined(player) => {
                tracing::info!(
                    session_id = %session.id,
                    player_id = %player.id,
                    position = player.position,
                    "player joined"
                );
                Ok(JoinedSession {
                    player_id: player.id,
                    slug: session.slug,
                })
            }
            JoinOutcome::NotWaiting => {
                tracing::debug!(session_id = %session.id, "join lost race with start");
                Err(GameError::GameNotJoinable)
            }
            JoinOutcome::AlreadyJoined => Err(GameError::DuplicateParticipant),
        }
    }

    /// Draws the word and the imposters and moves the session to `active`.
    ///
    /// The draw is made against the roster as read; if a player joins
    /// before the draw is written, the store refuses it and the draw is
    /// repeated over the new roster. Every seated player therefore gets an
    /// imposter determination and nobody counted in a draw is left out.
    ///
    /// # Errors
    /// - [`GameError::NotModerator`]: `moderator` doesn't own the session
    /// - [`GameError::Validation`]: no categories, or `requested` outside `1..=5`
    /// - [`GameError::AlreadyStarted`]: the session isn't waiting
    /// - [`GameError::InsufficientPool`]: the categories yield too few words
    /// - [`GameError::NotEnoughPlayers`]: fewer than three players joined
    pub async fn start(
        &self,
        slug: &Slug,
        moderator: UserId,
        categories: Vec<String>,
        requested: usize,
    ) -> Result<SessionStarted, GameError> {
        let session = self.directory.session(slug).await?;
        if session.moderator != Some(moderator) {
            tracing::warn!(%slug, user = %moderator, "start attempted by non-moderator");
            return Err(GameError::NotModerator);
        }
        if !(1..=self.config.max_requested_imposters).contains(&requested) {
            return Err(GameError::Validation(format!(
                "imposter count must be between 1 and {}",
                self.config.max_requested_imposters
            )));
        }
        let categories = normalize_categories(categories)?;
        if !session.status.is_joinable() {
            return Err(GameError::AlreadyStarted);
        }
        let pool = self.catalog.resolve(&categories, self.config.min_pool_size)?;

        loop {
            let roster: Vec<PlayerId> = self
                .store
                .players(session.id)
                .await?
                .into_iter()
                .filter(|p| !p.is_moderator)
                .map(|p| p.id)
                .collect();
            let min_players = self.config.effective_min_players();
            if roster.len() < min_players {
                return Err(GameError::NotEnoughPlayers {
                    found: roster.len(),
                    required: min_players,
                });
            }

            let (word, positions) = self
                .entropy
                .with(|rng| {
                    let word = pool.choose(rng).map(str::to_string);
                    (word, assign_imposters(rng, roster.len(), requested))
                })
                .await;
            let word = word.ok_or(GameError::InsufficientPool {
                found: 0,
                required: 1,
            })?;

            let plan = StartPlan {
                categories: categories.clone(),
                word: word.clone(),
                imposter_count: positions.len(),
                imposters: positions.iter().map(|&i| roster[i]).collect(),
                expected_roster: roster,
            };
            let imposter_count = plan.imposter_count;

            match self.store.start_session(session.id, plan).await? {
                StartOutcome::Started(started) => {
                    tracing::info!(
                        session_id = %started.id,
                        slug = %started.slug,
                        imposter_count,
                        "session started"
                    );
                    return Ok(SessionStarted {
                        word,
                        imposter_count,
                    });
                }
                StartOutcome::NotWaiting => return Err(GameError::AlreadyStarted),
                StartOutcome::RosterChanged => {
                    tracing::debug!(session_id = %session.id, "roster changed during start, redrawing");
                }
            }
        }
    }

    // -----------------------------------------------------------------------
    // Helpers
    // -----------------------------------------------------------------------

    fn validate_name(&self, name: &str) -> Result<String, GameError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(GameError::Validation("player name is required".into()));
        }
        if name.chars().count() > self.config.max_player_name_len {
            return Err(GameError::Validation(format!(
                "player name longer than {} characters",
                self.config.max_player_name_len
            )));
        }
        Ok(name.to_string())
    }
}

/// Trims, drops blanks, and removes repeats, keeping first-seen order.
pub(crate) fn normalize_categories(categories: Vec<String>) -> Result<Vec<String>, GameError> {
    let mut selected: Vec<String> = Vec::with_capacity(categories.len());
    for name in categories {
        let name = name.trim();
        if !name.is_empty() && !selected.iter().any(|s| s == name) {
            selected.push(name.to_string());
        }
    }
    if selected.is_empty() {
        return Err(GameError::Validation("select at least one category".into()));
    }
    Ok(selected)
}

#[cfg(test)]
mod tests {
    use imposter_directory::DirectoryConfig;
    use imposter_store::MemoryStore;
    use rand::rngs::StdRng;

    use super::*;

    // -- Helpers ----------------------------------------------------------

    fn catalog() -> WordCatalog {
        WordCatalog::new()
            .with_category("animals", (0..20).map(|i| format!("animal{i}")))
            .with_category("places", (0..15).map(|i| format!("place{i}")))
            .with_category("tiny", ["one", "two"])
    }

    fn sessions() -> GameSessions<MemoryStore, StdRng> {
        let store = Arc::new(MemoryStore::new());
        let directory = SessionDirectory::new(
            Arc::clone(&store),
            Entropy::seeded(5),
            DirectoryConfig::default(),
        );
        GameSessions::new(store, directory, Arc::new(catalog()), GameConfig::default())
    }

    fn names(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    fn both() -> Vec<String> {
        names(&["animals", "places"])
    }

    async fn waiting_with(game: &GameSessions<MemoryStore, StdRng>, joiners: u64) -> Slug {
        let created = game.create_code(Identity::new(UserId(1), "Mod")).await.unwrap();
        for i in 0..joiners {
            game.join(
                created.join_code.as_str(),
                Identity::new(UserId(100 + i), format!("P{i}")),
            )
            .await
            .unwrap();
        }
        created.slug
    }

    // =====================================================================
    // create_anonymous()
    // =====================================================================

    #[tokio::test]
    async fn test_create_anonymous_three_players_one_imposter() {
        let game = sessions();
        let created = game
            .create_anonymous(names(&["A", "B", "C"]), both())
            .await
            .unwrap();
        assert_eq!(created.players.len(), 3);

        let session = game.directory.session(&created.slug).await.unwrap();
        assert_eq!(session.status, SessionStatus::Active);
        assert_eq!(session.imposter_count, 1);
        assert!(!session.word.is_empty());

        let players = game.store.players(session.id).await.unwrap();
        assert_eq!(players.iter().filter(|p| p.is_imposter).count(), 1);
    }

    #[tokio::test]
    async fn test_create_anonymous_two_players_rejected() {
        let game = sessions();
        let result = game.create_anonymous(names(&["A", "B"]), both()).await;
        assert!(matches!(
            result,
            Err(GameError::NotEnoughPlayers { found: 2, required: 3 })
        ));
    }

    #[tokio::test]
    async fn test_create_anonymous_low_min_players_config_still_needs_three() {
        let store = Arc::new(MemoryStore::new());
        let directory = SessionDirectory::new(
            Arc::clone(&store),
            Entropy::seeded(5),
            DirectoryConfig::default(),
        );
        let config = GameConfig {
            min_players: 1,
            ..GameConfig::default()
        };
        let game = GameSessions::new(store, directory, Arc::new(catalog()), config);

        let result = game.create_anonymous(names(&["A", "B"]), both()).await;
        assert!(matches!(
            result,
            Err(GameError::NotEnoughPlayers { found: 2, required: 3 })
        ));
    }

    #[tokio::test]
    async fn test_create_anonymous_blank_name_rejected() {
        let game = sessions();
        let result = game.create_anonymous(names(&["A", "  ", "C"]), both()).await;
        assert!(matches!(result, Err(GameError::Validation(_))));
    }

    #[tokio::test]
    async fn test_create_anonymous_overlong_name_rejected() {
        let game = sessions();
        let long = "x".repeat(101);
        let result = game
            .create_anonymous(vec!["A".into(), "B".into(), long], both())
            .await;
        assert!(matches!(result, Err(GameError::Validation(_))));
    }

    #[tokio::test]
    async fn test_create_anonymous_small_pool_persists_nothing() {
        let game = sessions();
        let result = game
            .create_anonymous(names(&["A", "B", "C"]), names(&["animals", "tiny"]))
            .await;
        assert!(matches!(
            result,
            Err(GameError::InsufficientPool { found: 22, required: 30 })
        ));
        // No session was written: the first id is still unused.
        let first = game.store.session(imposter_protocol::SessionId(1)).await.unwrap();
        assert!(first.is_none());
    }

    #[tokio::test]
    async fn test_create_anonymous_no_categories_rejected() {
        let game = sessions();
        let result = game
            .create_anonymous(names(&["A", "B", "C"]), names(&[" ", ""]))
            .await;
        assert!(matches!(result, Err(GameError::Validation(_))));
    }

    // =====================================================================
    // create_code() / join()
    // =====================================================================

    #[tokio::test]
    async fn test_create_code_seats_moderator_at_zero() {
        let game = sessions();
        let created = game.create_code(Identity::new(UserId(1), "Mod")).await.unwrap();
        let session = game.directory.session(&created.slug).await.unwrap();
        assert_eq!(session.status, SessionStatus::Waiting);
        assert!(session.word.is_empty());

        let players = game.store.players(session.id).await.unwrap();
        assert_eq!(players.len(), 1);
        assert!(players[0].is_moderator);
        assert_eq!(players[0].position, 0);
    }

    #[tokio::test]
    async fn test_join_assigns_next_positions() {
        let game = sessions();
        let created = game.create_code(Identity::new(UserId(1), "Mod")).await.unwrap();
        let code = created.join_code.as_str().to_lowercase();

        let a = game.join(&code, Identity::new(UserId(2), "Ann")).await.unwrap();
        let b = game.join(&code, Identity::new(UserId(3), "Bo")).await.unwrap();
        assert_eq!(a.slug, created.slug);

        let session = game.directory.session(&created.slug).await.unwrap();
        let players = game.store.players(session.id).await.unwrap();
        let order: Vec<_> = players.iter().map(|p| (p.id, p.position)).collect();
        assert_eq!(order[1..], [(a.player_id, 1), (b.player_id, 2)]);
    }

    #[tokio::test]
    async fn test_join_twice_is_duplicate() {
        let game = sessions();
        let created = game.create_code(Identity::new(UserId(1), "Mod")).await.unwrap();
        let code = created.join_code.as_str();
        game.join(code, Identity::new(UserId(2), "Ann")).await.unwrap();

        let again = game.join(code, Identity::new(UserId(2), "Ann")).await;
        assert!(matches!(again, Err(GameError::DuplicateParticipant)));
    }

    #[tokio::test]
    async fn test_join_moderator_is_duplicate() {
        let game = sessions();
        let created = game.create_code(Identity::new(UserId(1), "Mod")).await.unwrap();
        let result = game
            .join(created.join_code.as_str(), Identity::new(UserId(1), "Mod"))
            .await;
        assert!(matches!(result, Err(GameError::DuplicateParticipant)));
    }

    #[tokio::test]
    async fn test_join_unknown_code_not_found() {
        let game = sessions();
        let result = game.join("QQQQQQ", Identity::new(UserId(2), "Ann")).await;
        assert!(matches!(result, Err(GameError::NotFound(_))));
    }

    // =====================================================================
    // start()
    // =====================================================================

    #[tokio::test]
    async fn test_start_stamps_imposters_and_activates() {
        let game = sessions();
        let slug = waiting_with(&game, 12).await;

        let started = game.start(&slug, UserId(1), both(), 5).await.unwrap();
        assert_eq!(started.imposter_count, 3);
        assert!(started.word.starts_with("animal") || started.word.starts_with("place"));

        let session = game.directory.session(&slug).await.unwrap();
        assert_eq!(session.status, SessionStatus::Active);
        assert_eq!(session.word, started.word);
        assert_eq!(session.categories, both());

        let players = game.store.players(session.id).await.unwrap();
        assert_eq!(players.iter().filter(|p| p.is_imposter).count(), 3);
        assert!(players.iter().filter(|p| p.is_moderator).all(|p| !p.is_imposter));
    }

    #[tokio::test]
    async fn test_start_by_other_user_not_moderator() {
        let game = sessions();
        let slug = waiting_with(&game, 3).await;
        let result = game.start(&slug, UserId(100), both(), 1).await;
        assert!(matches!(result, Err(GameError::NotModerator)));
    }

    #[tokio::test]
    async fn test_start_requested_out_of_range_rejected() {
        let game = sessions();
        let slug = waiting_with(&game, 3).await;
        for requested in [0, 6] {
            let result = game.start(&slug, UserId(1), both(), requested).await;
            assert!(matches!(result, Err(GameError::Validation(_))));
        }
    }

    #[tokio::test]
    async fn test_start_small_pool_leaves_session_waiting() {
        let game = sessions();
        let slug = waiting_with(&game, 3).await;
        let result = game.start(&slug, UserId(1), names(&["tiny"]), 1).await;
        assert!(matches!(result, Err(GameError::InsufficientPool { .. })));

        let session = game.directory.session(&slug).await.unwrap();
        assert_eq!(session.status, SessionStatus::Waiting);
        assert!(session.word.is_empty());
    }

    #[tokio::test]
    async fn test_start_two_players_not_enough() {
        let game = sessions();
        let slug = waiting_with(&game, 2).await;
        let result = game.start(&slug, UserId(1), both(), 1).await;
        assert!(matches!(
            result,
            Err(GameError::NotEnoughPlayers { found: 2, required: 3 })
        ));
    }

    #[tokio::test]
    async fn test_start_anonymous_session_not_moderator() {
        let game = sessions();
        let created = game
            .create_anonymous(names(&["A", "B", "C"]), both())
            .await
            .unwrap();
        let result = game.start(&created.slug, UserId(1), both(), 1).await;
        assert!(matches!(result, Err(GameError::NotModerator)));
    }

    #[test]
    fn test_normalize_categories_trims_and_dedupes() {
        let selected =
            normalize_categories(vec![" animals".into(), "places".into(), "animals ".into()])
                .unwrap();
        assert_eq!(selected, vec!["animals", "places"]);
    }
}
