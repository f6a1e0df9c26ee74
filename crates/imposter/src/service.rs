//! The [`Imposter`] facade and its builder.
//!
//! This is the entry point for a hosting web layer. It ties the layers
//! together (store → directory → game) and exposes one method per
//! operation, each returning [`ImposterError`].

use std::path::Path;
use std::sync::Arc;

use imposter_directory::{Entropy, PlayerRef, SessionDirectory};
use imposter_game::{GameSessions, LobbyMessaging, RevealGate, WordCatalog};
use imposter_protocol::{
    AnonymousSessionCreated, CategoryView, ChatMessageView, Codec, CodeSessionCreated,
    DashboardView, Identity, JoinedSession, JsonCodec, LobbyView, PlayerId, PlayerLobbyView,
    PlayerView, RevealCard, SessionStarted, SessionView, Slug, UserId,
};
use imposter_store::{GameStore, MemoryStore, SqliteStore};
use rand::RngCore;
use rand::rngs::StdRng;
use serde::Serialize;

use crate::{ImposterConfig, ImposterError};

/// Builder for configuring an [`Imposter`].
///
/// # Example
///
/// ```rust
/// use imposter::prelude::*;
///
/// let game = Imposter::builder()
///     .catalog(WordCatalog::new().with_category("fruit", ["fig", "lime"]))
///     .config(ImposterConfig::default())
///     .build(MemoryStore::new());
/// assert_eq!(game.categories().len(), 1);
/// ```
#[derive(Debug, Clone, Default)]
pub struct ImposterBuilder {
    catalog: WordCatalog,
    config: ImposterConfig,
}

impl ImposterBuilder {
    /// Creates a builder with an empty catalog and default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the word catalog sessions draw from.
    pub fn catalog(mut self, catalog: WordCatalog) -> Self {
        self.catalog = catalog;
        self
    }

    /// Sets game limits and directory settings.
    pub fn config(mut self, config: ImposterConfig) -> Self {
        self.config = config;
        self
    }

    /// Builds over `store` with a generator seeded from the OS.
    pub fn build<S: GameStore>(self, store: S) -> Imposter<S, StdRng> {
        self.build_with_entropy(store, Entropy::from_os())
    }

    /// Builds over a SQLite database file, creating it if needed.
    pub fn build_sqlite(
        self,
        path: impl AsRef<Path>,
    ) -> Result<Imposter<SqliteStore, StdRng>, ImposterError> {
        let store = SqliteStore::open(path.as_ref())?;
        Ok(self.build(store))
    }

    /// Builds over `store` with a caller-supplied generator.
    ///
    /// Seeded generators make a whole game reproducible, identifiers and
    /// imposter draws included.
    pub fn build_with_entropy<S, R>(self, store: S, entropy: Entropy<R>) -> Imposter<S, R>
    where
        S: GameStore,
        R: RngCore + Send + 'static,
    {
        let store = Arc::new(store);
        let directory = SessionDirectory::new(Arc::clone(&store), entropy, self.config.directory);
        let game = self.config.game;

        tracing::debug!(categories = self.catalog.len(), "imposter built");

        Imposter {
            sessions: GameSessions::new(
                Arc::clone(&store),
                directory.clone(),
                Arc::new(self.catalog),
                game.clone(),
            ),
            reveals: RevealGate::new(Arc::clone(&store), directory.clone()),
            chat: LobbyMessaging::new(store, directory, game),
            codec: JsonCodec,
        }
    }
}

/// The game coordinator.
///
/// Every method is one self-contained request: resolve identifiers, run
/// the rule, commit one atomic write. Clones share all state, so a host
/// can hand one to every request handler.
pub struct Imposter<S = MemoryStore, R = StdRng> {
    sessions: GameSessions<S, R>,
    reveals: RevealGate<S, R>,
    chat: LobbyMessaging<S, R>,
    codec: JsonCodec,
}

impl<S, R> Clone for Imposter<S, R> {
    fn clone(&self) -> Self {
        Self {
            sessions: self.sessions.clone(),
            reveals: self.reveals.clone(),
            chat: self.chat.clone(),
            codec: self.codec,
        }
    }
}

impl Imposter {
    /// Creates a new builder.
    pub fn builder() -> ImposterBuilder {
        ImposterBuilder::new()
    }
}

impl<S, R> Imposter<S, R>
where
    S: GameStore,
    R: RngCore + Send + 'static,
{
    // -- Sessions -----------------------------------------------------------

    /// Creates an `active` session for the given names (at least three)
    /// and returns each player's one-shot link.
    pub async fn create_anonymous_session(
        &self,
        names: Vec<String>,
        categories: Vec<String>,
    ) -> Result<AnonymousSessionCreated, ImposterError> {
        Ok(self.sessions.create_anonymous(names, categories).await?)
    }

    /// Opens a `waiting` session owned by `moderator` and returns its
    /// join code.
    pub async fn create_code_session(
        &self,
        moderator: Identity,
    ) -> Result<CodeSessionCreated, ImposterError> {
        Ok(self.sessions.create_code(moderator).await?)
    }

    /// Seats `identity` in the waiting session behind `code`.
    pub async fn join_code_session(
        &self,
        code: &str,
        identity: Identity,
    ) -> Result<JoinedSession, ImposterError> {
        Ok(self.sessions.join(code, identity).await?)
    }

    /// Draws the word and imposters for a waiting session.
    pub async fn start_code_session(
        &self,
        slug: &Slug,
        moderator: UserId,
        categories: Vec<String>,
        imposters: usize,
    ) -> Result<SessionStarted, ImposterError> {
        Ok(self
            .sessions
            .start(slug, moderator, categories, imposters)
            .await?)
    }

    // -- Cards and chat -----------------------------------------------------

    /// Reveals a player's card. Only the first call carries the word.
    pub async fn reveal(&self, slug: &Slug, player: &PlayerRef) -> Result<RevealCard, ImposterError> {
        Ok(self.reveals.reveal(slug, player).await?)
    }

    pub async fn post_message(
        &self,
        slug: &Slug,
        sender: Option<&str>,
        body: &str,
    ) -> Result<ChatMessageView, ImposterError> {
        Ok(self.chat.post(slug, sender, body).await?)
    }

    /// The most recent messages, oldest first.
    pub async fn list_messages(&self, slug: &Slug) -> Result<Vec<ChatMessageView>, ImposterError> {
        Ok(self.chat.list(slug).await?)
    }

    // -- Views --------------------------------------------------------------

    pub fn categories(&self) -> Vec<CategoryView> {
        self.sessions.categories()
    }

    pub async fn lookup_session(&self, slug: &Slug) -> Result<SessionView, ImposterError> {
        Ok(self.sessions.lookup_session(slug).await?)
    }

    pub async fn lookup_player(
        &self,
        slug: &Slug,
        player: &PlayerRef,
    ) -> Result<PlayerView, ImposterError> {
        Ok(self.sessions.lookup_player(slug, player).await?)
    }

    pub async fn lobby(&self, slug: &Slug) -> Result<LobbyView, ImposterError> {
        Ok(self.sessions.lobby(slug).await?)
    }

    pub async fn moderator_dashboard(
        &self,
        slug: &Slug,
        moderator: UserId,
    ) -> Result<DashboardView, ImposterError> {
        Ok(self.sessions.moderator_dashboard(slug, moderator).await?)
    }

    pub async fn player_lobby(
        &self,
        slug: &Slug,
        player_id: PlayerId,
    ) -> Result<PlayerLobbyView, ImposterError> {
        Ok(self.sessions.player_lobby(slug, player_id).await?)
    }

    // -- Encoding -----------------------------------------------------------

    /// Encodes any view as a JSON response body.
    pub fn to_json<T: Serialize>(&self, view: &T) -> Result<Vec<u8>, ImposterError> {
        Ok(self.codec.encode(view)?)
    }
}
