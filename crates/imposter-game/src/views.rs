//! Read-only views polled by lobby, dashboard, and player pages.
//!
//! Polling clients get whatever was last committed; nothing here writes.

use imposter_directory::PlayerRef;
use imposter_protocol::{
    CategoryView, DashboardView, LobbyView, PlayerId, PlayerLobbyView, PlayerView, RosterEntry,
    SessionMode, SessionStatus, SessionView, Slug, UserId,
};
use imposter_store::{GameStore, PlayerRow};
use rand::RngCore;

use crate::{GameError, GameSessions};

fn roster(players: &[PlayerRow], hide_moderators: bool) -> Vec<RosterEntry> {
    players
        .iter()
        .filter(|p| !(hide_moderators && p.is_moderator))
        .map(|p| RosterEntry {
            id: p.id,
            name: p.name.clone(),
            position: p.position,
            has_viewed: p.has_viewed(),
        })
        .collect()
}

impl<S, R> GameSessions<S, R>
where
    S: GameStore,
    R: RngCore + Send + 'static,
{
    /// Every catalog category with its words, in name order.
    pub fn categories(&self) -> Vec<CategoryView> {
        self.catalog.categories()
    }

    /// Public facts about a session. The secret word is never included.
    pub async fn lookup_session(&self, slug: &Slug) -> Result<SessionView, GameError> {
        let session = self.directory.session(slug).await?;
        Ok(SessionView {
            slug: session.slug,
            mode: session.mode,
            status: session.status,
            categories: session.categories,
            join_code: session.join_code,
            imposter_count: session.imposter_count,
        })
    }

    /// A player by id or token, without their role.
    pub async fn lookup_player(
        &self,
        slug: &Slug,
        player: &PlayerRef,
    ) -> Result<PlayerView, GameError> {
        let (_, player) = self.directory.session_and_player(slug, player).await?;
        Ok(PlayerView {
            id: player.id,
            has_viewed: player.has_viewed(),
            position: player.position,
            name: player.name,
        })
    }

    /// The roster in seat order. In code-joined sessions the moderator's
    /// seat is left out.
    pub async fn lobby(&self, slug: &Slug) -> Result<LobbyView, GameError> {
        let session = self.directory.session(slug).await?;
        let players = self.store.players(session.id).await?;
        let hide = session.mode == SessionMode::CodeJoined;
        Ok(LobbyView {
            slug: session.slug,
            status: session.status,
            players: roster(&players, hide),
        })
    }

    /// Everything the moderator sees, including the word once drawn.
    ///
    /// # Errors
    /// [`GameError::NotModerator`] unless `moderator` owns the session.
    pub async fn moderator_dashboard(
        &self,
        slug: &Slug,
        moderator: UserId,
    ) -> Result<DashboardView, GameError> {
        let session = self.directory.session(slug).await?;
        if session.moderator != Some(moderator) {
            return Err(GameError::NotModerator);
        }
        let players = self.store.players(session.id).await?;

        // Before the draw the form suggests a single imposter.
        let imposter_count = match session.status {
            SessionStatus::Waiting => session.imposter_count.max(1),
            _ => session.imposter_count,
        };

        Ok(DashboardView {
            join_code: session.join_code,
            slug: session.slug,
            status: session.status,
            players: roster(&players, true),
            selected_categories: session.categories,
            imposter_count,
            word: session.word,
        })
    }

    /// What a joined player polls while waiting for the moderator.
    ///
    /// Carries the player's own token so the page can link to the reveal
    /// once the status turns `active`.
    pub async fn player_lobby(
        &self,
        slug: &Slug,
        player_id: PlayerId,
    ) -> Result<PlayerLobbyView, GameError> {
        let (session, player) = self
            .directory
            .session_and_player(slug, &PlayerRef::Id(player_id))
            .await?;
        let players = self.store.players(session.id).await?;
        Ok(PlayerLobbyView {
            slug: session.slug,
            player_id: player.id,
            player_name: player.name,
            player_token: player.token,
            players: roster(&players, true),
            status: session.status,
        })
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use imposter_directory::{DirectoryConfig, Entropy, SessionDirectory};
    use imposter_protocol::Identity;
    use imposter_store::MemoryStore;
    use rand::rngs::StdRng;

    use super::*;
    use crate::{GameConfig, WordCatalog};

    fn sessions() -> GameSessions<MemoryStore, StdRng> {
        let store = Arc::new(MemoryStore::new());
        let directory = SessionDirectory::new(
            Arc::clone(&store),
            Entropy::seeded(8),
            DirectoryConfig::default(),
        );
        let catalog = WordCatalog::new()
            .with_category("food", (0..30).map(|i| format!("food{i}")))
            .with_category("sport", ["golf"]);
        GameSessions::new(store, directory, Arc::new(catalog), GameConfig::default())
    }

    async fn lobby_of_three(game: &GameSessions<MemoryStore, StdRng>) -> (Slug, Vec<PlayerId>) {
        let created = game.create_code(Identity::new(UserId(1), "Mod")).await.unwrap();
        let mut ids = Vec::new();
        for (i, name) in ["Ann", "Bo", "Cy"].into_iter().enumerate() {
            let joined = game
                .join(created.join_code.as_str(), Identity::new(UserId(10 + i as u64), name))
                .await
                .unwrap();
            ids.push(joined.player_id);
        }
        (created.slug, ids)
    }

    #[test]
    fn test_categories_in_name_order() {
        let game = sessions();
        let names: Vec<_> = game.categories().into_iter().map(|c| c.name).collect();
        assert_eq!(names, vec!["food", "sport"]);
    }

    #[tokio::test]
    async fn test_lobby_hides_moderator_in_code_mode() {
        let game = sessions();
        let (slug, ids) = lobby_of_three(&game).await;

        let lobby = game.lobby(&slug).await.unwrap();
        assert_eq!(lobby.status, SessionStatus::Waiting);
        let listed: Vec<_> = lobby.players.iter().map(|p| p.id).collect();
        assert_eq!(listed, ids);
        assert_eq!(lobby.players[0].position, 1);
    }

    #[tokio::test]
    async fn test_lobby_anonymous_lists_everyone() {
        let game = sessions();
        let created = game
            .create_anonymous(
                vec!["A".into(), "B".into(), "C".into()],
                vec!["food".into()],
            )
            .await
            .unwrap();
        let lobby = game.lobby(&created.slug).await.unwrap();
        let names: Vec<_> = lobby.players.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["A", "B", "C"]);
        assert!(lobby.players.iter().all(|p| !p.has_viewed));
    }

    #[tokio::test]
    async fn test_moderator_dashboard_defaults_to_one_imposter() {
        let game = sessions();
        let (slug, _) = lobby_of_three(&game).await;
        let dashboard = game.moderator_dashboard(&slug, UserId(1)).await.unwrap();
        assert_eq!(dashboard.imposter_count, 1);
        assert!(dashboard.join_code.is_some());
        assert!(dashboard.word.is_empty());
        assert_eq!(dashboard.players.len(), 3);
    }

    #[tokio::test]
    async fn test_moderator_dashboard_shows_word_after_start() {
        let game = sessions();
        let (slug, _) = lobby_of_three(&game).await;
        let started = game
            .start(&slug, UserId(1), vec!["food".into()], 2)
            .await
            .unwrap();

        let dashboard = game.moderator_dashboard(&slug, UserId(1)).await.unwrap();
        assert_eq!(dashboard.status, SessionStatus::Active);
        assert_eq!(dashboard.word, started.word);
        assert_eq!(dashboard.selected_categories, vec!["food"]);
        assert_eq!(dashboard.imposter_count, 1);
    }

    #[tokio::test]
    async fn test_moderator_dashboard_other_user_rejected() {
        let game = sessions();
        let (slug, _) = lobby_of_three(&game).await;
        let result = game.moderator_dashboard(&slug, UserId(10)).await;
        assert!(matches!(result, Err(GameError::NotModerator)));
    }

    #[tokio::test]
    async fn test_player_lobby_carries_own_token() {
        let game = sessions();
        let (slug, ids) = lobby_of_three(&game).await;

        let view = game.player_lobby(&slug, ids[1]).await.unwrap();
        assert_eq!(view.player_name, "Bo");
        assert_eq!(view.players.len(), 3);

        let by_token = game
            .lookup_player(&slug, &PlayerRef::Token(view.player_token.clone()))
            .await
            .unwrap();
        assert_eq!(by_token.id, ids[1]);
    }

    #[tokio::test]
    async fn test_lookup_session_unknown_slug_not_found() {
        let game = sessions();
        let result = game.lookup_session(&Slug::new("nope")).await;
        assert!(matches!(result, Err(GameError::NotFound(_))));
    }
}
