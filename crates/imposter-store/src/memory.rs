//! In-memory [`GameStore`] backend.
//!
//! All tables live behind one `tokio::sync::Mutex`. Each trait method takes
//! the lock once, checks its condition, writes, and releases, so every
//! method is trivially atomic with respect to every other.

use std::collections::{BTreeMap, HashMap};

use chrono::{DateTime, Utc};
use imposter_protocol::{
    JoinCode, MessageId, PlayerId, PlayerToken, SessionId, SessionStatus, Slug,
};
use tokio::sync::Mutex;

use crate::{
    GameStore, JoinOutcome, MessageRow, NewMessage, NewPlayer, NewSession,
    PlayerRow, SessionRow, StartOutcome, StartPlan, StoreError, UniqueField,
    ViewOutcome,
};

/// A [`GameStore`] that keeps everything in process memory.
///
/// Data is gone when the process exits. Useful for tests, demos, and
/// hosts that treat a round as disposable.
#[derive(Default)]
pub struct MemoryStore {
    tables: Mutex<Tables>,
}

#[derive(Default)]
struct Tables {
    sessions: BTreeMap<SessionId, SessionRow>,
    /// Per session, player ids in position order.
    rosters: HashMap<SessionId, Vec<PlayerId>>,
    players: HashMap<PlayerId, PlayerRow>,
    messages: HashMap<SessionId, Vec<MessageRow>>,
    slugs: HashMap<Slug, SessionId>,
    codes: HashMap<JoinCode, SessionId>,
    tokens: HashMap<PlayerToken, PlayerId>,
    next_session: u64,
    next_player: u64,
    next_message: u64,
}

impl Tables {
    fn roster(&self, session_id: SessionId) -> Vec<PlayerRow> {
        self.rosters
            .get(&session_id)
            .map(|ids| {
                ids.iter()
                    .filter_map(|id| self.players.get(id).cloned())
                    .collect()
            })
            .unwrap_or_default()
    }

    fn insert_player(
        &mut self,
        session_id: SessionId,
        player: NewPlayer,
    ) -> PlayerRow {
        self.next_player += 1;
        let id = PlayerId(self.next_player);
        let roster = self.rosters.entry(session_id).or_default();
        let row = PlayerRow {
            id,
            session_id,
            name: player.name,
            token: player.token,
            user: player.user,
            position: roster.len(),
            is_imposter: player.is_imposter,
            is_moderator: player.is_moderator,
            viewed_at: None,
        };
        roster.push(id);
        self.tokens.insert(row.token.clone(), id);
        self.players.insert(id, row.clone());
        row
    }
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl GameStore for MemoryStore {
    async fn create_session(
        &self,
        session: NewSession,
        players: Vec<NewPlayer>,
    ) -> Result<(SessionRow, Vec<PlayerRow>), StoreError> {
        let mut tables = self.tables.lock().await;

        // Check every constraint before touching anything.
        if tables.slugs.contains_key(&session.slug) {
            return Err(StoreError::Conflict(UniqueField::Slug));
        }
        if let Some(code) = &session.join_code {
            if tables.codes.contains_key(code) {
                return Err(StoreError::Conflict(UniqueField::JoinCode));
            }
        }
        let mut batch_tokens = std::collections::HashSet::new();
        for player in &players {
            if tables.tokens.contains_key(&player.token)
                || !batch_tokens.insert(&player.token)
            {
                return Err(StoreError::Conflict(UniqueField::Token));
            }
        }

        tables.next_session += 1;
        let id = SessionId(tables.next_session);
        let row = SessionRow {
            id,
            slug: session.slug,
            join_code: session.join_code,
            mode: session.mode,
            status: session.status,
            categories: session.categories,
            word: session.word,
            imposter_count: session.imposter_count,
            moderator: session.moderator,
            created_at: Utc::now(),
        };
        tables.slugs.insert(row.slug.clone(), id);
        if let Some(code) = &row.join_code {
            tables.codes.insert(code.clone(), id);
        }
        tables.rosters.insert(id, Vec::with_capacity(players.len()));
        tables.sessions.insert(id, row.clone());

        let inserted = players
            .into_iter()
            .map(|player| tables.insert_player(id, player))
            .collect();

        Ok((row, inserted))
    }

    async fn session(
        &self,
        id: SessionId,
    ) -> Result<Option<SessionRow>, StoreError> {
        Ok(self.tables.lock().await.sessions.get(&id).cloned())
    }

    async fn session_by_slug(
        &self,
        slug: &Slug,
    ) -> Result<Option<SessionRow>, StoreError> {
        let tables = self.tables.lock().await;
        Ok(tables
            .slugs
            .get(slug)
            .and_then(|id| tables.sessions.get(id))
            .cloned())
    }

    async fn session_by_code(
        &self,
        code: &JoinCode,
    ) -> Result<Option<SessionRow>, StoreError> {
        let tables = self.tables.lock().await;
        Ok(tables
            .codes
            .get(code)
            .and_then(|id| tables.sessions.get(id))
            .cloned())
    }

    async fn players(
        &self,
        session_id: SessionId,
    ) -> Result<Vec<PlayerRow>, StoreError> {
        Ok(self.tables.lock().await.roster(session_id))
    }

    async fn player(
        &self,
        session_id: SessionId,
        player_id: PlayerId,
    ) -> Result<Option<PlayerRow>, StoreError> {
        let tables = self.tables.lock().await;
        Ok(tables
            .players
            .get(&player_id)
            .filter(|p| p.session_id == session_id)
            .cloned())
    }

    async fn player_by_token(
        &self,
        session_id: SessionId,
        token: &PlayerToken,
    ) -> Result<Option<PlayerRow>, StoreError> {
        let tables = self.tables.lock().await;
        Ok(tables
            .tokens
            .get(token)
            .and_then(|id| tables.players.get(id))
            .filter(|p| p.session_id == session_id)
            .cloned())
    }

    async fn join_player(
        &self,
        session_id: SessionId,
        player: NewPlayer,
    ) -> Result<JoinOutcome, StoreError> {
        let mut tables = self.tables.lock().await;

        let status = tables
            .sessions
            .get(&session_id)
            .map(|s| s.status)
            .ok_or(StoreError::SessionNotFound(session_id))?;

        if let Some(user) = player.user {
            let seated = tables
                .roster(session_id)
                .iter()
                .any(|p| p.user == Some(user));
            if seated {
                return Ok(JoinOutcome::AlreadyJoined);
            }
        }
        if !status.is_joinable() {
            return Ok(JoinOutcome::NotWaiting);
        }
        if tables.tokens.contains_key(&player.token) {
            return Err(StoreError::Conflict(UniqueField::Token));
        }

        Ok(JoinOutcome::Joined(tables.insert_player(session_id, player)))
    }

    async fn start_session(
        &self,
        session_id: SessionId,
        plan: StartPlan,
    ) -> Result<StartOutcome, StoreError> {
        let mut tables = self.tables.lock().await;

        let status = tables
            .sessions
            .get(&session_id)
            .map(|s| s.status)
            .ok_or(StoreError::SessionNotFound(session_id))?;
        if !status.can_transition_to(SessionStatus::Active) {
            return Ok(StartOutcome::NotWaiting);
        }

        let current: Vec<PlayerId> = tables
            .roster(session_id)
            .into_iter()
            .filter(|p| !p.is_moderator)
            .map(|p| p.id)
            .collect();
        if current != plan.expected_roster {
            return Ok(StartOutcome::RosterChanged);
        }

        for id in &current {
            if let Some(player) = tables.players.get_mut(id) {
                player.is_imposter = plan.imposters.contains(id);
            }
        }

        let session = tables
            .sessions
            .get_mut(&session_id)
            .ok_or(StoreError::SessionNotFound(session_id))?;
        session.categories = plan.categories;
        session.word = plan.word;
        session.imposter_count = plan.imposter_count;
        session.status = SessionStatus::Active;

        Ok(StartOutcome::Started(session.clone()))
    }

    async fn mark_viewed(
        &self,
        session_id: SessionId,
        player_id: PlayerId,
        at: DateTime<Utc>,
    ) -> Result<ViewOutcome, StoreError> {
        let mut tables = self.tables.lock().await;
        let Some(player) = tables
            .players
            .get_mut(&player_id)
            .filter(|p| p.session_id == session_id)
        else {
            return Ok(ViewOutcome::PlayerMissing);
        };

        if player.viewed_at.is_some() {
            return Ok(ViewOutcome::AlreadyViewed(player.clone()));
        }
        player.viewed_at = Some(at);
        Ok(ViewOutcome::FirstView(player.clone()))
    }

    async fn append_message(
        &self,
        message: NewMessage,
    ) -> Result<MessageRow, StoreError> {
        let mut tables = self.tables.lock().await;
        if !tables.sessions.contains_key(&message.session_id) {
            return Err(StoreError::SessionNotFound(message.session_id));
        }

        tables.next_message += 1;
        let row = MessageRow {
            id: MessageId(tables.next_message),
            session_id: message.session_id,
            sender: message.sender,
            body: message.body,
            created_at: Utc::now(),
        };
        tables
            .messages
            .entry(message.session_id)
            .or_default()
            .push(row.clone());
        Ok(row)
    }

    async fn recent_messages(
        &self,
        session_id: SessionId,
        limit: usize,
    ) -> Result<Vec<MessageRow>, StoreError> {
        let tables = self.tables.lock().await;
        let all = tables
            .messages
            .get(&session_id)
            .map(Vec::as_slice)
            .unwrap_or_default();
        let skip = all.len().saturating_sub(limit);
        Ok(all[skip..].to_vec())
    }
}
