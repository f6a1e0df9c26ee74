//! The `GameStore` trait: the seam between game rules and persistence.

use std::future::Future;

use chrono::{DateTime, Utc};
use imposter_protocol::{JoinCode, PlayerId, PlayerToken, SessionId, Slug};

use crate::{
    JoinOutcome, MessageRow, NewMessage, NewPlayer, NewSession, PlayerRow,
    SessionRow, StartOutcome, StartPlan, StoreError, ViewOutcome,
};

/// Persistent storage for sessions, players, and lobby messages.
///
/// Every method is one transactional unit. The conditional writes are
/// where the concurrency guarantees live: implementations must evaluate
/// the condition and apply the write without any other write to the same
/// session interleaving.
///
/// Methods return `impl Future + Send` so callers can drive them from
/// spawned Tokio tasks. Implementations can still write `async fn`.
pub trait GameStore: Send + Sync + 'static {
    /// Inserts a session and its initial players (positions `0..n` in the
    /// given order) in one unit.
    ///
    /// # Errors
    /// [`StoreError::Conflict`] if the slug, join code, or any token is
    /// taken. Nothing is written in that case.
    fn create_session(
        &self,
        session: NewSession,
        players: Vec<NewPlayer>,
    ) -> impl Future<Output = Result<(SessionRow, Vec<PlayerRow>), StoreError>> + Send;

    fn session(
        &self,
        id: SessionId,
    ) -> impl Future<Output = Result<Option<SessionRow>, StoreError>> + Send;

    fn session_by_slug(
        &self,
        slug: &Slug,
    ) -> impl Future<Output = Result<Option<SessionRow>, StoreError>> + Send;

    /// Looks up by an already-normalized (uppercase) join code.
    fn session_by_code(
        &self,
        code: &JoinCode,
    ) -> impl Future<Output = Result<Option<SessionRow>, StoreError>> + Send;

    /// All players of a session, ordered by position.
    fn players(
        &self,
        session_id: SessionId,
    ) -> impl Future<Output = Result<Vec<PlayerRow>, StoreError>> + Send;

    fn player(
        &self,
        session_id: SessionId,
        player_id: PlayerId,
    ) -> impl Future<Output = Result<Option<PlayerRow>, StoreError>> + Send;

    fn player_by_token(
        &self,
        session_id: SessionId,
        token: &PlayerToken,
    ) -> impl Future<Output = Result<Option<PlayerRow>, StoreError>> + Send;

    /// Appends a player at the next position, if the session is still
    /// waiting and `player.user` (when present) has no seat yet.
    ///
    /// # Errors
    /// [`StoreError::Conflict`] on a token collision,
    /// [`StoreError::SessionNotFound`] for an unknown session.
    fn join_player(
        &self,
        session_id: SessionId,
        player: NewPlayer,
    ) -> impl Future<Output = Result<JoinOutcome, StoreError>> + Send;

    /// Moves a waiting session to active: records the categories, word and
    /// imposter count and stamps `is_imposter` on every non-moderator
    /// player, provided the non-moderator roster equals
    /// `plan.expected_roster`.
    fn start_session(
        &self,
        session_id: SessionId,
        plan: StartPlan,
    ) -> impl Future<Output = Result<StartOutcome, StoreError>> + Send;

    /// Sets `viewed_at = at` only where it is still unset.
    fn mark_viewed(
        &self,
        session_id: SessionId,
        player_id: PlayerId,
        at: DateTime<Utc>,
    ) -> impl Future<Output = Result<ViewOutcome, StoreError>> + Send;

    /// # Errors
    /// [`StoreError::SessionNotFound`] for an unknown session.
    fn append_message(
        &self,
        message: NewMessage,
    ) -> impl Future<Output = Result<MessageRow, StoreError>> + Send;

    /// The newest `limit` messages of a session, oldest first.
    fn recent_messages(
        &self,
        session_id: SessionId,
        limit: usize,
    ) -> impl Future<Output = Result<Vec<MessageRow>, StoreError>> + Send;
}
