//! Row types and conditional-write outcomes.
//!
//! Rows are the store's view of the world and are distinct from the
//! protocol views: a [`PlayerRow`] carries the token and imposter flag,
//! which must never leak into a lobby listing.

use chrono::{DateTime, Utc};
use imposter_protocol::{
    JoinCode, MessageId, PlayerId, PlayerToken, SessionId, SessionMode,
    SessionStatus, Slug, UserId,
};

// ---------------------------------------------------------------------------
// Sessions
// ---------------------------------------------------------------------------

/// A stored game session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionRow {
    pub id: SessionId,
    pub slug: Slug,
    pub join_code: Option<JoinCode>,
    pub mode: SessionMode,
    pub status: SessionStatus,
    /// Selected category names, in selection order, no repeats.
    pub categories: Vec<String>,
    /// Empty until assigned.
    pub word: String,
    pub imposter_count: usize,
    /// Present only for code-joined sessions.
    pub moderator: Option<UserId>,
    pub created_at: DateTime<Utc>,
}

/// Everything needed to insert a session. The store assigns the id.
#[derive(Debug, Clone)]
pub struct NewSession {
    pub slug: Slug,
    pub join_code: Option<JoinCode>,
    pub mode: SessionMode,
    pub status: SessionStatus,
    pub categories: Vec<String>,
    pub word: String,
    pub imposter_count: usize,
    pub moderator: Option<UserId>,
}

// ---------------------------------------------------------------------------
// Players
// ---------------------------------------------------------------------------

/// A stored player.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlayerRow {
    pub id: PlayerId,
    pub session_id: SessionId,
    pub name: String,
    pub token: PlayerToken,
    pub user: Option<UserId>,
    /// 0-based join/assignment order within the session.
    pub position: usize,
    pub is_imposter: bool,
    pub is_moderator: bool,
    /// Set at most once, by [`GameStore::mark_viewed`](crate::GameStore::mark_viewed).
    pub viewed_at: Option<DateTime<Utc>>,
}

impl PlayerRow {
    pub fn has_viewed(&self) -> bool {
        self.viewed_at.is_some()
    }
}

/// A player to insert. Positions are assigned by the store.
#[derive(Debug, Clone)]
pub struct NewPlayer {
    pub name: String,
    pub token: PlayerToken,
    pub user: Option<UserId>,
    pub is_imposter: bool,
    pub is_moderator: bool,
}

// ---------------------------------------------------------------------------
// Messages
// ---------------------------------------------------------------------------

/// A stored lobby chat message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageRow {
    pub id: MessageId,
    pub session_id: SessionId,
    pub sender: String,
    pub body: String,
    pub created_at: DateTime<Utc>,
}

/// A message to append. Validation happens before it reaches the store.
#[derive(Debug, Clone)]
pub struct NewMessage {
    pub session_id: SessionId,
    pub sender: String,
    pub body: String,
}

// ---------------------------------------------------------------------------
// Conditional writes
// ---------------------------------------------------------------------------

/// The result of drawing a word and imposters for a waiting session.
///
/// `expected_roster` is the non-moderator roster (by position) the draw
/// was computed over. The store applies the plan only if the session's
/// roster still matches it exactly.
#[derive(Debug, Clone)]
pub struct StartPlan {
    pub categories: Vec<String>,
    pub word: String,
    pub imposter_count: usize,
    pub expected_roster: Vec<PlayerId>,
    pub imposters: Vec<PlayerId>,
}

/// Outcome of [`GameStore::join_player`](crate::GameStore::join_player).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JoinOutcome {
    Joined(PlayerRow),
    /// The session has left `waiting`.
    NotWaiting,
    /// The identity already holds a seat in this session.
    AlreadyJoined,
}

/// Outcome of [`GameStore::start_session`](crate::GameStore::start_session).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StartOutcome {
    Started(SessionRow),
    /// Somebody else started it first.
    NotWaiting,
    /// A player joined after the plan was drawn. Re-plan and retry.
    RosterChanged,
}

/// Outcome of [`GameStore::mark_viewed`](crate::GameStore::mark_viewed).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ViewOutcome {
    /// This call set `viewed_at`. Exactly one caller ever sees this.
    FirstView(PlayerRow),
    /// `viewed_at` was already set; the row is returned unchanged.
    AlreadyViewed(PlayerRow),
    /// No such player in this session.
    PlayerMissing,
}
