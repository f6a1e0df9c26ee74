//! Response views: what each operation returns to the hosting web layer.
//!
//! Field names serialize in camelCase because the browser clients poll
//! these records directly (`alreadyViewed`, `hasViewed`, ...).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{
    JoinCode, MessageId, PlayerId, PlayerToken, SessionMode, SessionStatus, Slug,
};

// ---------------------------------------------------------------------------
// Session creation and enrolment
// ---------------------------------------------------------------------------

/// One player's entry in an anonymous-link session: who, and the
/// one-shot link that reveals their card.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerLink {
    pub name: String,
    pub url: String,
}

/// Result of creating an anonymous-link session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnonymousSessionCreated {
    pub slug: Slug,
    /// In roster order: `players[i]` is the player at position `i`.
    pub players: Vec<PlayerLink>,
}

/// Result of creating a code-joined session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CodeSessionCreated {
    pub slug: Slug,
    pub join_code: JoinCode,
}

/// Result of joining a code-joined session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JoinedSession {
    pub player_id: PlayerId,
    pub slug: Slug,
}

/// Result of a moderator starting a code-joined session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionStarted {
    pub word: String,
    /// The count actually applied after capping by roster size.
    pub imposter_count: usize,
}

// ---------------------------------------------------------------------------
// Reveal
// ---------------------------------------------------------------------------

/// What a player sees when they reveal their card.
///
/// `word` is only ever `Some` on a word-holder's first reveal. Imposters
/// never receive the word, and repeat reveals never re-disclose it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RevealCard {
    pub already_viewed: bool,
    pub is_imposter: bool,
    pub word: Option<String>,
}

// ---------------------------------------------------------------------------
// Lobby chat
// ---------------------------------------------------------------------------

/// A stored lobby chat message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatMessageView {
    pub id: MessageId,
    pub sender: String,
    pub body: String,
    pub created_at: DateTime<Utc>,
}

// ---------------------------------------------------------------------------
// Lookups and polling views
// ---------------------------------------------------------------------------

/// Public summary of a session. Never includes the secret word.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionView {
    pub slug: Slug,
    pub mode: SessionMode,
    pub status: SessionStatus,
    pub categories: Vec<String>,
    pub join_code: Option<JoinCode>,
    pub imposter_count: usize,
}

/// Public summary of a player, as found by token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerView {
    pub id: PlayerId,
    pub name: String,
    pub position: usize,
    pub has_viewed: bool,
}

/// One row of a lobby roster.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RosterEntry {
    pub id: PlayerId,
    pub name: String,
    pub position: usize,
    pub has_viewed: bool,
}

/// The shared lobby everyone polls: who is in, and who has looked.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LobbyView {
    pub slug: Slug,
    pub status: SessionStatus,
    pub players: Vec<RosterEntry>,
}

/// The moderator's control panel for a code-joined session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardView {
    pub join_code: Option<JoinCode>,
    pub slug: Slug,
    pub status: SessionStatus,
    pub players: Vec<RosterEntry>,
    pub selected_categories: Vec<String>,
    pub imposter_count: usize,
    /// Empty until the session starts.
    pub word: String,
}

/// What a joined player polls while waiting for the moderator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerLobbyView {
    pub slug: Slug,
    pub player_id: PlayerId,
    pub player_name: String,
    /// The token the client will present to reveal once the game starts.
    pub player_token: PlayerToken,
    pub players: Vec<RosterEntry>,
    pub status: SessionStatus,
}

/// One word category offered on the landing page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryView {
    pub name: String,
    pub words: Vec<String>,
}
