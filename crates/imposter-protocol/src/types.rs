//! Identifier newtypes and the session state machine's vocabulary.
//!
//! Numeric ids ([`SessionId`], [`PlayerId`], [`MessageId`], [`UserId`]) are
//! assigned by the store. String identifiers ([`Slug`], [`JoinCode`],
//! [`PlayerToken`]) are generated by the directory and are what clients
//! actually hold.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::ProtocolError;

// ---------------------------------------------------------------------------
// Numeric identity types
// ---------------------------------------------------------------------------

/// Internal identifier of a game session (one round).
///
/// `#[serde(transparent)]` serializes `SessionId(42)` as plain `42`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionId(pub u64);

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "G-{}", self.0)
    }
}

/// Identifier of a player row. Unique across all sessions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PlayerId(pub u64);

impl fmt::Display for PlayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "P-{}", self.0)
    }
}

/// Identifier of a lobby chat message. Increases with insertion order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MessageId(pub u64);

impl fmt::Display for MessageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "M-{}", self.0)
    }
}

/// An external account identity, as resolved by the hosting web layer.
///
/// Imposter never authenticates anyone. The host does that and passes the
/// resulting `UserId` into code-joined operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(pub u64);

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "U-{}", self.0)
    }
}

/// A caller whose account the hosting layer has already authenticated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    pub user: UserId,
    /// Shown to other players in rosters.
    pub name: String,
}

impl Identity {
    pub fn new(user: UserId, name: impl Into<String>) -> Self {
        Self {
            user,
            name: name.into(),
        }
    }
}

// ---------------------------------------------------------------------------
// String identifiers
// ---------------------------------------------------------------------------

/// The public URL identifier of a session, e.g. `k3v9q0xz1m`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Slug(String);

impl Slug {
    /// Wraps a slug string as-is. Slugs are compared exactly.
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Slug {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A short, shareable join code such as `Q7XK2M`.
///
/// Codes are case-insensitive on input: [`JoinCode::parse`] trims and
/// uppercases whatever the player typed, so `q7xk2m` finds the same
/// session as `Q7XK2M`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct JoinCode(String);

impl JoinCode {
    /// Number of characters in every join code.
    pub const LEN: usize = 6;

    /// Normalizes and validates user input.
    ///
    /// # Errors
    /// Returns [`ProtocolError::InvalidIdentifier`] unless the trimmed
    /// input is exactly [`JoinCode::LEN`] ASCII alphanumerics.
    pub fn parse(input: &str) -> Result<Self, ProtocolError> {
        let normalized = input.trim().to_ascii_uppercase();
        if normalized.len() != Self::LEN
            || !normalized.chars().all(|c| c.is_ascii_alphanumeric())
        {
            return Err(ProtocolError::InvalidIdentifier(format!(
                "join code must be {} letters or digits",
                Self::LEN
            )));
        }
        Ok(Self(normalized))
    }

    /// Wraps a freshly generated code. The caller guarantees the shape.
    pub fn from_generated(value: String) -> Self {
        Self(value)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for JoinCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A player's one-shot reveal token.
///
/// Anyone holding the token can reveal that player's card, so `Debug`
/// only prints a short prefix to keep tokens out of logs.
#[derive(Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PlayerToken(String);

impl PlayerToken {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for PlayerToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let prefix: String = self.0.chars().take(4).collect();
        write!(f, "PlayerToken({prefix}…)")
    }
}

// ---------------------------------------------------------------------------
// SessionMode
// ---------------------------------------------------------------------------

/// How players enrol in a session.
///
/// Both modes share one state machine; they differ only in *when* the
/// word and imposters are fixed and *how* the roster is built:
///
/// | Mode | Roster | Word + imposters fixed |
/// |---|---|---|
/// | `AnonymousLink` | supplied in full at creation | at creation |
/// | `CodeJoined` | players join one by one with a code | at moderator start |
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SessionMode {
    AnonymousLink,
    CodeJoined,
}

impl SessionMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::AnonymousLink => "anonymous-link",
            Self::CodeJoined => "code-joined",
        }
    }

    /// Parses the stored string form.
    pub fn from_str_opt(value: &str) -> Option<Self> {
        match value {
            "anonymous-link" => Some(Self::AnonymousLink),
            "code-joined" => Some(Self::CodeJoined),
            _ => None,
        }
    }
}

impl fmt::Display for SessionMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// SessionStatus
// ---------------------------------------------------------------------------

/// The lifecycle status of a session.
///
/// ```text
/// Waiting → Active → Finished
/// ```
///
/// - **Waiting**: code-joined sessions accepting players. No word yet.
/// - **Active**: word and imposters are fixed; players may reveal.
///   Anonymous-link sessions are born here.
/// - **Finished**: terminal. Modelled so stores can persist it, but no
///   core operation moves a session here; sessions stay `Active`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionStatus {
    Waiting,
    Active,
    Finished,
}

impl SessionStatus {
    /// Returns `true` if players may still join.
    pub fn is_joinable(&self) -> bool {
        matches!(self, Self::Waiting)
    }

    /// Returns `true` if cards may be revealed.
    pub fn is_active(&self) -> bool {
        matches!(self, Self::Active)
    }

    /// The only legal successor of this status, if any.
    pub fn next(self) -> Option<Self> {
        match self {
            Self::Waiting => Some(Self::Active),
            Self::Active => Some(Self::Finished),
            Self::Finished => None,
        }
    }

    /// Returns `true` if transitioning to `target` is valid.
    pub fn can_transition_to(self, target: Self) -> bool {
        self.next() == Some(target)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Waiting => "waiting",
            Self::Active => "active",
            Self::Finished => "finished",
        }
    }

    /// Parses the stored string form.
    pub fn from_str_opt(value: &str) -> Option<Self> {
        match value {
            "waiting" => Some(Self::Waiting),
            "active" => Some(Self::Active),
            "finished" => Some(Self::Finished),
            _ => None,
        }
    }
}

impl fmt::Display for SessionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
