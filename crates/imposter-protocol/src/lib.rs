//! Shared vocabulary for Imposter.
//!
//! This crate defines what the other layers pass around and what a hosting
//! web layer hands back to browsers:
//!
//! - **Identifiers** ([`SessionId`], [`PlayerId`], [`Slug`], [`JoinCode`],
//!   [`PlayerToken`], ...) as newtypes so they can't be mixed up.
//! - **State** ([`SessionMode`], [`SessionStatus`]) including the legal
//!   status transitions.
//! - **Views** ([`RevealCard`], [`LobbyView`], ...): the JSON-shaped
//!   records returned by every operation.
//! - **Codec** ([`Codec`] trait, [`JsonCodec`]) for turning views into bytes.
//!
//! # Architecture
//!
//! ```text
//! Store (rows) → Directory (identifiers) → Game (rules) → Imposter (facade)
//!                      all of them speak imposter-protocol
//! ```

mod codec;
mod error;
mod types;
mod views;

pub use codec::Codec;
#[cfg(feature = "json")]
pub use codec::JsonCodec;
pub use error::ProtocolError;
pub use types::{
    Identity, JoinCode, MessageId, PlayerId, PlayerToken, SessionId, SessionMode,
    SessionStatus, Slug, UserId,
};
pub use views::{
    AnonymousSessionCreated, CategoryView, ChatMessageView, CodeSessionCreated,
    DashboardView, JoinedSession, LobbyView, PlayerLink, PlayerLobbyView,
    PlayerView, RevealCard, RosterEntry, SessionStarted, SessionView,
};
