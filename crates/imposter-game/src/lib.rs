//! Game rules for Imposter.
//!
//! One round works like this: a word is drawn from the categories the
//! group picked, a few players are secretly made imposters, and every
//! player opens their card exactly once.
//!
//! # Key types
//!
//! - [`WordCatalog`] / [`WordPool`]: categories → candidate words
//! - [`assign_imposters`]: capped, uniform imposter draw
//! - [`GameSessions`]: create, join, start, and the polling views
//! - [`RevealGate`]: the one-shot card reveal
//! - [`LobbyMessaging`]: append-only lobby chat
//! - [`GameConfig`]: limits (pool minimum, roster minimum, chat caps)

mod assigner;
mod catalog;
mod config;
mod error;
mod messaging;
mod reveal;
mod session;
mod views;

pub use assigner::{assign_imposters, imposter_cap};
pub use catalog::{WordCatalog, WordPool};
pub use config::{GameConfig, MIN_PLAYERS};
pub use error::GameError;
pub use messaging::LobbyMessaging;
pub use reveal::RevealGate;
pub use session::GameSessions;
