//! Session directory for Imposter.
//!
//! Clients never see internal ids. They hold a slug (the session URL), a
//! short join code, or a per-player token. This crate:
//!
//! 1. **Issues identifiers**: slugs, join codes, and tokens drawn from an
//!    injectable random source ([`Entropy`]), regenerated until the store
//!    accepts them as unique.
//! 2. **Resolves identifiers**: slug → session, code → joinable session,
//!    token or id → player ([`SessionDirectory`]).
//!
//! # How it fits in the stack
//!
//! ```text
//! Game layer (above)  ← creates sessions and players through the directory
//!     ↕
//! Directory (this crate)  ← turns public identifiers into rows
//!     ↕
//! Store (below)  ← enforces uniqueness
//! ```

mod config;
mod directory;
mod entropy;
mod error;
mod ids;

pub use config::{DirectoryConfig, MIN_SLUG_LEN, MIN_TOKEN_LEN};
pub use directory::{PlayerDraft, PlayerRef, SessionDirectory, SessionDraft};
pub use entropy::Entropy;
pub use error::DirectoryError;
pub use ids::{generate_join_code, generate_slug, generate_token};
