//! # Imposter
//!
//! Coordinator for a word party game. Players gather in a session, a
//! secret word is drawn from the categories they picked, one or more of
//! them are secretly made imposters, and every player opens their card
//! exactly once. The imposters then bluff their way through the
//! discussion.
//!
//! The crate is transport-agnostic: a web layer maps each
//! [`Imposter`] method to an endpoint and each [`ImposterError`] to
//! [`ImposterError::status_code`].
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use imposter::prelude::*;
//!
//! # async fn run() -> Result<(), ImposterError> {
//! let catalog = WordCatalog::from_json_str(r#"{"animals": ["otter", "lynx", "heron"]}"#)?;
//! let config = ImposterConfig {
//!     game: GameConfig { min_pool_size: 3, ..GameConfig::default() },
//!     ..ImposterConfig::default()
//! };
//! let game = Imposter::builder()
//!     .catalog(catalog)
//!     .config(config)
//!     .build(MemoryStore::new());
//!
//! let created = game
//!     .create_anonymous_session(
//!         vec!["Ana".into(), "Ben".into(), "Cleo".into()],
//!         vec!["animals".into()],
//!     )
//!     .await?;
//! for player in &created.players {
//!     println!("{}: {}", player.name, player.url);
//! }
//! # Ok(())
//! # }
//! ```

mod config;
mod error;
mod service;
mod telemetry;

pub use config::ImposterConfig;
pub use error::ImposterError;
pub use service::{Imposter, ImposterBuilder};
pub use telemetry::init_tracing;

pub use imposter_directory::{DirectoryConfig, Entropy, PlayerRef};
pub use imposter_game::{GameConfig, GameError, WordCatalog};
pub use imposter_protocol as protocol;
pub use imposter_store::{GameStore, MemoryStore, SqliteStore, StoreError};

pub mod prelude {
    pub use crate::{
        DirectoryConfig, Entropy, GameConfig, GameError, GameStore, Imposter, ImposterConfig,
        ImposterError, MemoryStore, PlayerRef, SqliteStore, WordCatalog,
    };
    pub use imposter_protocol::{
        Identity, JoinCode, PlayerId, PlayerToken, RevealCard, SessionStatus, Slug, UserId,
    };
}
