//! Record storage for Imposter.
//!
//! The game rules never touch a database directly. They talk to a
//! [`GameStore`], a narrow trait whose mutating methods are each one
//! atomic unit with a built-in condition:
//!
//! - [`GameStore::create_session`]: session plus initial roster, all or nothing
//! - [`GameStore::join_player`]: only while the session is waiting
//! - [`GameStore::start_session`]: only while waiting *and* the roster is
//!   still the one the imposters were drawn from
//! - [`GameStore::mark_viewed`]: compare-and-set on "not yet viewed"
//!
//! Two backends ship with the crate: [`MemoryStore`] for tests and
//! single-process hosts, and [`SqliteStore`] (feature `sqlite`, on by
//! default) for anything that should survive a restart.

mod error;
mod memory;
mod rows;
#[cfg(feature = "sqlite")]
mod sqlite;
mod store;

pub use error::{StoreError, UniqueField};
pub use memory::MemoryStore;
pub use rows::{
    JoinOutcome, MessageRow, NewMessage, NewPlayer, NewSession, PlayerRow,
    SessionRow, StartOutcome, StartPlan, ViewOutcome,
};
#[cfg(feature = "sqlite")]
pub use sqlite::SqliteStore;
pub use store::GameStore;
