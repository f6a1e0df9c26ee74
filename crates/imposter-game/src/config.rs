//! Game limits.

use serde::{Deserialize, Serialize};

/// Fewest players an imposter round can be dealt to.
pub const MIN_PLAYERS: usize = 3;

/// Tunable limits for sessions, rosters, and lobby chat.
///
/// Hosts can load this from JSON; missing fields keep their defaults.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    /// Fewest candidate words a category selection must yield.
    pub min_pool_size: usize,

    /// Fewest (non-moderator) players a round can be played with.
    /// Values below 3 are raised to 3.
    pub min_players: usize,

    /// Upper bound on the imposter count a moderator may request.
    /// The roster-size cap usually bites first.
    pub max_requested_imposters: usize,

    /// Longest allowed player display name, in characters.
    pub max_player_name_len: usize,

    /// Longest allowed chat message body, in characters.
    pub max_message_body_len: usize,

    /// Longest allowed chat sender label, in characters.
    pub max_sender_len: usize,

    /// How many of the newest chat messages a listing returns.
    pub message_window: usize,

    /// Sender label used when a chat message arrives without one.
    pub default_sender: String,
}

impl GameConfig {
    /// The roster minimum actually enforced.
    pub fn effective_min_players(&self) -> usize {
        self.min_players.max(MIN_PLAYERS)
    }
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            min_pool_size: 30,
            min_players: 3,
            max_requested_imposters: 5,
            max_player_name_len: 100,
            max_message_body_len: 1000,
            max_sender_len: 100,
            message_window: 100,
            default_sender: "Player".to_string(),
        }
    }
}
