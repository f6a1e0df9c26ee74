//! Directory configuration.

use serde::{Deserialize, Serialize};

/// Tokens shorter than this are too guessable to act as a credential.
pub const MIN_TOKEN_LEN: usize = 30;

/// Shorter slugs collide often enough to stall session creation.
pub const MIN_SLUG_LEN: usize = 8;

/// Controls identifier shapes and how public links are built.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DirectoryConfig {
    /// Length of session slugs (lowercase letters and digits).
    /// Values below 8 are raised to 8.
    pub slug_len: usize,

    /// Length of player tokens (mixed-case letters and digits).
    /// Values below 30 are raised to 30.
    pub token_len: usize,

    /// Origin the hosting web layer serves from, without a trailing
    /// slash. One-shot links are `{base}/games/{slug}/players/{token}`.
    pub public_base_url: String,
}

impl DirectoryConfig {
    /// The slug length actually used, after enforcing the minimum.
    pub fn effective_slug_len(&self) -> usize {
        self.slug_len.max(MIN_SLUG_LEN)
    }

    /// The token length actually used, after enforcing the minimum.
    pub fn effective_token_len(&self) -> usize {
        self.token_len.max(MIN_TOKEN_LEN)
    }
}

impl Default for DirectoryConfig {
    fn default() -> Self {
        Self {
            slug_len: 10,
            token_len: 40,
            public_base_url: "http://localhost:8000".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_directory_config_default() {
        let config = DirectoryConfig::default();
        assert_eq!(config.slug_len, 10);
        assert_eq!(config.token_len, 40);
    }

    #[test]
    fn test_effective_slug_len_enforces_minimum() {
        let config = DirectoryConfig {
            slug_len: 0,
            ..DirectoryConfig::default()
        };
        assert_eq!(config.effective_slug_len(), MIN_SLUG_LEN);
        assert_eq!(DirectoryConfig::default().effective_slug_len(), 10);
    }

    #[test]
    fn test_effective_token_len_enforces_minimum() {
        let config = DirectoryConfig {
            token_len: 8,
            ..DirectoryConfig::default()
        };
        assert_eq!(config.effective_token_len(), MIN_TOKEN_LEN);
    }
}
