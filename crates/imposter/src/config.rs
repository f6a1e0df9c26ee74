//! Top-level configuration.

use imposter_directory::DirectoryConfig;
use imposter_game::GameConfig;
use imposter_protocol::{Codec, JsonCodec, ProtocolError};
use serde::{Deserialize, Serialize};

/// Everything a host can tune, in one document.
///
/// ```json
/// {
///   "game": { "min_pool_size": 30, "message_window": 100 },
///   "directory": { "public_base_url": "https://imposter.party" }
/// }
/// ```
///
/// Omitted sections and fields keep their defaults.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ImposterConfig {
    pub game: GameConfig,
    pub directory: DirectoryConfig,
}

impl ImposterConfig {
    /// Parses a JSON configuration document.
    pub fn from_json_str(json: &str) -> Result<Self, ProtocolError> {
        JsonCodec.decode(json.as_bytes())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_json_str_partial_keeps_defaults() {
        let config = ImposterConfig::from_json_str(
            r#"{"directory": {"public_base_url": "https://imposter.party"}, "game": {"min_players": 4}}"#,
        )
        .unwrap();
        assert_eq!(config.directory.public_base_url, "https://imposter.party");
        assert_eq!(config.directory.slug_len, 10);
        assert_eq!(config.game.min_players, 4);
        assert_eq!(config.game.min_pool_size, 30);
    }

    #[test]
    fn test_from_json_str_empty_object_is_default() {
        let config = ImposterConfig::from_json_str("{}").unwrap();
        assert_eq!(config, ImposterConfig::default());
    }

    #[test]
    fn test_from_json_str_malformed_fails() {
        let result = ImposterConfig::from_json_str("{ game: ");
        assert!(matches!(result, Err(ProtocolError::Decode(_))));
    }
}
