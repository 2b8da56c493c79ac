// crates/wordlink-cli/src/config.rs
//
// Runtime configuration for the wordlink CLI.
// Loaded from a TOML file or populated with sensible defaults.

use std::fs;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use wordlink_core::error::WordlinkError;
use wordlink_core::vector::DEFAULT_DIMENSIONS;
use wordlink_game::{ChainRules, DifficultyConfig};
use wordlink_store::{VectorLayout, DEFAULT_MAX_SHARDS};

/// Runtime configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WordlinkConfig {
    /// Local data directory holding the word list, baseforms and vectors.
    #[serde(default = "default_data_dir")]
    pub data_dir: String,

    /// Remote data directory. When set, takes precedence over `data_dir`.
    #[serde(default)]
    pub base_url: Option<String>,

    /// Embedding dimensionality.
    #[serde(default = "default_dimensions")]
    pub dimensions: usize,

    /// Known shard count; the store probes past it if more exist.
    #[serde(default = "default_max_shards")]
    pub max_shards: usize,

    /// "sharded" or "per_word".
    #[serde(default)]
    pub vector_layout: VectorLayout,

    /// Delay between background shard loads during `play`.
    #[serde(default = "default_prefetch_interval_ms")]
    pub prefetch_interval_ms: u64,

    /// Log level: "trace", "debug", "info", "warn", "error".
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// ConceptNet API base URL. When empty, near misses are not rescued.
    #[serde(default)]
    pub oracle_url: Option<String>,

    /// Base URL used in share links.
    #[serde(default = "default_share_url")]
    pub share_url: String,

    #[serde(default)]
    pub rules: ChainRules,

    #[serde(default)]
    pub difficulty: DifficultyConfig,
}

fn default_data_dir() -> String {
    "~/.wordlink/data".to_string()
}

fn default_dimensions() -> usize {
    DEFAULT_DIMENSIONS
}

fn default_max_shards() -> usize {
    DEFAULT_MAX_SHARDS
}

fn default_prefetch_interval_ms() -> u64 {
    250
}

fn default_log_level() -> String {
    "warn".to_string()
}

fn default_share_url() -> String {
    "https://wordlink.app".to_string()
}

impl Default for WordlinkConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            base_url: None,
            dimensions: default_dimensions(),
            max_shards: default_max_shards(),
            vector_layout: VectorLayout::default(),
            prefetch_interval_ms: default_prefetch_interval_ms(),
            log_level: default_log_level(),
            oracle_url: None,
            share_url: default_share_url(),
            rules: ChainRules::default(),
            difficulty: DifficultyConfig::default(),
        }
    }
}

impl WordlinkConfig {
    /// Load configuration from a TOML file at the given path.
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load(path: &str) -> Result<Self, Box<dyn std::error::Error>> {
        let contents = fs::read_to_string(expand_home(path))?;
        let config: WordlinkConfig = toml::from_str(&contents)?;
        Ok(config)
    }

    /// Reject values the engine cannot run with.
    pub fn validate(&self) -> Result<(), WordlinkError> {
        if self.dimensions == 0 {
            return Err(WordlinkError::Config("dimensions must be positive".to_string()));
        }
        if self.prefetch_interval_ms == 0 {
            return Err(WordlinkError::Config(
                "prefetch_interval_ms must be positive".to_string(),
            ));
        }
        self.rules.validate()?;
        self.difficulty.validate()
    }

    /// The data directory with `~` expanded.
    pub fn data_path(&self) -> PathBuf {
        expand_home(&self.data_dir)
    }
}

/// Default config file location: `~/.wordlink/config.toml`.
pub fn default_config_path() -> String {
    match dirs::home_dir() {
        Some(home) => home.join(".wordlink").join("config.toml").to_string_lossy().to_string(),
        None => "wordlink.toml".to_string(),
    }
}

/// Expand a leading `~/` to the home directory.
pub fn expand_home(path: &str) -> PathBuf {
    if let Some(rest) = path.strip_prefix("~/") {
        if let Some(home) = dirs::home_dir() {
            return home.join(rest);
        }
    }
    PathBuf::from(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = WordlinkConfig::default();
        assert_eq!(config.dimensions, 300);
        assert_eq!(config.max_shards, 138);
        assert_eq!(config.vector_layout, VectorLayout::Sharded);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_toml_fills_defaults() {
        let config: WordlinkConfig = toml::from_str(
            r#"
            base_url = "https://cdn.example/wordlink"
            vector_layout = "per_word"

            [rules]
            adjacency_threshold = 0.1

            [rules.scale]
            zero_at = -0.2
            full_at = 0.25

            [difficulty]
            band_width = 0.05
            "#,
        )
        .unwrap();

        assert_eq!(config.base_url.as_deref(), Some("https://cdn.example/wordlink"));
        assert_eq!(config.vector_layout, VectorLayout::PerWord);
        assert_eq!(config.rules.adjacency_threshold, 0.1);
        assert_eq!(config.rules.completion_threshold, 0.3);
        assert_eq!(config.rules.scale.full_at, 0.25);
        assert_eq!(config.difficulty.band_width, 0.05);
        assert_eq!(config.dimensions, 300);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "dimensions = 50\nlog_level = \"debug\"\n").unwrap();

        let config = WordlinkConfig::load(path.to_str().unwrap()).unwrap();
        assert_eq!(config.dimensions, 50);
        assert_eq!(config.log_level, "debug");
    }

    #[test]
    fn test_load_missing_file_fails() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("absent.toml");
        assert!(WordlinkConfig::load(path.to_str().unwrap()).is_err());
    }

    #[test]
    fn test_validate_rejects_inverted_scale() {
        let mut config = WordlinkConfig::default();
        config.rules.scale.full_at = -0.5;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_expand_home_leaves_plain_paths() {
        assert_eq!(expand_home("/tmp/data"), PathBuf::from("/tmp/data"));
    }
}
