// crates/wordlink-cli/src/context.rs
//
// Wiring shared by every subcommand: the embedding cache built from the
// configured data source, the optional relatedness oracle, and the
// difficulty controller.

use std::sync::Arc;

use wordlink_core::error::WordlinkError;
use wordlink_game::{ConceptNetOracle, DifficultyController};
use wordlink_store::{EmbeddingCache, FileSource, HttpSource, VectorLayout};

use crate::config::WordlinkConfig;
use crate::output::OutputFormat;

/// Everything a subcommand needs.
pub struct AppContext {
    pub config: WordlinkConfig,
    pub cache: Arc<EmbeddingCache>,
    pub oracle: Option<ConceptNetOracle>,
    pub controller: DifficultyController,
    pub format: OutputFormat,
}

impl AppContext {
    pub fn new(config: WordlinkConfig, format: OutputFormat) -> Result<Self, WordlinkError> {
        config.validate()?;
        let cache = Arc::new(build_cache(&config));
        let oracle = config.oracle_url.as_deref().map(ConceptNetOracle::new);
        let controller = DifficultyController::new(config.difficulty.clone())?;
        Ok(Self {
            config,
            cache,
            oracle,
            controller,
            format,
        })
    }
}

/// Build the cache over the configured source and layout.
pub fn build_cache(config: &WordlinkConfig) -> EmbeddingCache {
    let dims = config.dimensions;
    match &config.base_url {
        Some(url) => {
            tracing::info!("Reading vectors from {}", url);
            let source = Arc::new(HttpSource::new(url));
            match config.vector_layout {
                VectorLayout::Sharded => {
                    EmbeddingCache::sharded(source.clone(), source, dims, config.max_shards)
                }
                VectorLayout::PerWord => EmbeddingCache::per_word(source.clone(), source, dims),
            }
        }
        None => {
            let path = config.data_path();
            tracing::info!("Reading vectors from {}", path.display());
            let source = Arc::new(FileSource::new(path));
            match config.vector_layout {
                VectorLayout::Sharded => {
                    EmbeddingCache::sharded(source.clone(), source, dims, config.max_shards)
                }
                VectorLayout::PerWord => EmbeddingCache::per_word(source.clone(), source, dims),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_layout_selects_backend() {
        let mut config = WordlinkConfig::default();
        assert!(build_cache(&config).chunk_store().is_some());
        config.vector_layout = VectorLayout::PerWord;
        config.base_url = Some("http://127.0.0.1:9".to_string());
        assert!(build_cache(&config).chunk_store().is_none());
    }

    #[test]
    fn test_invalid_config_is_rejected() {
        let config = WordlinkConfig {
            dimensions: 0,
            ..WordlinkConfig::default()
        };
        assert!(AppContext::new(config, OutputFormat::Table).is_err());
    }
}
