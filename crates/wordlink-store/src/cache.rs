// crates/wordlink-store/src/cache.rs
//
// EmbeddingCache: the service every consumer holds (via `Arc`) to turn
// surface words into vectors.
//
// Lifecycle: Uninitialized -> Loading -> Ready.
//
// `ensure_loaded` fetches the word list and the baseform index exactly once;
// concurrent callers await the same in-flight load. Vectors are then served
// lazily from either the sharded chunk store or the per-word record store
// and cached for the life of the process.

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tokio::sync::OnceCell;

use wordlink_core::error::WordlinkError;
use wordlink_core::traits::{LexiconSource, ShardSource, VectorRecordSource};
use wordlink_core::vector::WordVector;

use crate::chunk::ChunkStore;
use crate::record::RecordStore;

/// Lifecycle of the cache.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadState {
    /// Nothing fetched yet (or the last load failed).
    Uninitialized,
    /// A lexicon load is in flight.
    Loading,
    /// Word list and baseform index are available.
    Ready,
}

impl std::fmt::Display for LoadState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LoadState::Uninitialized => write!(f, "Uninitialized"),
            LoadState::Loading => write!(f, "Loading"),
            LoadState::Ready => write!(f, "Ready"),
        }
    }
}

/// How vectors are laid out at the source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VectorLayout {
    /// Lexicographically sorted half-precision shards.
    #[default]
    Sharded,
    /// One binary f32 record per baseform.
    PerWord,
}

/// Word list and baseform index, loaded once.
#[derive(Debug)]
struct Lexicon {
    baseforms: HashMap<String, String>,
    word_list: Vec<String>,
}

enum Backend {
    Sharded(Arc<ChunkStore>),
    PerWord(RecordStore),
}

/// Process-wide embedding service.
pub struct EmbeddingCache {
    lexicon_source: Arc<dyn LexiconSource>,
    lexicon: OnceCell<Lexicon>,
    loading: AtomicBool,
    backend: Backend,
}

impl EmbeddingCache {
    /// Cache over sharded vectors.
    pub fn sharded(
        lexicon_source: Arc<dyn LexiconSource>,
        shard_source: Arc<dyn ShardSource>,
        dims: usize,
        max_shards: usize,
    ) -> Self {
        let store = Arc::new(ChunkStore::new(shard_source, dims, max_shards));
        Self::with_backend(lexicon_source, Backend::Sharded(store))
    }

    /// Cache over per-word vector records.
    pub fn per_word(
        lexicon_source: Arc<dyn LexiconSource>,
        record_source: Arc<dyn VectorRecordSource>,
        dims: usize,
    ) -> Self {
        Self::with_backend(lexicon_source, Backend::PerWord(RecordStore::new(record_source, dims)))
    }

    fn with_backend(lexicon_source: Arc<dyn LexiconSource>, backend: Backend) -> Self {
        Self {
            lexicon_source,
            lexicon: OnceCell::new(),
            loading: AtomicBool::new(false),
            backend,
        }
    }

    /// Current lifecycle state.
    pub fn state(&self) -> LoadState {
        if self.lexicon.initialized() {
            LoadState::Ready
        } else if self.loading.load(Ordering::SeqCst) {
            LoadState::Loading
        } else {
            LoadState::Uninitialized
        }
    }

    /// The chunk store, when vectors are sharded.
    pub fn chunk_store(&self) -> Option<&Arc<ChunkStore>> {
        match &self.backend {
            Backend::Sharded(store) => Some(store),
            Backend::PerWord(_) => None,
        }
    }

    /// Load the word list and baseform index if not already loaded.
    ///
    /// Idempotent. Concurrent callers share one in-flight load. A failed load
    /// leaves the cache uninitialized so a later call retries.
    pub async fn ensure_loaded(&self) -> Result<(), WordlinkError> {
        if self.lexicon.initialized() {
            return Ok(());
        }

        self.lexicon
            .get_or_try_init(|| async {
                self.loading.store(true, Ordering::SeqCst);
                let result = self.load_lexicon().await;
                self.loading.store(false, Ordering::SeqCst);
                result
            })
            .await?;
        Ok(())
    }

    async fn load_lexicon(&self) -> Result<Lexicon, WordlinkError> {
        tracing::info!("Loading word list and baseform index");

        let (word_text, baseform_text) = tokio::try_join!(
            self.lexicon_source.fetch_word_list(),
            self.lexicon_source.fetch_baseforms(),
        )?;

        let baseforms: HashMap<String, String> = serde_json::from_str(&baseform_text)?;

        let mut seen = HashSet::new();
        let word_list: Vec<String> = word_text
            .lines()
            .map(str::trim)
            .filter(|w| !w.is_empty() && baseforms.contains_key(*w))
            .filter(|w| seen.insert(w.to_string()))
            .map(str::to_string)
            .collect();

        tracing::info!(
            "Lexicon ready: {} baseform entries, {} playable common words",
            baseforms.len(),
            word_list.len()
        );

        Ok(Lexicon {
            baseforms,
            word_list,
        })
    }

    /// Whether `word` is playable. False until the cache is ready.
    pub fn is_valid_word(&self, word: &str) -> bool {
        self.lexicon
            .get()
            .map(|lex| lex.baseforms.contains_key(word))
            .unwrap_or(false)
    }

    /// Canonical form of `word`, if known.
    pub fn baseform(&self, word: &str) -> Option<&str> {
        self.lexicon
            .get()
            .and_then(|lex| lex.baseforms.get(word))
            .map(String::as_str)
    }

    /// Words eligible for random sampling. Empty until the cache is ready.
    pub fn word_list(&self) -> &[String] {
        self.lexicon
            .get()
            .map(|lex| lex.word_list.as_slice())
            .unwrap_or(&[])
    }

    /// Resolve a surface word to its vector.
    pub async fn vector_for(&self, word: &str) -> Result<WordVector, WordlinkError> {
        self.ensure_loaded().await?;

        let baseform = self
            .baseform(word)
            .ok_or_else(|| WordlinkError::NoBaseform(word.to_string()))?;

        match &self.backend {
            Backend::Sharded(store) => store.locate_and_decode(baseform).await,
            Backend::PerWord(records) => records.vector_for(baseform).await,
        }
    }

    /// Load a set of shards up front. Failures are logged, not returned.
    ///
    /// Returns how many of the requested shards are now in memory. A no-op
    /// for the per-word layout.
    pub async fn warm(&self, indices: &[usize]) -> usize {
        let Some(store) = self.chunk_store() else {
            return 0;
        };

        let mut loaded = 0;
        for &index in indices {
            match store.load_shard(index).await {
                Ok(Some(_)) => loaded += 1,
                Ok(None) => tracing::debug!("Warm: shard {} is absent", index),
                Err(e) => tracing::warn!("Warm: failed to load shard {}: {}", index, e),
            }
        }
        loaded
    }
}

impl std::fmt::Debug for EmbeddingCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let layout = match &self.backend {
            Backend::Sharded(_) => VectorLayout::Sharded,
            Backend::PerWord(_) => VectorLayout::PerWord,
        };
        f.debug_struct("EmbeddingCache")
            .field("state", &self.state())
            .field("layout", &layout)
            .finish()
    }
}
