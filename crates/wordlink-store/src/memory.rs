// crates/wordlink-store/src/memory.rs
//
// In-memory implementations of the source traits.
//
// Used by tests and by embedders that ship a small fixed vocabulary inside
// the binary. Each source counts its fetches so callers can assert on
// single-flight behavior.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::RwLock;

use async_trait::async_trait;

use wordlink_core::codec::encode_vector_record;
use wordlink_core::error::WordlinkError;
use wordlink_core::traits::{LexiconSource, ShardSource, VectorRecordSource};

/// Shard payloads held in a `Vec`; indices past the end are absent.
#[derive(Debug, Default)]
pub struct InMemoryShardSource {
    shards: Vec<Vec<u8>>,
    fetches: AtomicUsize,
    failures_pending: AtomicUsize,
}

impl InMemoryShardSource {
    pub fn new(shards: Vec<Vec<u8>>) -> Self {
        Self {
            shards,
            fetches: AtomicUsize::new(0),
            failures_pending: AtomicUsize::new(0),
        }
    }

    /// Number of `fetch_shard` calls served so far (including failures).
    pub fn fetch_count(&self) -> usize {
        self.fetches.load(Ordering::SeqCst)
    }

    /// Make the next `n` fetches fail with `FetchFailed`.
    pub fn fail_next(&self, n: usize) {
        self.failures_pending.store(n, Ordering::SeqCst);
    }

    fn take_failure(&self) -> bool {
        self.failures_pending
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok()
    }
}

#[async_trait]
impl ShardSource for InMemoryShardSource {
    async fn fetch_shard(&self, index: usize) -> Result<Option<Vec<u8>>, WordlinkError> {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        tokio::task::yield_now().await;
        if self.take_failure() {
            return Err(WordlinkError::FetchFailed(format!("injected failure for shard {}", index)));
        }
        Ok(self.shards.get(index).cloned())
    }
}

/// Word list and baseform map held as their serialized text.
#[derive(Debug, Default)]
pub struct InMemoryLexicon {
    word_list: String,
    baseforms: String,
    fetches: AtomicUsize,
}

impl InMemoryLexicon {
    /// Build from raw resource text.
    pub fn new(word_list: impl Into<String>, baseforms: impl Into<String>) -> Self {
        Self {
            word_list: word_list.into(),
            baseforms: baseforms.into(),
            fetches: AtomicUsize::new(0),
        }
    }

    /// Build from `(surface, baseform)` pairs and a list of common words.
    pub fn from_pairs(pairs: &[(&str, &str)], common_words: &[&str]) -> Self {
        let map: HashMap<&str, &str> = pairs.iter().copied().collect();
        let baseforms = serde_json::to_string(&map).unwrap_or_else(|_| "{}".to_string());
        Self::new(common_words.join("\n"), baseforms)
    }

    /// Number of resource fetches served (two per full load).
    pub fn fetch_count(&self) -> usize {
        self.fetches.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl LexiconSource for InMemoryLexicon {
    async fn fetch_word_list(&self) -> Result<String, WordlinkError> {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        tokio::task::yield_now().await;
        Ok(self.word_list.clone())
    }

    async fn fetch_baseforms(&self) -> Result<String, WordlinkError> {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        tokio::task::yield_now().await;
        Ok(self.baseforms.clone())
    }
}

/// Per-word vector records keyed by baseform.
#[derive(Debug, Default)]
pub struct InMemoryVectorRecords {
    records: RwLock<HashMap<String, Vec<u8>>>,
    fetches: AtomicUsize,
}

impl InMemoryVectorRecords {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store `values` under `baseform`, encoded as a binary record.
    pub fn insert(&self, baseform: &str, values: &[f32]) {
        self.insert_raw(baseform, encode_vector_record(values));
    }

    /// Store an arbitrary (possibly malformed) record.
    pub fn insert_raw(&self, baseform: &str, bytes: Vec<u8>) {
        let mut records = self.records.write().unwrap_or_else(|e| e.into_inner());
        records.insert(baseform.to_string(), bytes);
    }

    pub fn fetch_count(&self) -> usize {
        self.fetches.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl VectorRecordSource for InMemoryVectorRecords {
    async fn fetch_record(&self, baseform: &str) -> Result<Option<Vec<u8>>, WordlinkError> {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        let records = self.records.read().unwrap_or_else(|e| e.into_inner());
        Ok(records.get(baseform).cloned())
    }
}
