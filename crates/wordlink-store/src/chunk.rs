// crates/wordlink-store/src/chunk.rs
//
// ChunkStore: lazily fetched, binary-searched embedding shards.
//
// The vocabulary is split into shards covering contiguous lexicographic
// ranges. A cold lookup probes O(log shard_count) shards: each probe fetches
// and decodes one whole shard, compares the word against the shard's first
// and last word, and narrows the search. Decoded shards are cached for the
// life of the store; there is no eviction.
//
// Each shard index owns a `OnceCell`, so concurrent probes of the same shard
// (foreground lookups, the prefetcher) share one in-flight fetch, while
// fetches of different shards proceed independently. A failed fetch leaves
// its cell empty so the next caller retries.

use std::cmp::Ordering;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering as AtomicOrdering};
use std::sync::{Arc, Mutex};

use tokio::sync::OnceCell;

use wordlink_core::error::WordlinkError;
use wordlink_core::traits::ShardSource;
use wordlink_core::vector::WordVector;

use crate::payload::DecodedShard;

/// Shard count of the shipped embedding set.
pub const DEFAULT_MAX_SHARDS: usize = 138;

/// Upper bound on shards probed past the configured maximum.
const EXTENSION_LIMIT: usize = 1024;

type ShardCell = Arc<OnceCell<Option<Arc<DecodedShard>>>>;

/// Binary-searching shard store over a `ShardSource`.
pub struct ChunkStore {
    source: Arc<dyn ShardSource>,
    /// Vector dimensionality expected in every shard.
    dims: usize,
    /// Known shard count; grows when shards past it turn out to exist.
    max_shards: AtomicUsize,
    /// One cell per shard index ever touched. `Some(None)` = resolved absent.
    cells: Mutex<HashMap<usize, ShardCell>>,
}

impl ChunkStore {
    /// Create a store over `source` with an assumed maximum shard count.
    pub fn new(source: Arc<dyn ShardSource>, dims: usize, max_shards: usize) -> Self {
        Self {
            source,
            dims,
            max_shards: AtomicUsize::new(max_shards),
            cells: Mutex::new(HashMap::new()),
        }
    }

    /// Current known shard count.
    pub fn max_shards(&self) -> usize {
        self.max_shards.load(AtomicOrdering::SeqCst)
    }

    /// Vector dimensionality.
    pub fn dims(&self) -> usize {
        self.dims
    }

    fn cell(&self, index: usize) -> ShardCell {
        let mut cells = self.cells.lock().unwrap_or_else(|e| e.into_inner());
        cells.entry(index).or_default().clone()
    }

    fn peek(&self, index: usize) -> Option<Option<Arc<DecodedShard>>> {
        let cells = self.cells.lock().unwrap_or_else(|e| e.into_inner());
        cells.get(&index).and_then(|cell| cell.get().cloned())
    }

    /// Whether shard `index` has been fetched (present or absent).
    pub fn is_resolved(&self, index: usize) -> bool {
        self.peek(index).is_some()
    }

    /// Whether shard `index` has been fetched and holds words.
    pub fn is_loaded(&self, index: usize) -> bool {
        matches!(self.peek(index), Some(Some(_)))
    }

    /// Number of decoded shards held in memory.
    pub fn loaded_count(&self) -> usize {
        let cells = self.cells.lock().unwrap_or_else(|e| e.into_inner());
        cells
            .values()
            .filter(|cell| matches!(cell.get(), Some(Some(_))))
            .count()
    }

    /// Lowest shard index below the known maximum that has not been fetched.
    pub fn next_unresolved(&self) -> Option<usize> {
        (0..self.max_shards()).find(|&i| !self.is_resolved(i))
    }

    /// Fetch and decode shard `index`, or return the cached result.
    ///
    /// `Ok(None)` means the shard does not exist. Concurrent callers for the
    /// same index await a single fetch.
    pub async fn load_shard(&self, index: usize) -> Result<Option<Arc<DecodedShard>>, WordlinkError> {
        let cell = self.cell(index);
        let shard = cell
            .get_or_try_init(|| self.fetch_and_decode(index))
            .await?;
        Ok(shard.clone())
    }

    async fn fetch_and_decode(&self, index: usize) -> Result<Option<Arc<DecodedShard>>, WordlinkError> {
        tracing::debug!("Fetching shard {}", index);

        let bytes = match self.source.fetch_shard(index).await? {
            Some(bytes) => bytes,
            None => {
                tracing::debug!("Shard {} is absent", index);
                return Ok(None);
            }
        };

        match DecodedShard::decode(index, &bytes, self.dims) {
            Ok(Some(shard)) => {
                tracing::debug!(
                    "Decoded shard {} ({} words, {}..{})",
                    index,
                    shard.len(),
                    shard.first_word(),
                    shard.last_word()
                );
                Ok(Some(Arc::new(shard)))
            }
            Ok(None) => {
                tracing::debug!("Shard {} is empty, treating as absent", index);
                Ok(None)
            }
            Err(e) => {
                tracing::warn!("Shard {} is malformed, treating as absent: {}", index, e);
                Ok(None)
            }
        }
    }

    /// Find the shard whose range covers `word`.
    ///
    /// Returns `Ok(None)` when no shard covers it.
    pub async fn locate(&self, word: &str) -> Result<Option<Arc<DecodedShard>>, WordlinkError> {
        let max = self.max_shards();
        let mut lo = 0usize;
        let mut hi = max;

        while lo < hi {
            let mid = lo + (hi - lo) / 2;
            match self.load_shard(mid).await? {
                // Past the end of the shard sequence: search lower.
                None => hi = mid,
                Some(shard) => match shard.compare_word(word) {
                    Ordering::Less => hi = mid,
                    Ordering::Greater => lo = mid + 1,
                    Ordering::Equal => {
                        tracing::trace!("Word \"{}\" located in shard {}", word, mid);
                        return Ok(Some(shard));
                    }
                },
            }
        }

        // The search only runs off the top when shard `max - 1` exists and
        // ends before `word`; more shards may follow.
        if max > 0 && lo == max {
            return self.probe_beyond(word, max).await;
        }

        Ok(None)
    }

    async fn probe_beyond(&self, word: &str, start: usize) -> Result<Option<Arc<DecodedShard>>, WordlinkError> {
        for index in start..start + EXTENSION_LIMIT {
            let shard = match self.load_shard(index).await? {
                Some(shard) => shard,
                None => return Ok(None),
            };

            let previous = self.max_shards.fetch_max(index + 1, AtomicOrdering::SeqCst);
            if previous <= index {
                tracing::info!("Shard sequence extends past {}; known shards now {}", previous, index + 1);
            }

            match shard.compare_word(word) {
                Ordering::Equal => return Ok(Some(shard)),
                Ordering::Less => return Ok(None),
                Ordering::Greater => continue,
            }
        }
        Ok(None)
    }

    /// Resolve `word` (already a baseform) to its vector.
    pub async fn locate_and_decode(&self, word: &str) -> Result<WordVector, WordlinkError> {
        match self.locate(word).await? {
            Some(shard) => shard
                .get(word)
                .cloned()
                .ok_or_else(|| WordlinkError::NotFound(format!("\"{}\" not in shard {}", word, shard.index))),
            None => Err(WordlinkError::NotFound(format!("\"{}\" not in any shard", word))),
        }
    }
}

impl std::fmt::Debug for ChunkStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChunkStore")
            .field("dims", &self.dims)
            .field("max_shards", &self.max_shards())
            .field("loaded", &self.loaded_count())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::InMemoryShardSource;
    use crate::payload::tests::{gzip, shard_json};

    /// Five shards of three words each, in order.
    fn fixture() -> (Arc<InMemoryShardSource>, ChunkStore) {
        let groups: [[&str; 3]; 5] = [
            ["ant", "bat", "cat"],
            ["cow", "deer", "dog"],
            ["eel", "elk", "fox"],
            ["gnu", "hen", "ibis"],
            ["jay", "kiwi", "lark"],
        ];
        let shards = groups
            .iter()
            .enumerate()
            .map(|(i, words)| {
                let entries: Vec<(&str, Vec<f32>)> = words
                    .iter()
                    .enumerate()
                    .map(|(j, w)| (*w, vec![i as f32 + 1.0, j as f32]))
                    .collect();
                shard_json(&entries)
            })
            .collect();
        let source = Arc::new(InMemoryShardSource::new(shards));
        let store = ChunkStore::new(source.clone(), 2, 8);
        (source, store)
    }

    #[tokio::test]
    async fn finds_words_at_shard_boundaries() {
        let (_, store) = fixture();
        for (word, shard) in [("ant", 0), ("cat", 0), ("cow", 1), ("dog", 1), ("eel", 2), ("ibis", 3), ("jay", 4), ("lark", 4)] {
            let v = store.locate_and_decode(word).await.unwrap();
            assert_eq!(v[0], shard as f32 + 1.0, "word {}", word);
        }
    }

    #[tokio::test]
    async fn finds_words_in_gzipped_shards() {
        let shards = vec![
            gzip(&shard_json(&[("cat", vec![1.0, 0.0]), ("dog", vec![0.0, 1.0])])),
            gzip(&shard_json(&[("eel", vec![1.0, 1.0])])),
        ];
        let store = ChunkStore::new(Arc::new(InMemoryShardSource::new(shards)), 2, 2);
        assert_eq!(store.locate_and_decode("cat").await.unwrap().as_slice(), &[1.0, 0.0]);
        assert_eq!(store.locate_and_decode("eel").await.unwrap().as_slice(), &[1.0, 1.0]);
    }

    #[tokio::test]
    async fn word_beyond_last_shard_is_not_found() {
        let (_, store) = fixture();
        let err = store.locate_and_decode("zebra").await.unwrap_err();
        assert!(matches!(err, WordlinkError::NotFound(_)));
    }

    #[tokio::test]
    async fn word_in_gap_or_before_first_is_not_found() {
        let (_, store) = fixture();
        assert!(store.locate("aardvark").await.unwrap().is_none());
        // "char" sorts between shard 0 ("cat") and shard 1 ("cow").
        assert!(store.locate("char").await.unwrap().is_none());
        let err = store.locate_and_decode("char").await.unwrap_err();
        assert!(matches!(err, WordlinkError::NotFound(_)));
        // Inside shard 1's range but not present.
        let err = store.locate_and_decode("dingo").await.unwrap_err();
        assert!(matches!(err, WordlinkError::NotFound(_)));
    }

    #[tokio::test]
    async fn cold_lookup_fetches_logarithmically() {
        let (source, store) = fixture();
        store.locate_and_decode("kiwi").await.unwrap();
        assert!(source.fetch_count() <= 4, "fetched {}", source.fetch_count());

        // Second lookup is served from cache.
        let before = source.fetch_count();
        store.locate_and_decode("kiwi").await.unwrap();
        assert_eq!(source.fetch_count(), before);
    }

    #[tokio::test]
    async fn search_extends_past_assumed_maximum() {
        let (source, _) = fixture();
        let store = ChunkStore::new(source, 2, 3);
        let v = store.locate_and_decode("lark").await.unwrap();
        assert_eq!(v[0], 5.0);
        assert_eq!(store.max_shards(), 5);
    }

    #[tokio::test]
    async fn concurrent_lookups_share_one_fetch() {
        let (source, store) = fixture();
        let store = Arc::new(store);
        let mut handles = Vec::new();
        for _ in 0..8 {
            let store = store.clone();
            handles.push(tokio::spawn(async move { store.load_shard(2).await }));
        }
        for h in handles {
            assert!(h.await.unwrap().unwrap().is_some());
        }
        assert_eq!(source.fetch_count(), 1);
    }

    #[tokio::test]
    async fn next_unresolved_walks_upward() {
        let (_, store) = fixture();
        assert_eq!(store.next_unresolved(), Some(0));
        store.load_shard(0).await.unwrap();
        store.load_shard(1).await.unwrap();
        assert_eq!(store.next_unresolved(), Some(2));
        assert_eq!(store.loaded_count(), 2);
        assert!(store.is_loaded(1));
        assert!(!store.is_resolved(2));
    }

    #[tokio::test]
    async fn fetch_failure_is_not_cached() {
        let (source, store) = fixture();
        source.fail_next(1);
        let err = store.load_shard(0).await.unwrap_err();
        assert!(matches!(err, WordlinkError::FetchFailed(_)));
        assert!(!store.is_resolved(0));
        assert!(store.load_shard(0).await.unwrap().is_some());
    }
}
