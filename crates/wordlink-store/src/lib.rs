// crates/wordlink-store/src/lib.rs
//
// wordlink-store: Embedding retrieval layer for Wordlink.
//
// Provides shard payload decoding, the binary-searching chunk store, the
// per-word record store, filesystem / HTTP / in-memory sources, the
// lifecycle-managed embedding cache, and the background shard prefetcher.

pub mod cache;
pub mod chunk;
pub mod file;
pub mod http;
pub mod memory;
pub mod payload;
pub mod prefetch;
pub mod record;

// Re-export key types for ergonomic access from downstream crates.
pub use cache::{EmbeddingCache, LoadState, VectorLayout};
pub use chunk::{ChunkStore, DEFAULT_MAX_SHARDS};
pub use file::FileSource;
pub use http::HttpSource;
pub use memory::{InMemoryLexicon, InMemoryShardSource, InMemoryVectorRecords};
pub use payload::DecodedShard;
pub use prefetch::{PrefetchHandle, Prefetcher};
pub use record::RecordStore;
