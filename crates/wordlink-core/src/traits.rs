// crates/wordlink-core/src/traits.rs

use async_trait::async_trait;

use crate::error::WordlinkError;

/// Source of packed embedding shards, addressed by integer index.
///
/// Implemented by wordlink-store (filesystem, HTTP, in-memory).
#[async_trait]
pub trait ShardSource: Send + Sync {
    /// Fetch the raw payload of shard `index`.
    ///
    /// Returns `Ok(None)` when the shard does not exist (end of the shard
    /// sequence). Transport failures are `Err(FetchFailed)`.
    async fn fetch_shard(&self, index: usize) -> Result<Option<Vec<u8>>, WordlinkError>;
}

/// Source of the two read-once lexicon resources.
///
/// Implemented by wordlink-store (filesystem, HTTP, in-memory).
#[async_trait]
pub trait LexiconSource: Send + Sync {
    /// Newline-delimited list of common words.
    async fn fetch_word_list(&self) -> Result<String, WordlinkError>;

    /// JSON object mapping surface word -> baseform.
    async fn fetch_baseforms(&self) -> Result<String, WordlinkError>;
}

/// Source of per-word binary vector records, addressed by baseform.
#[async_trait]
pub trait VectorRecordSource: Send + Sync {
    /// Fetch the record for `baseform`, or `Ok(None)` if there is none.
    async fn fetch_record(&self, baseform: &str) -> Result<Option<Vec<u8>>, WordlinkError>;
}

/// External "are these two words related" check.
///
/// Consulted only when the embedding similarity falls short. Errors are
/// treated as "not related" by callers.
///
/// Implemented by wordlink-game (ConceptNet client).
#[async_trait]
pub trait RelatednessOracle: Send + Sync {
    async fn are_related(&self, a: &str, b: &str) -> Result<bool, WordlinkError>;
}
