// crates/wordlink-core/src/lib.rs
//
// wordlink-core: Core types, traits, and numeric primitives for Wordlink.
//
// This is the leaf crate that all other crates in the workspace depend on.
// It defines the word vector type, the game state snapshot, the error type,
// the half-precision codec, cosine similarity / progress math, and the trait
// interfaces for shard, lexicon, vector-record and relatedness sources.

pub mod codec;
pub mod error;
pub mod game;
pub mod similarity;
pub mod traits;
pub mod vector;

// Re-export key types for ergonomic access from downstream crates.
// Usage: `use wordlink_core::WordVector;`

pub use codec::{decode_f16_le, decode_vector_record, encode_vector_record, f16_to_f32};
pub use error::WordlinkError;
pub use game::GameState;
pub use similarity::{cosine_similarity, ProgressScale};
pub use traits::{LexiconSource, RelatednessOracle, ShardSource, VectorRecordSource};
pub use vector::{WordVector, DEFAULT_DIMENSIONS};
