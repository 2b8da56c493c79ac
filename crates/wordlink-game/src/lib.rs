// crates/wordlink-game/src/lib.rs
//
// wordlink-game: Game logic for Wordlink.
//
// Random and daily pair search, phased hint search, the adaptive difficulty
// controller, the chain validator state machine, the ConceptNet relatedness
// oracle and share text generation. Everything here reads vectors through
// an `EmbeddingCache` handed in by the caller.

pub mod chain;
pub mod difficulty;
pub mod oracle;
pub mod search;
pub mod share;

// Re-export key types for ergonomic access from downstream crates.
pub use chain::{recalculate_progress, ChainGame, ChainRules, GamePhase, Outcome};
pub use difficulty::{DifficultyConfig, DifficultyController};
pub use oracle::ConceptNetOracle;
pub use search::{
    daily_seed, find_daily_pair, find_hint, find_random_pair, word_similarity, Band, HintRequest,
    WordPair,
};
pub use share::share_text;
