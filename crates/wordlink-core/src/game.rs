// crates/wordlink-core/src/game.rs
//
// GameState: the snapshot of one word chain, handed to front ends for
// rendering and to the persistence layer when a game finishes.

use serde::{Deserialize, Serialize};

/// State of a single game.
///
/// Invariants (maintained by the chain validator in wordlink-game):
///   - `current_chain[0] == start_word`
///   - `word_progresses.len() == current_chain.len() - 1`
///   - `word_progresses[i]` is the progress of `current_chain[i + 1]`
///   - `score == current_chain.len() - 1`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameState {
    pub start_word: String,
    pub target_word: String,
    pub current_chain: Vec<String>,
    pub word_progresses: Vec<f32>,
    pub is_complete: bool,
    pub score: usize,
}

impl GameState {
    /// Fresh game with a chain of just the start word.
    pub fn new(start_word: &str, target_word: &str) -> Self {
        Self {
            start_word: start_word.to_string(),
            target_word: target_word.to_string(),
            current_chain: vec![start_word.to_string()],
            word_progresses: Vec::new(),
            is_complete: false,
            score: 0,
        }
    }

    /// Last word in the chain.
    pub fn last_word(&self) -> &str {
        self.current_chain
            .last()
            .map(String::as_str)
            .unwrap_or(self.start_word.as_str())
    }

    /// Progress of the last chained word, or 0 for a bare start word.
    pub fn current_progress(&self) -> f32 {
        self.word_progresses.last().copied().unwrap_or(0.0)
    }
}
