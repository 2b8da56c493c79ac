// crates/wordlink-game/src/chain.rs
//
// Chain validator for a single game.
//
// Valid transitions:
//   Active -> Active     (extend / edit / undo below the completion threshold)
//   Active -> Complete   (extend / edit reaching the target)
//   Any    -> Active     (retry / new_game)
//
// Every transition keeps `word_progresses.len() == current_chain.len() - 1`
// and `score == current_chain.len() - 1`. A rejected move leaves the chain
// untouched.

use std::fmt;

use serde::{Deserialize, Serialize};

use wordlink_core::error::WordlinkError;
use wordlink_core::game::GameState;
use wordlink_core::similarity::ProgressScale;
use wordlink_core::traits::RelatednessOracle;
use wordlink_store::EmbeddingCache;

use crate::search::word_similarity;

fn default_adjacency_threshold() -> f32 {
    0.05
}

fn default_completion_threshold() -> f32 {
    0.3
}

/// Thresholds and progress calibration (the `[rules]` config section).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ChainRules {
    /// Minimum similarity between consecutive chain words.
    #[serde(default = "default_adjacency_threshold")]
    pub adjacency_threshold: f32,
    /// Similarity to the target that completes the chain.
    #[serde(default = "default_completion_threshold")]
    pub completion_threshold: f32,
    #[serde(default)]
    pub scale: ProgressScale,
}

impl Default for ChainRules {
    fn default() -> Self {
        Self {
            adjacency_threshold: default_adjacency_threshold(),
            completion_threshold: default_completion_threshold(),
            scale: ProgressScale::default(),
        }
    }
}

impl ChainRules {
    pub fn validate(&self) -> Result<(), WordlinkError> {
        self.scale.validate()?;
        for (name, value) in [
            ("adjacency_threshold", self.adjacency_threshold),
            ("completion_threshold", self.completion_threshold),
        ] {
            if !(-1.0..=1.0).contains(&value) {
                return Err(WordlinkError::Config(format!(
                    "{} must be within [-1, 1] (got {})",
                    name, value
                )));
            }
        }
        Ok(())
    }
}

/// Whether the chain can still be extended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GamePhase {
    Active,
    Complete,
}

impl fmt::Display for GamePhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GamePhase::Active => write!(f, "Active"),
            GamePhase::Complete => write!(f, "Complete"),
        }
    }
}

/// Result of an accepted move.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Outcome {
    Accepted { progress: f32 },
    Completed { progress: f32 },
}

impl Outcome {
    pub fn progress(&self) -> f32 {
        match self {
            Outcome::Accepted { progress } | Outcome::Completed { progress } => *progress,
        }
    }

    pub fn is_complete(&self) -> bool {
        matches!(self, Outcome::Completed { .. })
    }
}

/// Trim and lowercase player input.
pub fn normalize_word(word: &str) -> String {
    word.trim().to_lowercase()
}

/// A game in progress.
#[derive(Debug, Clone)]
pub struct ChainGame {
    state: GameState,
    rules: ChainRules,
}

impl ChainGame {
    pub fn new(start_word: &str, target_word: &str, rules: ChainRules) -> Self {
        Self {
            state: GameState::new(&normalize_word(start_word), &normalize_word(target_word)),
            rules,
        }
    }

    /// Resume from a saved snapshot, recomputing progress and completion
    /// from the cache.
    pub async fn restore(
        cache: &EmbeddingCache,
        mut state: GameState,
        rules: ChainRules,
    ) -> Result<Self, WordlinkError> {
        if state.current_chain.first() != Some(&state.start_word) {
            return Err(WordlinkError::InvalidState(format!(
                "chain does not begin with start word \"{}\"",
                state.start_word
            )));
        }
        state.word_progresses =
            recalculate_progress(cache, &state.current_chain, &state.target_word, &rules.scale)
                .await?;
        state.score = state.current_chain.len() - 1;
        state.is_complete = match state.current_chain.last() {
            Some(last) if state.score > 0 => {
                word_similarity(cache, last, &state.target_word).await?
                    >= rules.completion_threshold
            }
            _ => false,
        };
        Ok(Self { state, rules })
    }

    pub fn state(&self) -> &GameState {
        &self.state
    }

    pub fn into_state(self) -> GameState {
        self.state
    }

    pub fn rules(&self) -> &ChainRules {
        &self.rules
    }

    pub fn phase(&self) -> GamePhase {
        if self.state.is_complete {
            GamePhase::Complete
        } else {
            GamePhase::Active
        }
    }

    fn require_active(&self, action: &str) -> Result<(), WordlinkError> {
        match self.phase() {
            GamePhase::Active => Ok(()),
            GamePhase::Complete => Err(WordlinkError::InvalidState(format!(
                "cannot {} a completed chain",
                action
            ))),
        }
    }

    /// Append `word` to the chain.
    pub async fn extend(
        &mut self,
        cache: &EmbeddingCache,
        oracle: Option<&dyn RelatednessOracle>,
        word: &str,
    ) -> Result<Outcome, WordlinkError> {
        self.require_active("extend")?;
        let word = normalize_word(word);
        let previous = self.state.last_word().to_string();

        let (progress, complete) = self.evaluate(cache, oracle, &previous, &word).await?;

        self.state.current_chain.push(word);
        self.state.word_progresses.push(progress);
        Ok(self.settle(progress, complete))
    }

    /// Replace `chain[index]` with `word`, dropping everything after it.
    pub async fn edit(
        &mut self,
        cache: &EmbeddingCache,
        oracle: Option<&dyn RelatednessOracle>,
        index: usize,
        word: &str,
    ) -> Result<Outcome, WordlinkError> {
        self.require_active("edit")?;
        if index == 0 || index >= self.state.current_chain.len() {
            return Err(WordlinkError::InvalidState(format!(
                "cannot edit position {} of a {}-word chain",
                index,
                self.state.current_chain.len()
            )));
        }
        let word = normalize_word(word);
        let previous = self.state.current_chain[index - 1].clone();

        let (progress, complete) = self.evaluate(cache, oracle, &previous, &word).await?;

        self.state.current_chain.truncate(index);
        self.state.word_progresses.truncate(index - 1);
        self.state.current_chain.push(word);
        self.state.word_progresses.push(progress);
        Ok(self.settle(progress, complete))
    }

    /// Drop the last word. Returns it.
    pub fn undo(&mut self) -> Result<String, WordlinkError> {
        self.require_active("undo")?;
        if self.state.current_chain.len() <= 1 {
            return Err(WordlinkError::InvalidState(
                "nothing to undo: chain holds only the start word".to_string(),
            ));
        }
        self.state.word_progresses.pop();
        let removed = self.state.current_chain.pop().unwrap_or_default();
        self.state.score = self.state.current_chain.len() - 1;
        tracing::debug!("Undo: removed \"{}\"", removed);
        Ok(removed)
    }

    /// Restart the current pair from the start word.
    pub fn retry(&mut self) {
        tracing::info!("Retrying {} -> {}", self.state.start_word, self.state.target_word);
        self.state = GameState::new(&self.state.start_word, &self.state.target_word);
    }

    /// Start over with a fresh pair.
    pub fn new_game(&mut self, start_word: &str, target_word: &str) {
        self.state = GameState::new(&normalize_word(start_word), &normalize_word(target_word));
        tracing::info!("New game: {} -> {}", self.state.start_word, self.state.target_word);
    }

    /// Decide whether `word` may follow `previous`, and score it.
    ///
    /// Returns the word's progress toward the target and whether it
    /// completes the chain.
    async fn evaluate(
        &self,
        cache: &EmbeddingCache,
        oracle: Option<&dyn RelatednessOracle>,
        previous: &str,
        word: &str,
    ) -> Result<(f32, bool), WordlinkError> {
        cache.ensure_loaded().await?;
        if !cache.is_valid_word(word) {
            return Err(WordlinkError::NoBaseform(word.to_string()));
        }

        let linked = match word_similarity(cache, previous, word).await {
            Ok(sim) => {
                tracing::debug!("Similarity {} ~ {} = {:.3}", previous, word, sim);
                sim >= self.rules.adjacency_threshold
            }
            Err(WordlinkError::FetchFailed(msg)) => return Err(WordlinkError::FetchFailed(msg)),
            Err(e) => {
                tracing::warn!("Cannot compare \"{}\" with \"{}\": {}", previous, word, e);
                false
            }
        };

        if !linked && !ask_oracle(oracle, previous, word).await {
            return Err(WordlinkError::RejectedWord {
                word: word.to_string(),
                previous: previous.to_string(),
            });
        }

        let target = &self.state.target_word;
        let to_target = word_similarity(cache, word, target).await?;
        let progress = self.rules.scale.progress(to_target);
        Ok((progress, to_target >= self.rules.completion_threshold))
    }

    fn settle(&mut self, progress: f32, complete: bool) -> Outcome {
        self.state.score = self.state.current_chain.len() - 1;
        if complete {
            self.state.is_complete = true;
            tracing::info!(
                "Chain complete: {} -> {} in {} steps",
                self.state.start_word,
                self.state.target_word,
                self.state.score
            );
            Outcome::Completed { progress }
        } else {
            Outcome::Accepted { progress }
        }
    }
}

async fn ask_oracle(oracle: Option<&dyn RelatednessOracle>, previous: &str, word: &str) -> bool {
    let Some(oracle) = oracle else {
        return false;
    };
    match oracle.are_related(previous, word).await {
        Ok(true) => {
            tracing::info!("Oracle links \"{}\" and \"{}\"", previous, word);
            true
        }
        Ok(false) => false,
        Err(e) => {
            tracing::warn!("Relatedness oracle failed for {}/{}: {}", previous, word, e);
            false
        }
    }
}

/// Progress of each word after the first in `chain`.
pub async fn recalculate_progress(
    cache: &EmbeddingCache,
    chain: &[String],
    target: &str,
    scale: &ProgressScale,
) -> Result<Vec<f32>, WordlinkError> {
    let mut progresses = Vec::with_capacity(chain.len().saturating_sub(1));
    for word in chain.iter().skip(1) {
        let sim = word_similarity(cache, word, target).await?;
        progresses.push(scale.progress(sim));
    }
    Ok(progresses)
}
