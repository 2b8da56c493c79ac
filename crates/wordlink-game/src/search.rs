// crates/wordlink-game/src/search.rs
//
// Bounded randomized searches over the word list.
//
// - Random pair: two distinct words whose similarity falls inside a band.
// - Daily pair: the same search with an RNG seeded from the calendar date.
// - Hint: a word that links to the previous chain word, relaxing its
//   constraints in three phases of 100 attempts.

use chrono::NaiveDate;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use wordlink_core::error::WordlinkError;
use wordlink_core::similarity::cosine_similarity;
use wordlink_store::EmbeddingCache;

use crate::chain::ChainRules;

/// Attempt budget for pair search.
pub const PAIR_ATTEMPTS: usize = 300;

/// Attempts per hint phase; there are three phases.
pub const HINT_PHASE_ATTEMPTS: usize = 100;

/// Similarity multiplier on the adjacency threshold during the strict
/// hint phases.
const STRICT_MULTIPLIER: f32 = 2.0;

/// Inclusive similarity range a start/target pair must fall in.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Band {
    pub min: f32,
    pub max: f32,
}

impl Band {
    pub fn new(min: f32, max: f32) -> Self {
        Self { min, max }
    }

    pub fn contains(&self, similarity: f32) -> bool {
        self.min <= similarity && similarity <= self.max
    }
}

/// A start/target pair and the similarity between them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WordPair {
    pub start: String,
    pub target: String,
    pub similarity: f32,
}

/// Inputs to hint search.
#[derive(Debug, Clone)]
pub struct HintRequest<'a> {
    pub previous_word: &'a str,
    pub target_word: &'a str,
    /// Progress of the last chain word (0-100).
    pub current_progress: f32,
    /// Words already in the chain; never suggested.
    pub used_words: &'a [String],
}

/// Cosine similarity between two surface words.
pub async fn word_similarity(
    cache: &EmbeddingCache,
    a: &str,
    b: &str,
) -> Result<f32, WordlinkError> {
    let va = cache.vector_for(a).await?;
    let vb = cache.vector_for(b).await?;
    cosine_similarity(&va, &vb)
}

/// Whether a lookup error only disqualifies the word at hand.
///
/// Transport failures are not: the caller should hear about them.
fn is_word_miss(e: &WordlinkError) -> bool {
    !matches!(e, WordlinkError::FetchFailed(_))
}

/// Sample two distinct words whose similarity lies in `band`.
pub async fn find_random_pair<R>(
    cache: &EmbeddingCache,
    band: Band,
    rng: &mut R,
) -> Result<WordPair, WordlinkError>
where
    R: Rng,
{
    cache.ensure_loaded().await?;
    let words = cache.word_list();
    if words.len() < 2 {
        tracing::warn!("Pair search: word list has {} words", words.len());
        return Err(WordlinkError::NoPairFound(0));
    }

    for attempt in 0..PAIR_ATTEMPTS {
        let start = &words[rng.gen_range(0..words.len())];
        let target = &words[rng.gen_range(0..words.len())];
        if start == target {
            continue;
        }

        let similarity = match word_similarity(cache, start, target).await {
            Ok(sim) => sim,
            Err(e) if is_word_miss(&e) => {
                tracing::debug!("Pair search: skipping {}/{}: {}", start, target, e);
                continue;
            }
            Err(e) => return Err(e),
        };

        if band.contains(similarity) {
            tracing::info!(
                "Pair search: {} -> {} (similarity {:.3}) after {} attempts",
                start,
                target,
                similarity,
                attempt + 1
            );
            return Ok(WordPair {
                start: start.clone(),
                target: target.clone(),
                similarity,
            });
        }
    }

    tracing::warn!(
        "Pair search: no pair in [{:.3}, {:.3}] after {} attempts",
        band.min,
        band.max,
        PAIR_ATTEMPTS
    );
    Err(WordlinkError::NoPairFound(PAIR_ATTEMPTS))
}

/// Seed for the daily pair: the first 8 bytes of SHA-256("YYYY-MM-DD").
pub fn daily_seed(date: NaiveDate) -> u64 {
    let mut hasher = Sha256::new();
    hasher.update(date.format("%Y-%m-%d").to_string().as_bytes());
    let digest = hasher.finalize();

    let mut bytes = [0u8; 8];
    bytes.copy_from_slice(&digest[..8]);
    u64::from_le_bytes(bytes)
}

/// The pair every player gets on `date`.
pub async fn find_daily_pair(
    cache: &EmbeddingCache,
    band: Band,
    date: NaiveDate,
) -> Result<WordPair, WordlinkError> {
    let mut rng = StdRng::seed_from_u64(daily_seed(date));
    find_random_pair(cache, band, &mut rng).await
}

/// Search for a word that extends the chain from `request.previous_word`.
///
/// Phase 1 wants a strong link to the previous word and more progress
/// toward the target. Phase 2 drops the progress requirement. Phase 3
/// accepts any link meeting the plain adjacency threshold. Returns
/// `Ok(None)` when every phase comes up empty.
pub async fn find_hint<R>(
    cache: &EmbeddingCache,
    request: &HintRequest<'_>,
    rules: &ChainRules,
    rng: &mut R,
) -> Result<Option<String>, WordlinkError>
where
    R: Rng,
{
    cache.ensure_loaded().await?;
    let words = cache.word_list();
    if words.is_empty() {
        return Ok(None);
    }

    let previous = cache.vector_for(request.previous_word).await?;
    let target = cache.vector_for(request.target_word).await?;

    let mut require_progress_improvement = true;
    let mut use_stricter_threshold = true;

    for attempt in 0..HINT_PHASE_ATTEMPTS * 3 {
        if attempt == HINT_PHASE_ATTEMPTS {
            tracing::debug!("Hint search: dropping progress requirement");
            require_progress_improvement = false;
        } else if attempt == HINT_PHASE_ATTEMPTS * 2 {
            tracing::debug!("Hint search: dropping stricter threshold");
            use_stricter_threshold = false;
        }

        let candidate = &words[rng.gen_range(0..words.len())];
        if request.used_words.iter().any(|w| w == candidate) {
            continue;
        }

        let vector = match cache.vector_for(candidate).await {
            Ok(v) => v,
            Err(e) if is_word_miss(&e) => continue,
            Err(e) => return Err(e),
        };

        let link = match cosine_similarity(&vector, &previous) {
            Ok(sim) => sim,
            Err(e) => {
                tracing::debug!("Hint search: cannot compare \"{}\": {}", candidate, e);
                continue;
            }
        };
        let threshold = if use_stricter_threshold {
            rules.adjacency_threshold * STRICT_MULTIPLIER
        } else {
            rules.adjacency_threshold
        };
        if link < threshold {
            continue;
        }

        if require_progress_improvement {
            let toward_target = match cosine_similarity(&vector, &target) {
                Ok(sim) => sim,
                Err(e) => {
                    tracing::debug!("Hint search: cannot compare \"{}\": {}", candidate, e);
                    continue;
                }
            };
            if rules.scale.progress(toward_target) <= request.current_progress {
                continue;
            }
        }

        tracing::info!(
            "Hint search: suggesting \"{}\" after {} attempts",
            candidate,
            attempt + 1
        );
        return Ok(Some(candidate.clone()));
    }

    tracing::info!("Hint search: nothing found for \"{}\"", request.previous_word);
    Ok(None)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use wordlink_store::{InMemoryLexicon, InMemoryVectorRecords};

    /// Four words on a plane: `north` and `east` are orthogonal, `northeast`
    /// sits between them, `south` opposes `north`.
    fn compass() -> EmbeddingCache {
        let words = ["north", "east", "northeast", "south"];
        let pairs: Vec<(&str, &str)> = words.iter().map(|w| (*w, *w)).collect();
        let lexicon = Arc::new(InMemoryLexicon::from_pairs(&pairs, &words));

        let records = Arc::new(InMemoryVectorRecords::new());
        records.insert("north", &[0.0, 1.0]);
        records.insert("east", &[1.0, 0.0]);
        records.insert("northeast", &[1.0, 1.0]);
        records.insert("south", &[0.0, -1.0]);
        EmbeddingCache::per_word(lexicon, records, 2)
    }

    #[test]
    fn test_band_contains_is_inclusive() {
        let band = Band::new(0.0, 0.1);
        assert!(band.contains(0.0));
        assert!(band.contains(0.1));
        assert!(!band.contains(0.11));
        assert!(!band.contains(-0.01));
    }

    #[tokio::test]
    async fn test_random_pair_falls_in_band() {
        let cache = compass();
        let mut rng = StdRng::seed_from_u64(7);
        // Only north/east (and east/south) are orthogonal.
        let pair = find_random_pair(&cache, Band::new(-0.01, 0.01), &mut rng)
            .await
            .unwrap();
        assert_ne!(pair.start, pair.target);
        assert!(pair.similarity.abs() <= 0.01);
    }

    #[tokio::test]
    async fn test_random_pair_exhaustion() {
        let cache = compass();
        let mut rng = StdRng::seed_from_u64(1);
        let err = find_random_pair(&cache, Band::new(2.0, 3.0), &mut rng)
            .await
            .unwrap_err();
        assert!(matches!(err, WordlinkError::NoPairFound(PAIR_ATTEMPTS)));
    }

    #[tokio::test]
    async fn test_random_pair_needs_two_words() {
        let lexicon = Arc::new(InMemoryLexicon::from_pairs(&[("solo", "solo")], &["solo"]));
        let cache = EmbeddingCache::per_word(lexicon, Arc::new(InMemoryVectorRecords::new()), 2);
        let mut rng = StdRng::seed_from_u64(1);
        let err = find_random_pair(&cache, Band::new(-1.0, 1.0), &mut rng)
            .await
            .unwrap_err();
        assert!(matches!(err, WordlinkError::NoPairFound(0)));
    }

    #[test]
    fn test_daily_seed_depends_on_date() {
        let a = NaiveDate::from_ymd_opt(2024, 3, 1).unwrap();
        let b = NaiveDate::from_ymd_opt(2024, 3, 2).unwrap();
        assert_eq!(daily_seed(a), daily_seed(a));
        assert_ne!(daily_seed(a), daily_seed(b));
    }

    #[tokio::test]
    async fn test_daily_pair_is_deterministic() {
        let cache = compass();
        let date = NaiveDate::from_ymd_opt(2024, 3, 1).unwrap();
        let band = Band::new(-1.0, 1.0);
        let first = find_daily_pair(&cache, band, date).await.unwrap();
        let second = find_daily_pair(&cache, band, date).await.unwrap();
        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn test_hint_never_returns_used_word() {
        let cache = compass();
        let rules = ChainRules::default();
        let used = vec!["north".to_string()];
        let request = HintRequest {
            previous_word: "north",
            target_word: "east",
            current_progress: 0.0,
            used_words: &used,
        };
        for seed in 0..20 {
            let mut rng = StdRng::seed_from_u64(seed);
            let hint = find_hint(&cache, &request, &rules, &mut rng).await.unwrap();
            // Only northeast links to north and moves toward east.
            assert_eq!(hint.as_deref(), Some("northeast"));
        }
    }

    #[tokio::test]
    async fn test_hint_skips_zero_vector_candidates() {
        let words = ["north", "east", "northeast", "void"];
        let pairs: Vec<(&str, &str)> = words.iter().map(|w| (*w, *w)).collect();
        let lexicon = Arc::new(InMemoryLexicon::from_pairs(&pairs, &words));
        let records = Arc::new(InMemoryVectorRecords::new());
        records.insert("north", &[0.0, 1.0]);
        records.insert("east", &[1.0, 0.0]);
        records.insert("northeast", &[1.0, 1.0]);
        records.insert("void", &[0.0, 0.0]);
        let cache = EmbeddingCache::per_word(lexicon, records, 2);

        let rules = ChainRules::default();
        let used = vec!["north".to_string()];
        let request = HintRequest {
            previous_word: "north",
            target_word: "east",
            current_progress: 0.0,
            used_words: &used,
        };
        for seed in 0..20 {
            let mut rng = StdRng::seed_from_u64(seed);
            let hint = find_hint(&cache, &request, &rules, &mut rng).await.unwrap();
            assert_eq!(hint.as_deref(), Some("northeast"));
        }
    }

    #[tokio::test]
    async fn test_hint_exhaustion_is_none() {
        let cache = compass();
        let rules = ChainRules::default();
        let used: Vec<String> = ["north", "east", "northeast", "south"]
            .iter()
            .map(|w| w.to_string())
            .collect();
        let request = HintRequest {
            previous_word: "north",
            target_word: "east",
            current_progress: 0.0,
            used_words: &used,
        };
        let mut rng = StdRng::seed_from_u64(3);
        assert_eq!(find_hint(&cache, &request, &rules, &mut rng).await.unwrap(), None);
    }
}
