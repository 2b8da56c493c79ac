// crates/wordlink-core/src/similarity.rs
//
// Cosine similarity over resolved word vectors, and the affine remap of a
// similarity value onto the player-facing 0-100 progress scale.
//
// Both functions are pure and synchronous. All fetching happens in the
// embedding cache before a comparison is made.

use serde::{Deserialize, Serialize};

use crate::error::WordlinkError;

/// Compute cosine similarity between two vectors.
///
/// Accumulates in `f64`. A zero-magnitude input or a non-finite result is a
/// `DegenerateVector` error rather than a silent 0.0.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> Result<f32, WordlinkError> {
    if a.len() != b.len() {
        return Err(WordlinkError::DimensionMismatch {
            left: a.len(),
            right: b.len(),
        });
    }

    let mut dot = 0.0_f64;
    let mut norm_a = 0.0_f64;
    let mut norm_b = 0.0_f64;

    for (x, y) in a.iter().zip(b.iter()) {
        let x = *x as f64;
        let y = *y as f64;
        dot += x * y;
        norm_a += x * x;
        norm_b += y * y;
    }

    let denom = norm_a.sqrt() * norm_b.sqrt();
    if denom == 0.0 {
        return Err(WordlinkError::DegenerateVector(
            "zero-magnitude vector".to_string(),
        ));
    }

    let sim = dot / denom;
    if !sim.is_finite() {
        return Err(WordlinkError::DegenerateVector(format!(
            "non-finite similarity ({})",
            sim
        )));
    }

    // Rounding can push identical vectors a hair past 1.0.
    Ok(sim.clamp(-1.0, 1.0) as f32)
}

/// Calibration of the progress bar: which similarity reads as 0% and which
/// reads as 100%.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ProgressScale {
    /// Similarity at (and below) which progress is 0.
    pub zero_at: f32,
    /// Similarity at (and above) which progress is 100.
    pub full_at: f32,
}

impl ProgressScale {
    /// Keyed to target arrival: 100% coincides with the default completion
    /// threshold of 0.3.
    pub const TARGET_ARRIVAL: ProgressScale = ProgressScale {
        zero_at: -0.1,
        full_at: 0.3,
    };

    /// Looser band used for hint feedback in earlier builds.
    pub const LOOSE: ProgressScale = ProgressScale {
        zero_at: -0.2,
        full_at: 0.25,
    };

    /// Build a scale, rejecting inverted or empty ranges.
    pub fn new(zero_at: f32, full_at: f32) -> Result<Self, WordlinkError> {
        let scale = Self { zero_at, full_at };
        scale.validate()?;
        Ok(scale)
    }

    /// Check that `full_at > zero_at` and both are finite.
    pub fn validate(&self) -> Result<(), WordlinkError> {
        if !self.zero_at.is_finite() || !self.full_at.is_finite() || self.full_at <= self.zero_at {
            return Err(WordlinkError::Config(format!(
                "progress scale needs zero_at < full_at (got {} .. {})",
                self.zero_at, self.full_at
            )));
        }
        Ok(())
    }

    /// Map a similarity onto `[0, 100]`.
    pub fn progress(&self, similarity: f32) -> f32 {
        if similarity.is_nan() {
            return 0.0;
        }
        let raw = (similarity - self.zero_at) / (self.full_at - self.zero_at) * 100.0;
        raw.clamp(0.0, 100.0)
    }
}

impl Default for ProgressScale {
    fn default() -> Self {
        Self::TARGET_ARRIVAL
    }
}
