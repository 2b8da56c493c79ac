// crates/wordlink-core/src/vector.rs

use std::ops::Deref;
use std::sync::Arc;

/// Dimensionality of the shipped word embeddings.
pub const DEFAULT_DIMENSIONS: usize = 300;

/// An immutable decoded word embedding.
///
/// Backed by `Arc<[f32]>` so the cache can hand out clones without copying
/// the 300 floats.
#[derive(Debug, Clone, PartialEq)]
pub struct WordVector(Arc<[f32]>);

impl WordVector {
    /// Wrap already-decoded values.
    pub fn new(values: Vec<f32>) -> Self {
        Self(values.into())
    }

    /// Number of dimensions.
    pub fn dimensions(&self) -> usize {
        self.0.len()
    }

    pub fn as_slice(&self) -> &[f32] {
        &self.0
    }

    /// Component-wise negation, mostly useful in tests.
    pub fn negated(&self) -> Self {
        Self::new(self.0.iter().map(|v| -v).collect())
    }
}

impl Deref for WordVector {
    type Target = [f32];

    fn deref(&self) -> &[f32] {
        &self.0
    }
}

impl From<Vec<f32>> for WordVector {
    fn from(values: Vec<f32>) -> Self {
        Self::new(values)
    }
}
