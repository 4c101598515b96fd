//! Shared, immutable embedding vectors.

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use super::error::EmbeddingError;
use crate::constants::DimValidationError;
use crate::scoring::cosine_similarity;

/// A fixed-length `f32` embedding.
///
/// Cloning is cheap (the components are reference counted), so items carrying
/// embeddings can be copied in and out of the store freely. Components are
/// always finite and the vector is never empty.
///
/// ```
/// use lostfound::embedding::EmbeddingVector;
///
/// let a = EmbeddingVector::new(vec![1.0, 0.0]).unwrap();
/// let b = EmbeddingVector::new(vec![0.0, 2.0]).unwrap();
/// assert_eq!(a.cosine_similarity(&b).unwrap(), 0.0);
/// ```
#[derive(Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<f32>", into = "Vec<f32>")]
pub struct EmbeddingVector(Arc<[f32]>);

impl EmbeddingVector {
    /// Wraps `values`, rejecting empty vectors and NaN/infinite components.
    pub fn new(values: Vec<f32>) -> Result<Self, EmbeddingError> {
        if values.is_empty() {
            return Err(EmbeddingError::InvalidVector {
                reason: "vector is empty".to_string(),
            });
        }
        if let Some(pos) = values.iter().position(|v| !v.is_finite()) {
            return Err(EmbeddingError::InvalidVector {
                reason: format!("component {} is not finite", pos),
            });
        }
        Ok(Self(values.into()))
    }

    /// Wraps `values` after scaling them to unit length (zero vectors are kept as-is).
    pub fn normalized(mut values: Vec<f32>) -> Result<Self, EmbeddingError> {
        let norm = l2_norm(&values);
        if norm > 0.0 && norm.is_finite() {
            for v in &mut values {
                *v /= norm;
            }
        }
        Self::new(values)
    }

    #[inline]
    pub fn dim(&self) -> usize {
        self.0.len()
    }

    #[inline]
    pub fn as_slice(&self) -> &[f32] {
        &self.0
    }

    pub fn norm(&self) -> f32 {
        l2_norm(&self.0)
    }

    /// Returns `true` if every component is zero.
    pub fn is_zero(&self) -> bool {
        self.0.iter().all(|v| *v == 0.0)
    }

    /// Cosine similarity against `other`; zero-magnitude vectors score `0.0`.
    pub fn cosine_similarity(&self, other: &Self) -> Result<f32, DimValidationError> {
        if self.dim() != other.dim() {
            return Err(DimValidationError::DimensionMismatch {
                expected: self.dim(),
                actual: other.dim(),
            });
        }
        Ok(cosine_similarity(&self.0, &other.0))
    }
}

impl TryFrom<Vec<f32>> for EmbeddingVector {
    type Error = EmbeddingError;

    fn try_from(values: Vec<f32>) -> Result<Self, Self::Error> {
        Self::new(values)
    }
}

impl From<EmbeddingVector> for Vec<f32> {
    fn from(vector: EmbeddingVector) -> Self {
        vector.0.to_vec()
    }
}

impl fmt::Debug for EmbeddingVector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EmbeddingVector")
            .field("dim", &self.dim())
            .field("head", &&self.0[..self.dim().min(4)])
            .finish()
    }
}

fn l2_norm(values: &[f32]) -> f32 {
    values
        .iter()
        .map(|&x| f64::from(x) * f64::from(x))
        .sum::<f64>()
        .sqrt() as f32
}
