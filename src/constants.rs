//! Cross-cutting, shared constants.
//!
//! # Dimension Invariants
//!
//! Image and text embeddings live in one shared vector space, so every stored
//! vector must have the same dimension for cosine comparison to mean anything.
//! The compile-time default matches CLIP ViT-B/32; use [`DimConfig`] when the
//! dimension comes from configuration and [`validate_embedding_dim`] at the
//! embedder boundary.

use thiserror::Error;

/// Output dimension of CLIP ViT-B/32 projections.
pub const DEFAULT_EMBEDDING_DIM: usize = 512;

/// Threshold used on the report-submission path.
pub const DEFAULT_MATCH_THRESHOLD: f32 = 0.70;

/// Looser threshold historically used for ad-hoc matching passes.
pub const NOMINAL_MATCH_THRESHOLD: f32 = 0.60;

pub const DEFAULT_IMAGE_WEIGHT: f32 = 0.6;
pub const DEFAULT_TEXT_WEIGHT: f32 = 0.4;

/// Coins credited to a finder when a return is confirmed.
pub const DEFAULT_REWARD_COINS: u64 = 100;

/// CLIP text encoder context length.
pub const CLIP_MAX_TEXT_TOKENS: usize = 77;

/// CLIP vision encoder input resolution (square).
pub const CLIP_IMAGE_SIZE: usize = 224;

/// Upper bound accepted for a configured embedding dimension.
pub const MAX_EMBEDDING_DIM: usize = 4096;

/// Runtime dimension configuration shared by the embedder and the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DimConfig {
    /// The embedding vector dimension (number of floats).
    pub embedding_dim: usize,
}

impl Default for DimConfig {
    fn default() -> Self {
        Self {
            embedding_dim: DEFAULT_EMBEDDING_DIM,
        }
    }
}

impl DimConfig {
    pub fn new(embedding_dim: usize) -> Self {
        Self { embedding_dim }
    }

    /// Rejects zero and implausibly large dimensions.
    pub fn validate(&self) -> Result<(), DimValidationError> {
        if self.embedding_dim == 0 {
            return Err(DimValidationError::ZeroDimension);
        }
        if self.embedding_dim > MAX_EMBEDDING_DIM {
            return Err(DimValidationError::TooLarge {
                dim: self.embedding_dim,
                max: MAX_EMBEDDING_DIM,
            });
        }
        Ok(())
    }
}

/// Error returned when dimension validation fails.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DimValidationError {
    #[error("embedding dimension cannot be zero")]
    ZeroDimension,

    #[error("embedding dimension {dim} exceeds maximum {max}")]
    TooLarge { dim: usize, max: usize },

    #[error("dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },
}

/// Validates that a runtime embedding dimension matches the expected dimension.
///
/// ```
/// use lostfound::constants::{validate_embedding_dim, DEFAULT_EMBEDDING_DIM};
///
/// validate_embedding_dim(512, DEFAULT_EMBEDDING_DIM).unwrap();
/// assert!(validate_embedding_dim(768, DEFAULT_EMBEDDING_DIM).is_err());
/// ```
pub fn validate_embedding_dim(actual: usize, expected: usize) -> Result<(), DimValidationError> {
    if actual != expected {
        return Err(DimValidationError::DimensionMismatch { expected, actual });
    }
    Ok(())
}
