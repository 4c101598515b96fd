use tracing::trace;

use crate::embedding::EmbeddingVector;
use crate::storage::Item;

use super::error::{ScoringError, ScoringResult};
use super::types::{ScoringWeights, SimilarityBreakdown};

/// Cosine similarity of two raw slices.
///
/// Returns `0.0` for empty or mismatched inputs and when either side has zero magnitude.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() || a.is_empty() {
        return 0.0;
    }

    // f64 accumulators: squares of finite f32 components near f32::MAX stay finite.
    let (mut dot_product, mut norm_a, mut norm_b) = (0.0f64, 0.0f64, 0.0f64);
    for (&x, &y) in a.iter().zip(b.iter()) {
        let (x, y) = (f64::from(x), f64::from(y));
        dot_product += x * y;
        norm_a += x * x;
        norm_b += y * y;
    }

    if norm_a == 0.0 || norm_b == 0.0 {
        0.0
    } else {
        (dot_product / (norm_a.sqrt() * norm_b.sqrt())) as f32
    }
}

#[derive(Debug, Clone, Copy, Default)]
/// Weighted image+text similarity between two items. Pure; touches no store.
pub struct SimilarityScorer {
    weights: ScoringWeights,
}

impl SimilarityScorer {
    pub fn new(weights: ScoringWeights) -> Self {
        Self { weights }
    }

    pub fn weights(&self) -> ScoringWeights {
        self.weights
    }

    /// Scores `candidate` against `new_item`.
    ///
    /// `Ok(None)` when either item is missing an embedding; such pairs are never scored.
    pub fn combined_score(
        &self,
        new_item: &Item,
        candidate: &Item,
    ) -> ScoringResult<Option<SimilarityBreakdown>> {
        let (Some(new_image), Some(new_text), Some(cand_image), Some(cand_text)) = (
            new_item.image_embedding.as_ref(),
            new_item.text_embedding.as_ref(),
            candidate.image_embedding.as_ref(),
            candidate.text_embedding.as_ref(),
        ) else {
            return Ok(None);
        };

        let image_sim = similarity("image", new_image, cand_image)?;
        let text_sim = similarity("text", new_text, cand_text)?;
        let combined = self.weights.blend(image_sim, text_sim);

        trace!(
            new_item = %new_item.id,
            candidate = %candidate.id,
            image_sim,
            text_sim,
            combined,
            "Scored candidate"
        );

        Ok(Some(SimilarityBreakdown {
            image_sim,
            text_sim,
            combined,
        }))
    }
}

fn similarity(
    field: &'static str,
    a: &EmbeddingVector,
    b: &EmbeddingVector,
) -> ScoringResult<f32> {
    a.cosine_similarity(b)
        .map_err(|_| ScoringError::DimensionMismatch {
            field,
            expected: a.dim(),
            actual: b.dim(),
        })
}
