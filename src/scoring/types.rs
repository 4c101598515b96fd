use serde::Serialize;

use crate::constants::{DEFAULT_IMAGE_WEIGHT, DEFAULT_TEXT_WEIGHT};

use super::error::InvalidWeights;

const WEIGHT_SUM_TOLERANCE: f32 = 1e-4;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
/// Image/text blend for the combined score.
pub struct ScoringWeights {
    image: f32,
    text: f32,
}

impl Default for ScoringWeights {
    fn default() -> Self {
        Self {
            image: DEFAULT_IMAGE_WEIGHT,
            text: DEFAULT_TEXT_WEIGHT,
        }
    }
}

impl ScoringWeights {
    /// Each weight must be in `[0, 1]` and together they must sum to `1.0`.
    pub fn new(image: f32, text: f32) -> Result<Self, InvalidWeights> {
        for w in [image, text] {
            if !w.is_finite() || !(0.0..=1.0).contains(&w) {
                return Err(InvalidWeights::new(
                    image,
                    text,
                    "each weight must be within [0, 1]",
                ));
            }
        }
        if ((image + text) - 1.0).abs() > WEIGHT_SUM_TOLERANCE {
            return Err(InvalidWeights::new(image, text, "weights must sum to 1.0"));
        }
        Ok(Self { image, text })
    }

    #[inline]
    pub fn image(&self) -> f32 {
        self.image
    }

    #[inline]
    pub fn text(&self) -> f32 {
        self.text
    }

    pub fn blend(&self, image_sim: f32, text_sim: f32) -> f32 {
        self.image * image_sim + self.text * text_sim
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
/// Per-modality similarities and their weighted combination.
pub struct SimilarityBreakdown {
    pub image_sim: f32,
    pub text_sim: f32,
    pub combined: f32,
}

impl SimilarityBreakdown {
    /// Returns `true` if the combined score meets or exceeds `threshold`.
    pub fn meets(&self, threshold: f32) -> bool {
        self.combined >= threshold
    }
}

impl std::fmt::Display for SimilarityBreakdown {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "combined={:.4} (image={:.4}, text={:.4})",
            self.combined, self.image_sim, self.text_sim
        )
    }
}
