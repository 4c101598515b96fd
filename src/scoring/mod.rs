//! Weighted cosine similarity between items.
//!
//! `combined = w_img * cos(image) + w_txt * cos(text)`, default weights `0.6` / `0.4`.

pub mod error;
pub mod scorer;
pub mod types;


pub use error::{InvalidWeights, ScoringError, ScoringResult};
pub use scorer::{SimilarityScorer, cosine_similarity};
pub use types::{ScoringWeights, SimilarityBreakdown};
