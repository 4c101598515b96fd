use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum ScoringError {
    #[error("{field} embedding dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch {
        field: &'static str,
        expected: usize,
        actual: usize,
    },
}

#[derive(Debug, Error, Clone, Copy, PartialEq)]
#[error("invalid scoring weights (image={image}, text={text}): {reason}")]
/// Rejected [`ScoringWeights`](super::ScoringWeights) pair.
pub struct InvalidWeights {
    pub image: f32,
    pub text: f32,
    reason: &'static str,
}

impl InvalidWeights {
    pub(super) fn new(image: f32, text: f32, reason: &'static str) -> Self {
        Self {
            image,
            text,
            reason,
        }
    }

    pub fn reason(&self) -> &'static str {
        self.reason
    }
}

pub type ScoringResult<T> = Result<T, ScoringError>;
