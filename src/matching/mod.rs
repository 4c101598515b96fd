//! Threshold-gated matching of a new item against the opposite category.

pub mod engine;
pub mod error;
pub mod types;


pub use engine::MatchEngine;
pub use error::{MatchingError, MatchingResult};
pub use types::{MatchReport, MatchThreshold, PassSkipped};
