use serde::Serialize;

use crate::constants::{DEFAULT_MATCH_THRESHOLD, NOMINAL_MATCH_THRESHOLD};
use crate::storage::{ItemId, Match};

#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize)]
#[serde(transparent)]
/// Minimum combined score for a match; finite and within `[-1, 1]`.
pub struct MatchThreshold(f32);

impl MatchThreshold {
    /// Threshold used when a new report is submitted.
    pub const REPORT: MatchThreshold = MatchThreshold(DEFAULT_MATCH_THRESHOLD);
    /// Looser threshold for ad-hoc re-matching.
    pub const NOMINAL: MatchThreshold = MatchThreshold(NOMINAL_MATCH_THRESHOLD);

    pub fn new(value: f32) -> Option<Self> {
        (value.is_finite() && (-1.0..=1.0).contains(&value)).then_some(Self(value))
    }

    #[inline]
    pub fn value(self) -> f32 {
        self.0
    }
}

impl std::fmt::Display for MatchThreshold {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:.2}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
/// Why a matching pass did not scan the pool.
pub enum PassSkipped {
    /// The new item lacks an image or text embedding.
    MissingEmbeddings,
    /// The new item is no longer active.
    NotActive,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
/// Result of one matching pass for a newly reported item.
pub struct MatchReport {
    pub item_id: ItemId,
    pub skipped: Option<PassSkipped>,
    /// Candidates in the opposite active pool.
    pub scanned: usize,
    /// Candidates that could not be scored (missing or incompatible embeddings).
    pub unscored: usize,
    pub below_threshold: usize,
    /// Qualifying pairs that already had a match record.
    pub duplicates: usize,
    pub created: Vec<Match>,
}

impl MatchReport {
    pub(crate) fn empty(item_id: ItemId) -> Self {
        Self {
            item_id,
            skipped: None,
            scanned: 0,
            unscored: 0,
            below_threshold: 0,
            duplicates: 0,
            created: Vec::new(),
        }
    }

    pub(crate) fn skipped(item_id: ItemId, reason: PassSkipped) -> Self {
        Self {
            skipped: Some(reason),
            ..Self::empty(item_id)
        }
    }

    pub fn match_count(&self) -> usize {
        self.created.len()
    }
}
