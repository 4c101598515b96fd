use tracing::{debug, info, instrument, warn};

use crate::scoring::SimilarityScorer;
use crate::storage::{Item, ItemStatus, ItemType, NewMatch, UnitOfWork};

use super::error::MatchingResult;
use super::types::{MatchReport, MatchThreshold, PassSkipped};

#[derive(Debug, Clone, Copy)]
/// Scores a new item against the opposite active pool and stages pending matches.
pub struct MatchEngine {
    scorer: SimilarityScorer,
    dedupe: bool,
}

impl MatchEngine {
    /// `dedupe` skips pairs that already have a match record from an earlier pass.
    pub fn new(scorer: SimilarityScorer, dedupe: bool) -> Self {
        Self { scorer, dedupe }
    }

    pub fn scorer(&self) -> &SimilarityScorer {
        &self.scorer
    }

    pub fn dedupe(&self) -> bool {
        self.dedupe
    }

    /// Runs one matching pass for `new_item` inside `tx`.
    ///
    /// Candidates are active items of the opposite type saved before `new_item`.
    ///
    /// Matches are written to `tx` only after the whole pool has been scored;
    /// the caller commits. Any error leaves `tx` without new matches.
    #[instrument(
        skip(self, tx, new_item),
        fields(item_id = %new_item.id, item_type = %new_item.item_type, threshold = threshold.value())
    )]
    pub fn find_matches<T>(
        &self,
        tx: &mut T,
        new_item: &Item,
        threshold: MatchThreshold,
    ) -> MatchingResult<MatchReport>
    where
        T: UnitOfWork + ?Sized,
    {
        if !new_item.is_matchable() {
            warn!(
                has_image = new_item.image_embedding.is_some(),
                has_text = new_item.text_embedding.is_some(),
                "Item is missing embeddings; skipping matching"
            );
            return Ok(MatchReport::skipped(
                new_item.id,
                PassSkipped::MissingEmbeddings,
            ));
        }
        if !new_item.is_active() {
            warn!("Item is no longer active; skipping matching");
            return Ok(MatchReport::skipped(new_item.id, PassSkipped::NotActive));
        }

        // Ids are allocated in commit order. A candidate saved after `new_item`
        // runs its own pass and sees `new_item` there, so each pair is scored once.
        let mut pool =
            tx.items_by_type_and_status(new_item.item_type.opposite(), ItemStatus::Active)?;
        let before = pool.len();
        pool.retain(|candidate| candidate.id < new_item.id);
        if pool.len() < before {
            debug!(later = before - pool.len(), "Leaving later reports to their own pass");
        }

        let mut report = MatchReport::empty(new_item.id);
        report.scanned = pool.len();

        if pool.is_empty() {
            debug!("Candidate pool is empty");
            return Ok(report);
        }

        let mut staged = Vec::new();
        for candidate in &pool {
            let breakdown = match self.scorer.combined_score(new_item, candidate) {
                Ok(Some(breakdown)) => breakdown,
                Ok(None) => {
                    debug!(candidate = %candidate.id, "Candidate missing embeddings");
                    report.unscored += 1;
                    continue;
                }
                Err(e) => {
                    debug!(candidate = %candidate.id, error = %e, "Candidate not comparable");
                    report.unscored += 1;
                    continue;
                }
            };

            if !breakdown.meets(threshold.value()) {
                report.below_threshold += 1;
                continue;
            }

            let (lost_item_id, found_item_id) = match new_item.item_type {
                ItemType::Lost => (new_item.id, candidate.id),
                ItemType::Found => (candidate.id, new_item.id),
            };

            if self.dedupe && tx.match_exists(lost_item_id, found_item_id)? {
                debug!(
                    lost_item = %lost_item_id,
                    found_item = %found_item_id,
                    "Match already recorded; skipping"
                );
                report.duplicates += 1;
                continue;
            }

            debug!(candidate = %candidate.id, %breakdown, "Candidate meets threshold");
            staged.push(NewMatch {
                lost_item_id,
                found_item_id,
                similarity_score: breakdown.combined,
            });
        }

        for new_match in staged {
            report.created.push(tx.insert_match(new_match)?);
        }

        info!(
            scanned = report.scanned,
            unscored = report.unscored,
            below_threshold = report.below_threshold,
            duplicates = report.duplicates,
            created = report.created.len(),
            "Matching pass complete"
        );

        Ok(report)
    }
}
