use tracing::{info, instrument, warn};

use crate::constants::DEFAULT_REWARD_COINS;
use crate::storage::{ItemId, ItemStatus, MatchId, MatchStatus, UnitOfWork, UserId};

use super::error::{LifecycleError, LifecycleResult};
use super::types::ReturnOutcome;

#[derive(Debug, Clone, Copy)]
/// Drives a match from `pending` to `returned` and pays the finder.
pub struct MatchLifecycle {
    reward_coins: u64,
}

impl Default for MatchLifecycle {
    fn default() -> Self {
        Self::new(DEFAULT_REWARD_COINS)
    }
}

impl MatchLifecycle {
    pub fn new(reward_coins: u64) -> Self {
        Self { reward_coins }
    }

    pub fn reward_coins(&self) -> u64 {
        self.reward_coins
    }

    /// Confirms that the lost item in `match_id` was returned, acting as `acting_user`.
    ///
    /// Only the lost item's owner may confirm. The match and both items move to
    /// `returned` and, unless both items belong to the same user, the finder is
    /// credited. All writes go to `tx`; the caller commits.
    #[instrument(skip(self, tx), fields(reward = self.reward_coins))]
    pub fn confirm_return<T>(
        &self,
        tx: &mut T,
        match_id: MatchId,
        acting_user: UserId,
    ) -> LifecycleResult<ReturnOutcome>
    where
        T: UnitOfWork + ?Sized,
    {
        let record = tx
            .match_record(match_id)?
            .ok_or(LifecycleError::MatchNotFound(match_id))?;

        let lost = tx
            .item(record.lost_item_id)?
            .ok_or_else(|| missing_item(match_id, record.lost_item_id))?;
        let found = tx
            .item(record.found_item_id)?
            .ok_or_else(|| missing_item(match_id, record.found_item_id))?;

        if lost.user_id != acting_user {
            warn!(owner = %lost.user_id, "Return confirmation by non-owner rejected");
            return Err(LifecycleError::Unauthorized {
                match_id,
                user: acting_user,
            });
        }

        if !tx.transition_match(match_id, MatchStatus::Pending, MatchStatus::Returned)? {
            info!("Match already returned; confirmation is a no-op");
            return Ok(ReturnOutcome::AlreadyReturned);
        }

        tx.set_item_status(lost.id, ItemStatus::Returned)?;
        tx.set_item_status(found.id, ItemStatus::Returned)?;

        if found.user_id == lost.user_id {
            info!(user = %acting_user, "Self-match returned; no reward");
            return Ok(ReturnOutcome::SelfMatch);
        }

        if tx.user(found.user_id)?.is_none() {
            return Err(LifecycleError::UserNotFound(found.user_id));
        }
        let finder_balance = tx.credit_coins(found.user_id, self.reward_coins)?;

        info!(
            finder = %found.user_id,
            amount = self.reward_coins,
            finder_balance,
            "Return confirmed; finder rewarded"
        );

        Ok(ReturnOutcome::Rewarded {
            finder: found.user_id,
            amount: self.reward_coins,
            finder_balance,
        })
    }
}

fn missing_item(match_id: MatchId, item: ItemId) -> LifecycleError {
    LifecycleError::ItemNotFound { match_id, item }
}
