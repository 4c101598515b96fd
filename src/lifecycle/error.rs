use thiserror::Error;

use crate::storage::{ItemId, MatchId, StoreError, UserId};

#[derive(Error, Debug)]
pub enum LifecycleError {
    #[error("match not found: {0}")]
    MatchNotFound(MatchId),

    #[error("item {item} referenced by match {match_id} not found")]
    ItemNotFound { match_id: MatchId, item: ItemId },

    #[error("user not found: {0}")]
    UserNotFound(UserId),

    #[error("user {user} is not the owner of the lost item in match {match_id}")]
    Unauthorized { match_id: MatchId, user: UserId },

    #[error("store error: {0}")]
    Store(#[from] StoreError),
}

pub type LifecycleResult<T> = Result<T, LifecycleError>;
