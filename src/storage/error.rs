use std::path::PathBuf;
use thiserror::Error;

use super::model::{ItemId, MatchId, UserId};

#[derive(Error, Debug)]
/// Errors returned by the store and its units of work.
pub enum StoreError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("snapshot serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("snapshot at {path} is corrupt: {reason}")]
    CorruptSnapshot { path: PathBuf, reason: String },

    #[error("user not found: {0}")]
    UserNotFound(UserId),

    #[error("item not found: {0}")]
    ItemNotFound(ItemId),

    #[error("match not found: {0}")]
    MatchNotFound(MatchId),

    #[error("username already taken: {0}")]
    UsernameTaken(String),

    #[error("coin balance overflow for user {0}")]
    CoinOverflow(UserId),

    #[error("store unavailable: {reason}")]
    Unavailable { reason: String },
}

/// Convenience result type for store operations.
pub type StoreResult<T> = Result<T, StoreError>;
