use thiserror::Error;

use crate::storage::StoreError;

#[derive(Debug, Error)]
pub enum MatchingError {
    #[error("store error during matching: {0}")]
    Store(#[from] StoreError),
}

pub type MatchingResult<T> = Result<T, MatchingError>;
