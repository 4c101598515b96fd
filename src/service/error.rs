use thiserror::Error;

use crate::lifecycle::LifecycleError;
use crate::matching::MatchingError;
use crate::storage::{StoreError, UserId};

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("user not found: {0}")]
    UserNotFound(UserId),

    #[error("user {0} is not an administrator")]
    Forbidden(UserId),

    #[error("invalid request: {reason}")]
    InvalidRequest { reason: String },

    #[error("username already taken: {0}")]
    UsernameTaken(String),

    #[error(transparent)]
    Lifecycle(#[from] LifecycleError),

    #[error("store error: {0}")]
    Store(StoreError),
}

impl ServiceError {
    pub(crate) fn invalid(reason: impl Into<String>) -> Self {
        ServiceError::InvalidRequest {
            reason: reason.into(),
        }
    }
}

impl From<StoreError> for ServiceError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::UsernameTaken(name) => ServiceError::UsernameTaken(name),
            StoreError::UserNotFound(id) => ServiceError::UserNotFound(id),
            other => ServiceError::Store(other),
        }
    }
}

impl From<MatchingError> for ServiceError {
    fn from(err: MatchingError) -> Self {
        match err {
            MatchingError::Store(store) => store.into(),
        }
    }
}

pub type ServiceResult<T> = Result<T, ServiceError>;
