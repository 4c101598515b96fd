use axum::{
    Json,
    http::{HeaderMap, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
};
use thiserror::Error;

use crate::lifecycle::LifecycleError;
use crate::service::ServiceError;

use super::LOSTFOUND_STATUS_HEADER;

#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    #[error("unauthenticated: {0}")]
    Unauthenticated(String),

    #[error("forbidden: {0}")]
    Forbidden(String),

    #[error("not found: {0}")]
    NotFound(String),

    #[error("conflict: {0}")]
    Conflict(String),

    #[error("internal error: {0}")]
    InternalError(String),
}

#[derive(serde::Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub code: u16,
}

impl From<ServiceError> for GatewayError {
    fn from(err: ServiceError) -> Self {
        let message = err.to_string();
        match err {
            ServiceError::UserNotFound(_) => GatewayError::Unauthenticated(message),
            ServiceError::Forbidden(_) => GatewayError::Forbidden(message),
            ServiceError::InvalidRequest { .. } => GatewayError::InvalidRequest(message),
            ServiceError::UsernameTaken(_) => GatewayError::Conflict(message),
            ServiceError::Lifecycle(e) => match e {
                LifecycleError::Unauthorized { .. } => GatewayError::Forbidden(message),
                LifecycleError::MatchNotFound(_)
                | LifecycleError::ItemNotFound { .. }
                | LifecycleError::UserNotFound(_) => GatewayError::NotFound(message),
                LifecycleError::Store(_) => GatewayError::InternalError(message),
            },
            ServiceError::Store(_) => GatewayError::InternalError(message),
        }
    }
}

impl IntoResponse for GatewayError {
    fn into_response(self) -> Response {
        let (status, lostfound_status) = match &self {
            GatewayError::InvalidRequest(_) => (StatusCode::BAD_REQUEST, "invalid_request"),
            GatewayError::Unauthenticated(_) => (StatusCode::UNAUTHORIZED, "unauthenticated"),
            GatewayError::Forbidden(_) => (StatusCode::FORBIDDEN, "forbidden"),
            GatewayError::NotFound(_) => (StatusCode::NOT_FOUND, "not_found"),
            GatewayError::Conflict(_) => (StatusCode::CONFLICT, "conflict"),
            GatewayError::InternalError(_) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "internal_error")
            }
        };

        if status.is_server_error() {
            tracing::error!(error = %self, "Request failed");
        }

        let mut headers = HeaderMap::new();
        headers.insert(
            LOSTFOUND_STATUS_HEADER,
            HeaderValue::from_static(lostfound_status),
        );

        let body = Json(ErrorResponse {
            error: self.to_string(),
            code: status.as_u16(),
        });

        (status, headers, body).into_response()
    }
}
