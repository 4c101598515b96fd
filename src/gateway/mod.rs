//! HTTP gateway (Axum) for the lost-and-found service.
//!
//! The acting user is identified by the `X-User-Id` header; session handling
//! lives in front of this service.

#![allow(missing_docs)]

pub mod error;
pub mod handler;
pub mod state;


use std::time::Duration;

use axum::{
    Json, Router,
    extract::State,
    http::{HeaderMap, StatusCode, header::HeaderValue},
    response::{IntoResponse, Response},
    routing::{get, post},
};
use tower_http::trace::TraceLayer;

pub use error::GatewayError;
pub use handler::{ActingUser, USER_ID_HEADER};
pub use state::HandlerState;

use crate::embedding::MultimodalEmbedder;
use crate::storage::Store;

/// Response header carrying a short machine-readable outcome.
pub const LOSTFOUND_STATUS_HEADER: &str = "x-lostfound-status";
pub const LOSTFOUND_STATUS_HEALTHY: &str = "healthy";
pub const LOSTFOUND_STATUS_READY: &str = "ready";
pub const LOSTFOUND_STATUS_ERROR: &str = "error";
pub const LOSTFOUND_STATUS_OK: &str = "ok";
pub const LOSTFOUND_STATUS_CREATED: &str = "created";

/// Upper bound on how long the readiness check waits for the store.
const READY_STORE_TIMEOUT: Duration = Duration::from_secs(2);

pub fn create_router_with_state<S, E>(state: HandlerState<S, E>) -> Router
where
    S: Store + 'static,
    E: MultimodalEmbedder + 'static,
{
    Router::new()
        .route("/healthz", get(health_handler))
        .route("/ready", get(ready_handler::<S, E>))
        .route("/v1/users", post(handler::register_handler::<S, E>))
        .route(
            "/v1/items",
            get(handler::dashboard_handler::<S, E>).post(handler::report_handler::<S, E>),
        )
        .route(
            "/v1/notifications",
            get(handler::notifications_handler::<S, E>),
        )
        .route("/v1/history", get(handler::history_handler::<S, E>))
        .route(
            "/v1/admin/overview",
            get(handler::admin_overview_handler::<S, E>),
        )
        .route(
            "/v1/matches/{id}/return",
            post(handler::confirm_return_handler::<S, E>),
        )
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

#[derive(serde::Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
}

#[derive(serde::Serialize)]
pub struct ReadyResponse {
    pub status: &'static str,
    pub components: ComponentStatus,
}

#[derive(serde::Serialize)]
pub struct ComponentStatus {
    pub http: &'static str,
    pub storage: &'static str,
    pub embedding: &'static str,
    pub embedder_mode: &'static str,
}

#[tracing::instrument]
pub async fn health_handler() -> Response {
    let mut headers = HeaderMap::new();
    headers.insert(
        LOSTFOUND_STATUS_HEADER,
        HeaderValue::from_static(LOSTFOUND_STATUS_HEALTHY),
    );

    (
        StatusCode::OK,
        headers,
        Json(HealthResponse { status: "ok" }),
    )
        .into_response()
}

#[tracing::instrument(skip(state))]
pub async fn ready_handler<S, E>(State(state): State<HandlerState<S, E>>) -> Response
where
    S: Store + 'static,
    E: MultimodalEmbedder + 'static,
{
    let store = state.service.store();
    let storage_status = match tokio::time::timeout(READY_STORE_TIMEOUT, store.begin()).await {
        Ok(Ok(_tx)) => LOSTFOUND_STATUS_READY,
        Ok(Err(e)) => {
            tracing::warn!(error = %e, "Store not ready");
            LOSTFOUND_STATUS_ERROR
        }
        Err(_) => "pending",
    };

    let embedder = state.service.embedder();
    let embedding_status = if embedder.embedding_dim() > 0 {
        LOSTFOUND_STATUS_READY
    } else {
        LOSTFOUND_STATUS_ERROR
    };
    let embedder_mode = if embedder.is_stub() { "stub" } else { "real" };

    let components = ComponentStatus {
        http: LOSTFOUND_STATUS_READY,
        storage: storage_status,
        embedding: embedding_status,
        embedder_mode,
    };

    let is_ready = components.storage == LOSTFOUND_STATUS_READY
        && components.embedding == LOSTFOUND_STATUS_READY;

    let status_code = if is_ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };
    let status_msg = if is_ready { "ok" } else { "pending" };

    let mut headers = HeaderMap::new();
    headers.insert(LOSTFOUND_STATUS_HEADER, HeaderValue::from_static(status_msg));

    (
        status_code,
        headers,
        Json(ReadyResponse {
            status: status_msg,
            components,
        }),
    )
        .into_response()
}
