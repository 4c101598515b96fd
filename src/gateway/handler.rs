use axum::{
    Json,
    extract::{FromRequestParts, Path, State},
    http::{HeaderMap, HeaderValue, StatusCode, request::Parts},
    response::{IntoResponse, Response},
};
use serde::{Serialize, de::DeserializeOwned};
use tracing::{debug, instrument};

use crate::embedding::MultimodalEmbedder;
use crate::gateway::error::GatewayError;
use crate::gateway::state::HandlerState;
use crate::gateway::{LOSTFOUND_STATUS_CREATED, LOSTFOUND_STATUS_HEADER, LOSTFOUND_STATUS_OK};
use crate::service::{RegisterRequest, ReportRequest};
use crate::storage::{MatchId, Store, UserId};

/// Header carrying the acting user's id.
pub const USER_ID_HEADER: &str = "x-user-id";

/// The user a request acts on behalf of, taken from [`USER_ID_HEADER`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ActingUser(pub UserId);

impl<St: Send + Sync> FromRequestParts<St> for ActingUser {
    type Rejection = GatewayError;

    async fn from_request_parts(parts: &mut Parts, _state: &St) -> Result<Self, Self::Rejection> {
        let raw = parts
            .headers
            .get(USER_ID_HEADER)
            .ok_or_else(|| GatewayError::Unauthenticated(format!("missing {} header", USER_ID_HEADER)))?
            .to_str()
            .map_err(|_| GatewayError::Unauthenticated(format!("{} is not ASCII", USER_ID_HEADER)))?;

        let id = raw.trim().parse::<u64>().map_err(|_| {
            GatewayError::Unauthenticated(format!("{} is not a user id: {:?}", USER_ID_HEADER, raw))
        })?;

        Ok(ActingUser(UserId(id)))
    }
}

fn parse_body<T: DeserializeOwned>(body: serde_json::Value) -> Result<T, GatewayError> {
    serde_json::from_value(body)
        .map_err(|e| GatewayError::InvalidRequest(format!("Invalid request schema: {}", e)))
}

fn make_response<T: Serialize>(status: StatusCode, body: &T) -> Response {
    let lostfound_status = if status == StatusCode::CREATED {
        LOSTFOUND_STATUS_CREATED
    } else {
        LOSTFOUND_STATUS_OK
    };

    let mut headers = HeaderMap::new();
    headers.insert(
        LOSTFOUND_STATUS_HEADER,
        HeaderValue::from_static(lostfound_status),
    );

    (status, headers, Json(body)).into_response()
}

#[instrument(skip(state, body))]
pub async fn register_handler<S, E>(
    State(state): State<HandlerState<S, E>>,
    Json(body): Json<serde_json::Value>,
) -> Result<Response, GatewayError>
where
    S: Store + 'static,
    E: MultimodalEmbedder + 'static,
{
    let request: RegisterRequest = parse_body(body)?;
    let user = state.service.register_user(request).await?;
    Ok(make_response(StatusCode::CREATED, &user))
}

#[instrument(skip(state, body), fields(user = %user.0))]
pub async fn report_handler<S, E>(
    State(state): State<HandlerState<S, E>>,
    user: ActingUser,
    Json(body): Json<serde_json::Value>,
) -> Result<Response, GatewayError>
where
    S: Store + 'static,
    E: MultimodalEmbedder + 'static,
{
    let request: ReportRequest = parse_body(body)?;
    let outcome = state.service.report_item(user.0, request).await?;
    debug!(item = %outcome.item.id, "Report accepted");
    Ok(make_response(StatusCode::CREATED, &outcome))
}

#[instrument(skip(state), fields(user = %user.0))]
pub async fn dashboard_handler<S, E>(
    State(state): State<HandlerState<S, E>>,
    user: ActingUser,
) -> Result<Response, GatewayError>
where
    S: Store + 'static,
    E: MultimodalEmbedder + 'static,
{
    let dashboard = state.service.dashboard(user.0).await?;
    Ok(make_response(StatusCode::OK, &dashboard))
}

#[instrument(skip(state), fields(user = %user.0))]
pub async fn notifications_handler<S, E>(
    State(state): State<HandlerState<S, E>>,
    user: ActingUser,
) -> Result<Response, GatewayError>
where
    S: Store + 'static,
    E: MultimodalEmbedder + 'static,
{
    let notifications = state.service.notifications(user.0).await?;
    Ok(make_response(StatusCode::OK, &notifications))
}

#[instrument(skip(state), fields(user = %user.0))]
pub async fn history_handler<S, E>(
    State(state): State<HandlerState<S, E>>,
    user: ActingUser,
) -> Result<Response, GatewayError>
where
    S: Store + 'static,
    E: MultimodalEmbedder + 'static,
{
    let history = state.service.history(user.0).await?;
    Ok(make_response(StatusCode::OK, &history))
}

#[instrument(skip(state), fields(user = %user.0))]
pub async fn admin_overview_handler<S, E>(
    State(state): State<HandlerState<S, E>>,
    user: ActingUser,
) -> Result<Response, GatewayError>
where
    S: Store + 'static,
    E: MultimodalEmbedder + 'static,
{
    let overview = state.service.admin_overview(user.0).await?;
    Ok(make_response(StatusCode::OK, &overview))
}

#[instrument(skip(state), fields(user = %user.0))]
pub async fn confirm_return_handler<S, E>(
    State(state): State<HandlerState<S, E>>,
    user: ActingUser,
    Path(match_id): Path<u64>,
) -> Result<Response, GatewayError>
where
    S: Store + 'static,
    E: MultimodalEmbedder + 'static,
{
    let outcome = state
        .service
        .confirm_return(user.0, MatchId(match_id))
        .await?;
    Ok(make_response(StatusCode::OK, &outcome))
}
