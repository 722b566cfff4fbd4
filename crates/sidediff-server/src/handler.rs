use std::sync::Arc;

use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::{header, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Json, Response};
use serde_json::json;
use sidediff_sdk::{ComparisonId, DiffCoordinator, Side};

use crate::envelope::{DiffResponse, HealthResponse, PartEnvelope};
use crate::error::{ServerError, ServerResult};

/// Shared handler state.
#[derive(Clone, Debug)]
pub struct AppState {
    pub coordinator: Arc<DiffCoordinator>,
}

impl AppState {
    pub fn new(coordinator: Arc<DiffCoordinator>) -> Self {
        Self { coordinator }
    }
}

pub async fn submit_left_handler(
    State(state): State<AppState>,
    Path(id): Path<ComparisonId>,
    body: Result<Json<PartEnvelope>, JsonRejection>,
) -> ServerResult<Response> {
    submit(state, id, Side::Left, body).await
}

pub async fn submit_right_handler(
    State(state): State<AppState>,
    Path(id): Path<ComparisonId>,
    body: Result<Json<PartEnvelope>, JsonRejection>,
) -> ServerResult<Response> {
    submit(state, id, Side::Right, body).await
}

async fn submit(
    state: AppState,
    id: ComparisonId,
    side: Side,
    body: Result<Json<PartEnvelope>, JsonRejection>,
) -> ServerResult<Response> {
    let envelope = match body {
        Ok(Json(envelope)) => envelope,
        Err(rejection) if rejection.status() == StatusCode::PAYLOAD_TOO_LARGE => {
            return Ok(rejection.into_response());
        }
        Err(rejection) => return Err(ServerError::MalformedInput(rejection.body_text())),
    };
    let data = envelope.decode()?;

    let coordinator = Arc::clone(&state.coordinator);
    let location = tokio::task::spawn_blocking(move || coordinator.submit_part(id, side, &data))
        .await?
        .map_err(|source| ServerError::Stage { id, source })?;

    let uri = location.to_uri();
    let header_value =
        HeaderValue::from_str(&uri).map_err(|e| ServerError::Internal(e.to_string()))?;
    let body = format!("Part of comparison added with id: {id} at: {uri}");
    Ok((StatusCode::CREATED, [(header::LOCATION, header_value)], body).into_response())
}

pub async fn diff_handler(
    State(state): State<AppState>,
    Path(id): Path<ComparisonId>,
) -> ServerResult<Json<DiffResponse>> {
    let coordinator = Arc::clone(&state.coordinator);
    let report = tokio::task::spawn_blocking(move || coordinator.compute_diff(id))
        .await?
        .map_err(|source| ServerError::Compare { id, source })?;
    Ok(Json(report.into()))
}

/// Health check handler.
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse::default())
}

/// Info handler.
pub async fn info_handler(State(state): State<AppState>) -> Json<serde_json::Value> {
    Json(json!({
        "name": "sidediff-server",
        "version": env!("CARGO_PKG_VERSION"),
        "live_comparisons": state.coordinator.live_comparisons(),
        "ttl_secs": state.coordinator.ttl().as_secs(),
    }))
}
