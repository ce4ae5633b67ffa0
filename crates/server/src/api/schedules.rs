//! Schedule CRUD endpoints.

use std::sync::Arc;

use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Deserialize;
use serde_json::Value;

use rota_core::{DeleteOutcome, ScheduleWithTasks};

use crate::state::AppState;

use super::{error_response, rejection_response, ApiResult, ErrorResponse};

/// Documented request shape. Handlers take the raw JSON so that field errors
/// keep their ordered `"<field> is required"` messages.
#[derive(Debug, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SchedulePayload {
    pub account_id: Option<i64>,
    pub agent_id: Option<i64>,
    /// RFC 3339, `YYYY-MM-DDTHH:MM`, or `YYYY-MM-DD`.
    pub start_time: Option<String>,
    pub end_time: Option<String>,
}

/// List all schedules
///
/// Each schedule embeds its tasks in creation order.
#[utoipa::path(
    get,
    path = "/api/schedules",
    tag = "Schedules",
    responses(
        (status = 200, description = "All schedules", body = Object),
        (status = 500, description = "Storage failure", body = ErrorResponse)
    )
)]
pub async fn schedules_list(
    State(state): State<Arc<AppState>>,
) -> ApiResult<Json<Vec<ScheduleWithTasks>>> {
    let schedules = state.schedules.list().await.map_err(error_response)?;
    Ok(Json(schedules))
}

/// Create a schedule
#[utoipa::path(
    post,
    path = "/api/schedules",
    tag = "Schedules",
    request_body = SchedulePayload,
    responses(
        (status = 201, description = "Schedule created", body = Object),
        (status = 400, description = "Missing or invalid field", body = ErrorResponse)
    )
)]
pub async fn schedules_create(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<Value>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<ScheduleWithTasks>)> {
    let Json(payload) = payload.map_err(rejection_response)?;
    let created = state.schedules.create(&payload).await.map_err(error_response)?;
    Ok((StatusCode::CREATED, Json(created)))
}

/// Get a schedule with its tasks
#[utoipa::path(
    get,
    path = "/api/schedules/{id}",
    tag = "Schedules",
    params(("id" = String, Path, description = "Schedule ID")),
    responses(
        (status = 200, description = "Schedule with embedded tasks", body = Object),
        (status = 404, description = "Schedule not found", body = ErrorResponse)
    )
)]
pub async fn schedules_get(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> ApiResult<Json<ScheduleWithTasks>> {
    let schedule = state.schedules.get(&id).await.map_err(error_response)?;
    Ok(Json(schedule))
}

/// Update a schedule
///
/// Fields present in the body replace the stored ones; the merged record is
/// validated as a whole.
#[utoipa::path(
    put,
    path = "/api/schedules/{id}",
    tag = "Schedules",
    params(("id" = String, Path, description = "Schedule ID")),
    request_body = SchedulePayload,
    responses(
        (status = 200, description = "Schedule updated", body = Object),
        (status = 400, description = "Missing or invalid field", body = ErrorResponse),
        (status = 404, description = "Schedule not found", body = ErrorResponse)
    )
)]
pub async fn schedules_update(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    payload: Result<Json<Value>, JsonRejection>,
) -> ApiResult<Json<ScheduleWithTasks>> {
    let Json(payload) = payload.map_err(rejection_response)?;
    let updated = state.schedules.update(&id, &payload).await.map_err(error_response)?;
    Ok(Json(updated))
}

/// Delete a schedule
///
/// A schedule that still has tasks is not deleted. That refusal is answered
/// with 200 and a plain-text explanation, not an error status, which existing
/// clients depend on.
#[utoipa::path(
    delete,
    path = "/api/schedules/{id}",
    tag = "Schedules",
    params(("id" = String, Path, description = "Schedule ID")),
    responses(
        (status = 204, description = "Schedule deleted"),
        (status = 200, description = "Refused: tasks still reference the schedule", body = String, content_type = "text/plain"),
        (status = 404, description = "Schedule not found", body = ErrorResponse)
    )
)]
pub async fn schedules_delete(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> ApiResult<Response> {
    match state.schedules.delete(&id).await.map_err(error_response)? {
        DeleteOutcome::Deleted => Ok(StatusCode::NO_CONTENT.into_response()),
        DeleteOutcome::Refused { message } => Ok((StatusCode::OK, message).into_response()),
    }
}
