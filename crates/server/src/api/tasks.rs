//! Task CRUD endpoints.

use std::sync::Arc;

use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;
use serde_json::Value;

use rota_core::{RotaError, Task};

use crate::state::AppState;

use super::{error_response, rejection_response, ApiResult, ErrorResponse};

/// Documented request shape; see [`super::schedules::SchedulePayload`].
#[derive(Debug, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TaskPayload {
    pub account_id: Option<i64>,
    /// Required on create; cannot be changed afterwards.
    pub schedule_id: Option<String>,
    pub start_time: Option<String>,
    /// Minutes, must be positive.
    pub duration: Option<u32>,
    /// `work` or `break`.
    #[serde(rename = "type")]
    pub task_type: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct TaskListParams {
    #[serde(rename = "scheduleId")]
    pub schedule_id: Option<String>,
}

/// List tasks
#[utoipa::path(
    get,
    path = "/api/tasks",
    tag = "Tasks",
    params(("scheduleId" = Option<String>, Query, description = "Only tasks of this schedule")),
    responses(
        (status = 200, description = "Tasks in creation order", body = Object),
        (status = 404, description = "Schedule not found", body = ErrorResponse)
    )
)]
pub async fn tasks_list(
    State(state): State<Arc<AppState>>,
    Query(params): Query<TaskListParams>,
) -> ApiResult<Json<Vec<Task>>> {
    let tasks = state
        .tasks
        .list(params.schedule_id.as_deref())
        .await
        .map_err(error_response)?;
    Ok(Json(tasks))
}

/// Create a task inside an existing schedule
#[utoipa::path(
    post,
    path = "/api/tasks",
    tag = "Tasks",
    request_body = TaskPayload,
    responses(
        (status = 201, description = "Task created", body = Object),
        (status = 400, description = "Missing or invalid field, or outside the schedule", body = ErrorResponse),
        (status = 404, description = "Schedule not found", body = ErrorResponse)
    )
)]
pub async fn tasks_create(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<Value>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<Task>)> {
    let Json(payload) = payload.map_err(rejection_response)?;
    let created = state.tasks.create(&payload).await.map_err(error_response)?;
    Ok((StatusCode::CREATED, Json(created)))
}

/// Get a task
#[utoipa::path(
    get,
    path = "/api/tasks/{id}",
    tag = "Tasks",
    params(("id" = String, Path, description = "Task ID")),
    responses(
        (status = 200, description = "Task", body = Object),
        (status = 404, description = "Task not found", body = ErrorResponse)
    )
)]
pub async fn tasks_get(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> ApiResult<Json<Task>> {
    let task = state.tasks.get(&id).await.map_err(error_response)?;
    Ok(Json(task))
}

/// Update a task
///
/// An invalid `type` is answered with 404, the same status as a missing task.
/// Existing clients match on that pairing.
#[utoipa::path(
    put,
    path = "/api/tasks/{id}",
    tag = "Tasks",
    params(("id" = String, Path, description = "Task ID")),
    request_body = TaskPayload,
    responses(
        (status = 200, description = "Task updated", body = Object),
        (status = 400, description = "Missing or invalid field", body = ErrorResponse),
        (status = 404, description = "Task not found, or invalid type", body = ErrorResponse)
    )
)]
pub async fn tasks_update(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    payload: Result<Json<Value>, JsonRejection>,
) -> ApiResult<Json<Task>> {
    let Json(payload) = payload.map_err(rejection_response)?;
    match state.tasks.update(&id, &payload).await {
        Ok(task) => Ok(Json(task)),
        Err(err @ RotaError::InvalidEnum { .. }) => {
            let (_, body) = error_response(err);
            Err((StatusCode::NOT_FOUND, body))
        }
        Err(err) => Err(error_response(err)),
    }
}

/// Delete a task
#[utoipa::path(
    delete,
    path = "/api/tasks/{id}",
    tag = "Tasks",
    params(("id" = String, Path, description = "Task ID")),
    responses(
        (status = 204, description = "Task deleted"),
        (status = 404, description = "Task not found", body = ErrorResponse)
    )
)]
pub async fn tasks_delete(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> ApiResult<StatusCode> {
    state.tasks.delete(&id).await.map_err(error_response)?;
    Ok(StatusCode::NO_CONTENT)
}
