//! Schedule and task endpoints.
//!
//! Handlers pass the raw JSON body to the services and translate
//! [`RotaError`]s into status codes here, in one place.

pub mod doc;
mod health;
mod schedules;
mod tasks;

use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::Json;
use serde::Serialize;

use rota_core::RotaError;

// ── Shared types ─────────────────────────────────────────────────

#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct ErrorResponse {
    pub message: String,
}

pub(crate) type ApiResult<T> = Result<T, (StatusCode, Json<ErrorResponse>)>;

/// Default status for each error kind.
pub(crate) fn status_for(err: &RotaError) -> StatusCode {
    if err.is_validation() {
        return StatusCode::BAD_REQUEST;
    }
    match err {
        RotaError::NotFound { .. } => StatusCode::NOT_FOUND,
        RotaError::CascadeBlocked { .. } => StatusCode::CONFLICT,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

pub(crate) fn error_response(err: RotaError) -> (StatusCode, Json<ErrorResponse>) {
    let status = status_for(&err);
    if status.is_server_error() {
        tracing::error!(error = %err, "request failed");
    }
    (status, Json(ErrorResponse { message: err.to_string() }))
}

/// Unreadable bodies keep axum's status but use the JSON error shape.
pub(crate) fn rejection_response(rejection: JsonRejection) -> (StatusCode, Json<ErrorResponse>) {
    (
        rejection.status(),
        Json(ErrorResponse {
            message: rejection.body_text(),
        }),
    )
}

// ── Re-exports ───────────────────────────────────────────────────

pub use health::health;
pub use schedules::{
    schedules_create, schedules_delete, schedules_get, schedules_list, schedules_update,
};
pub use tasks::{tasks_create, tasks_delete, tasks_get, tasks_list, tasks_update};
