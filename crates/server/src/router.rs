//! HTTP router construction.
//!
//! Assembles all Axum routes, middleware, and OpenAPI docs into a single `Router`.

use std::sync::Arc;

use axum::http::HeaderValue;
use axum::routing::get;
use axum::Router;
use tower_http::cors::{Any, CorsLayer};
use utoipa::OpenApi;
use utoipa_scalar::{Scalar, Servable};

use crate::api;
use crate::state::AppState;

/// Build the complete application router with all routes and middleware.
pub fn build_router(state: Arc<AppState>, cors_origin: &str) -> Router {
    Router::new()
        .route("/health", get(api::health))
        .route(
            "/api/schedules",
            get(api::schedules_list).post(api::schedules_create),
        )
        .route(
            "/api/schedules/{id}",
            get(api::schedules_get)
                .put(api::schedules_update)
                .delete(api::schedules_delete),
        )
        .route("/api/tasks", get(api::tasks_list).post(api::tasks_create))
        .route(
            "/api/tasks/{id}",
            get(api::tasks_get)
                .put(api::tasks_update)
                .delete(api::tasks_delete),
        )
        .layer(cors_layer(cors_origin))
        .with_state(state)
        .merge(Scalar::with_url("/docs", api::doc::ApiDoc::openapi()))
}

/// `*` allows any origin; anything else is treated as a single allowed origin.
fn cors_layer(origin: &str) -> CorsLayer {
    if origin == "*" {
        return CorsLayer::permissive();
    }
    match origin.parse::<HeaderValue>() {
        Ok(value) => CorsLayer::new()
            .allow_origin(value)
            .allow_methods(Any)
            .allow_headers(Any),
        Err(e) => {
            tracing::warn!(origin, error = %e, "invalid CORS_ORIGIN, falling back to permissive");
            CorsLayer::permissive()
        }
    }
}
