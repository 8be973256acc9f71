use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    middleware,
    routing::{get, post},
};
use serde_json::{Value, json};
use tower_http::trace::TraceLayer;

use crate::AppState;

pub mod logging_middleware;
pub mod process;

//
// Router
//

/// All routes. Versioned API routes live under `api_prefix` (e.g. `/api/v1`).
pub fn router(api_prefix: &str) -> Router<AppState> {
    let api_prefix = api_prefix.trim_end_matches('/');
    Router::new()
        .route("/health", get(health_check))
        .route(&format!("{api_prefix}/process"), post(process::post_process))
        // Custom route access logging
        .layer(middleware::from_fn(logging_middleware::log_route_access))
        // Tracing middleware
        .layer(TraceLayer::new_for_http())
}

/// GET /health - liveness check
pub async fn health_check(State(state): State<AppState>) -> (StatusCode, Json<Value>) {
    (
        StatusCode::OK,
        Json(json!({ "status": "healthy", "project": state.project_name })),
    )
}
