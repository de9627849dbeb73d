use crate::AppState;
use axum::{
    Json, Router,
    routing::{get, post},
};

/// Builds the API router; the caller supplies the state and outer layers.
pub fn create_router() -> Router<AppState> {
    Router::new()
        .route("/api/health", get(health))
        .route("/api/plan", post(crate::api::handlers::plan::build_plan))
        .route(
            "/api/plan/regenerate",
            post(crate::api::handlers::plan::regenerate_plan),
        )
        .route(
            "/api/research/execute",
            post(crate::api::handlers::research::execute_research),
        )
}

async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "status": "ok", "service": "deepsprint" }))
}
