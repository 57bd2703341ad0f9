use axum::{response::Json, routing::get, Router};
use serde_json::{json, Value};

/// Create health check router
pub fn create_health_router() -> Router {
    Router::new().route("/health", get(health))
}

/// GET /health
async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}
