use crate::api::ApiError;
use crate::state::{Alert, StateStore};
use axum::{
    extract::{Path, State},
    response::Json,
    routing::{get, patch},
    Router,
};
use std::sync::Arc;

/// Shared state for the alerts API
pub struct AlertsAppState {
    pub store: Arc<StateStore>,
}

/// Create alerts API router
pub fn create_alerts_router(state: AlertsAppState) -> Router {
    Router::new()
        .route("/api/alerts", get(list_alerts))
        .route("/api/alerts/:id/acknowledge", patch(acknowledge_alert))
        .with_state(Arc::new(state))
}

/// GET /api/alerts - Active alerts, newest first
async fn list_alerts(State(state): State<Arc<AlertsAppState>>) -> Json<Vec<Alert>> {
    Json(state.store.list_active_alerts())
}

/// PATCH /api/alerts/:id/acknowledge
async fn acknowledge_alert(
    State(state): State<Arc<AlertsAppState>>,
    Path(id): Path<String>,
) -> Result<Json<Alert>, ApiError> {
    Ok(Json(state.store.acknowledge_alert(&id)?))
}
