use crate::api::ApiError;
use crate::state::{Gate, GateUpdate, NewAlert, StateStore};
use axum::{
    extract::{rejection::JsonRejection, Path, State},
    response::Json,
    routing::get,
    Router,
};
use std::sync::Arc;
use tracing::info;

/// Shared state for the gates API
pub struct GatesAppState {
    pub store: Arc<StateStore>,
}

/// Create gates API router
pub fn create_gates_router(state: GatesAppState) -> Router {
    Router::new()
        .route("/api/gates", get(list_gates))
        .route("/api/gates/:id", get(get_gate).patch(update_gate))
        .with_state(Arc::new(state))
}

/// GET /api/gates - All gates ordered by name
async fn list_gates(State(state): State<Arc<GatesAppState>>) -> Json<Vec<Gate>> {
    Json(state.store.list_gates())
}

/// GET /api/gates/:id
async fn get_gate(
    State(state): State<Arc<GatesAppState>>,
    Path(id): Path<String>,
) -> Result<Json<Gate>, ApiError> {
    state
        .store
        .get_gate(&id)
        .map(Json)
        .ok_or_else(|| ApiError::NotFound("Gate not found".to_string()))
}

/// PATCH /api/gates/:id - Partial update of count and/or capacity.
///
/// Status is recomputed by the store. Crossing over capacity raises the same alert the
/// simulator would.
async fn update_gate(
    State(state): State<Arc<GatesAppState>>,
    Path(id): Path<String>,
    body: Result<Json<GateUpdate>, JsonRejection>,
) -> Result<Json<Gate>, ApiError> {
    let Json(update) = body?;

    if update.capacity == Some(0) {
        return Err(ApiError::Validation("capacity must be greater than 0".to_string()));
    }

    let (was_over, gate) = state.store.modify_gate(&id, |gate| {
        let was_over = gate.is_over_capacity();
        if let Some(capacity) = update.capacity {
            gate.capacity = capacity;
        }
        if let Some(count) = update.current_count {
            gate.current_count = count;
        }
        was_over
    })?;

    info!(
        gate = %gate.name,
        count = gate.current_count,
        capacity = gate.capacity,
        status = %gate.status,
        "Gate updated via API"
    );

    if gate.is_over_capacity() && !was_over {
        state.store.create_alert(NewAlert::capacity_exceeded(&gate));
    }

    Ok(Json(gate))
}
