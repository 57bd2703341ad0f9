use crate::assistant::{busiest_gate, Totals};
use crate::state::StateStore;
use axum::{extract::State, response::Json, routing::get, Router};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::Serialize;
use std::sync::{Arc, Mutex};

/// Shared state for the analytics API
pub struct AnalyticsAppState {
    pub store: Arc<StateStore>,
    /// Source for the simulated wait time and entry rate
    rng: Mutex<StdRng>,
}

impl AnalyticsAppState {
    pub fn new(store: Arc<StateStore>) -> Self {
        Self {
            store,
            rng: Mutex::new(StdRng::from_entropy()),
        }
    }
}

/// Dashboard summary
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyticsResponse {
    pub total_people: u64,
    pub total_capacity: u64,
    pub capacity_percentage: u32,
    pub active_alerts: usize,
    pub busiest_gate: Option<String>,
    /// Minutes, simulated
    pub average_wait_time: f64,
    /// People per minute, simulated
    pub entry_rate: u32,
    pub peak_hour: &'static str,
}

/// Create analytics API router
pub fn create_analytics_router(state: AnalyticsAppState) -> Router {
    Router::new()
        .route("/api/analytics", get(get_analytics))
        .with_state(Arc::new(state))
}

/// GET /api/analytics
async fn get_analytics(State(state): State<Arc<AnalyticsAppState>>) -> Json<AnalyticsResponse> {
    let gates = state.store.list_gates();
    let totals = Totals::of(&gates);
    let active_alerts = state.store.list_active_alerts().len();

    let busiest = busiest_gate(&gates).map(|g| g.name.clone());

    let (wait, entry_rate) = {
        let mut rng = state.rng.lock().expect("analytics rng lock poisoned");
        (rng.gen_range(2.0..=8.0_f64), rng.gen_range(15.0..=30.0_f64))
    };

    Json(AnalyticsResponse {
        total_people: totals.total_people,
        total_capacity: totals.total_capacity,
        capacity_percentage: totals.utilization_rate,
        active_alerts,
        busiest_gate: busiest,
        average_wait_time: (wait * 10.0).round() / 10.0,
        entry_rate: entry_rate.round() as u32,
        peak_hour: "7:30 PM",
    })
}
