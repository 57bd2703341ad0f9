use crate::state::StateStore;
use crate::subscription::ConnectionManager;
use axum::{
    extract::{ws::WebSocket, State, WebSocketUpgrade},
    response::Response,
    routing::get,
    Router,
};
use std::sync::Arc;
use tracing::info;

/// Shared application state for WebSocket handler
pub struct WsAppState {
    pub store: Arc<StateStore>,
}

/// Create WebSocket router
pub fn create_ws_router(state: WsAppState) -> Router {
    Router::new()
        .route("/api/ws", get(ws_handler))
        .with_state(Arc::new(state))
}

/// GET /api/ws - WebSocket upgrade handler
pub async fn ws_handler(ws: WebSocketUpgrade, State(state): State<Arc<WsAppState>>) -> Response {
    info!("WebSocket upgrade request received");
    ws.on_upgrade(|socket| handle_socket(socket, state))
}

async fn handle_socket(socket: WebSocket, state: Arc<WsAppState>) {
    // Subscribe before the connection loop so no event is missed
    let events_rx = state.store.subscribe();

    ConnectionManager::new().handle(socket, events_rx).await;
}
