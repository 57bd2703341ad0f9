// HTTP and WebSocket APIs

pub mod alerts;
pub mod analytics;
pub mod chat;
mod error;
pub mod gates;
pub mod health;
pub mod videos;
pub mod websocket;

pub use alerts::{create_alerts_router, AlertsAppState};
pub use analytics::{create_analytics_router, AnalyticsAppState, AnalyticsResponse};
pub use chat::{create_chat_router, ChatAppState};
pub use error::ApiError;
pub use gates::{create_gates_router, GatesAppState};
pub use health::create_health_router;
pub use videos::{create_videos_router, VideosAppState};
pub use websocket::{create_ws_router, ws_handler, WsAppState};

use crate::assistant::ChatResponder;
use crate::config::ChatConfig;
use crate::media::{MediaAnalyzer, MediaStorage};
use crate::state::StateStore;
use axum::Router;
use std::sync::Arc;
use tower_http::cors::CorsLayer;

/// Everything the routers share
pub struct AppContext {
    pub store: Arc<StateStore>,
    pub responder: Arc<ChatResponder>,
    pub analyzer: Arc<MediaAnalyzer>,
    pub storage: MediaStorage,
    pub chat: ChatConfig,
}

/// Full HTTP surface with permissive CORS for the dashboard
pub fn create_app(ctx: AppContext) -> Router {
    let store = ctx.store;

    Router::new()
        .merge(create_gates_router(GatesAppState {
            store: Arc::clone(&store),
        }))
        .merge(create_alerts_router(AlertsAppState {
            store: Arc::clone(&store),
        }))
        .merge(create_chat_router(ChatAppState {
            store: Arc::clone(&store),
            responder: ctx.responder,
            config: ctx.chat,
        }))
        .merge(create_videos_router(VideosAppState {
            store: Arc::clone(&store),
            storage: ctx.storage,
            analyzer: ctx.analyzer,
        }))
        .merge(create_analytics_router(AnalyticsAppState::new(Arc::clone(
            &store,
        ))))
        .merge(create_ws_router(WsAppState { store }))
        .merge(create_health_router())
        .layer(CorsLayer::permissive())
}
