use crate::api::ApiError;
use crate::assistant::{ChatResponder, QueryIntent};
use crate::config::ChatConfig;
use crate::state::{ChatMessage, StateStore};
use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        Query, State,
    },
    response::Json,
    routing::{get, post},
    Router,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;
use tracing::debug;

/// Shared state for the chat API
pub struct ChatAppState {
    pub store: Arc<StateStore>,
    pub responder: Arc<ChatResponder>,
    pub config: ChatConfig,
}

#[derive(Deserialize)]
pub struct ChatRequest {
    pub message: Option<String>,
}

#[derive(Deserialize)]
pub struct HistoryParams {
    pub limit: Option<usize>,
}

/// Stored exchange plus the structured parts of the reply
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatResponse {
    #[serde(flatten)]
    pub message: ChatMessage,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gate_data: Option<Value>,
    pub action_required: bool,
    pub intent: QueryIntent,
}

/// Create chat API router
pub fn create_chat_router(state: ChatAppState) -> Router {
    Router::new()
        .route("/api/chat", post(send_message))
        .route("/api/chat/history", get(history))
        .with_state(Arc::new(state))
}

/// POST /api/chat - Answer a question and record the exchange
async fn send_message(
    State(state): State<Arc<ChatAppState>>,
    body: Result<Json<ChatRequest>, JsonRejection>,
) -> Result<Json<ChatResponse>, ApiError> {
    let Json(request) = body?;

    let message = request
        .message
        .map(|m| m.trim().to_string())
        .filter(|m| !m.is_empty())
        .ok_or_else(|| ApiError::Validation("Message is required".to_string()))?;

    let gates = state.store.list_gates();
    let reply = state.responder.reply(&message, &gates);
    debug!(intent = ?reply.intent, action_required = reply.action_required, "Chat reply");

    let stored = state.store.append_chat_message(&message, &reply.response);

    Ok(Json(ChatResponse {
        message: stored,
        gate_data: reply.gate_data,
        action_required: reply.action_required,
        intent: reply.intent,
    }))
}

/// GET /api/chat/history?limit=N - Newest first.
///
/// A missing or zero limit means the configured default; larger ones are capped.
async fn history(
    State(state): State<Arc<ChatAppState>>,
    params: Result<Query<HistoryParams>, QueryRejection>,
) -> Result<Json<Vec<ChatMessage>>, ApiError> {
    let Query(params) = params?;

    let limit = params
        .limit
        .filter(|&limit| limit > 0)
        .unwrap_or(state.config.history_default_limit)
        .min(state.config.history_max_limit);
    Ok(Json(state.store.recent_chat_messages(limit)))
}
