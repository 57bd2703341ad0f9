use crate::state::StoreEvent;
use crate::subscription::protocol::{ClientMessage, ServerMessage};
use axum::extract::ws::{Message, WebSocket};
use std::collections::HashSet;
use tokio::sync::broadcast;
use tracing::{error, info, warn};

/// Manages a single WebSocket connection with gate subscriptions
pub struct ConnectionManager {
    /// Gate IDs this connection is subscribed to
    subscriptions: HashSet<String>,
}

impl ConnectionManager {
    pub fn new() -> Self {
        Self {
            subscriptions: HashSet::new(),
        }
    }

    /// Handle WebSocket connection lifecycle
    pub async fn handle(
        mut self,
        mut socket: WebSocket,
        mut events_rx: broadcast::Receiver<StoreEvent>,
    ) {
        info!("WebSocket connection established");

        loop {
            tokio::select! {
                Some(msg) = socket.recv() => {
                    match msg {
                        Ok(Message::Text(text)) => {
                            if let Err(e) = self.handle_client_message(&text) {
                                warn!(error = %e, "Invalid client message");
                                let reply = ServerMessage::error(e.to_string());
                                if send(&mut socket, &reply).await.is_err() {
                                    break;
                                }
                            }
                        }
                        Ok(Message::Close(_)) => {
                            info!("WebSocket client disconnected");
                            break;
                        }
                        Ok(Message::Ping(data)) => {
                            if let Err(e) = socket.send(Message::Pong(data)).await {
                                error!(error = %e, "Failed to send pong");
                                break;
                            }
                        }
                        Ok(_) => {}
                        Err(e) => {
                            warn!(error = %e, "WebSocket error");
                            break;
                        }
                    }
                }

                result = events_rx.recv() => {
                    match result {
                        Ok(event) => {
                            if self.should_forward(&event) {
                                let msg = ServerMessage::from(event);
                                if let Err(e) = send(&mut socket, &msg).await {
                                    error!(error = %e, "Failed to send store event");
                                    break;
                                }
                            }
                        }
                        Err(broadcast::error::RecvError::Lagged(skipped)) => {
                            warn!(skipped = skipped, "WebSocket lagged, skipped events");
                        }
                        Err(broadcast::error::RecvError::Closed) => {
                            error!("Store event channel closed");
                            break;
                        }
                    }
                }

                else => {
                    break;
                }
            }
        }

        info!("WebSocket connection closed");
    }

    /// Apply a subscribe/unsubscribe request
    fn handle_client_message(&mut self, text: &str) -> anyhow::Result<()> {
        let msg: ClientMessage = serde_json::from_str(text)?;

        match msg {
            ClientMessage::Subscribe { gate_id } => {
                info!(gate_id = %gate_id, "Client subscribed to gate");
                self.subscriptions.insert(gate_id);
            }
            ClientMessage::Unsubscribe { gate_id } => {
                info!(gate_id = %gate_id, "Client unsubscribed from gate");
                self.subscriptions.remove(&gate_id);
            }
        }

        Ok(())
    }

    /// No subscriptions means everything is forwarded. Events not tied to a gate
    /// (media processing) always go through.
    fn should_forward(&self, event: &StoreEvent) -> bool {
        if self.subscriptions.is_empty() {
            return true;
        }

        match event.gate_id() {
            Some(gate_id) => self.subscriptions.contains(gate_id),
            None => true,
        }
    }
}

impl Default for ConnectionManager {
    fn default() -> Self {
        Self::new()
    }
}

async fn send(socket: &mut WebSocket, msg: &ServerMessage) -> anyhow::Result<()> {
    let json = serde_json::to_string(msg)?;
    socket.send(Message::Text(json)).await?;
    Ok(())
}
