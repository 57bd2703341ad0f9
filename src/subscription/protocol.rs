use crate::state::{Alert, Gate, MediaRecord, StoreEvent};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Client → Server message types
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type")]
pub enum ClientMessage {
    #[serde(rename = "subscribe")]
    Subscribe { gate_id: String },
    #[serde(rename = "unsubscribe")]
    Unsubscribe { gate_id: String },
}

/// Server → Client: store change notification
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerMessage {
    GateUpdated {
        gate: Gate,
        timestamp: DateTime<Utc>,
    },
    AlertRaised {
        alert: Alert,
        timestamp: DateTime<Utc>,
    },
    AlertAcknowledged {
        alert: Alert,
        timestamp: DateTime<Utc>,
    },
    MediaProcessed {
        media: MediaRecord,
        timestamp: DateTime<Utc>,
    },
    Error {
        error: String,
    },
}

impl ServerMessage {
    pub fn error(error: impl Into<String>) -> Self {
        ServerMessage::Error {
            error: error.into(),
        }
    }
}

impl From<StoreEvent> for ServerMessage {
    fn from(event: StoreEvent) -> Self {
        let timestamp = Utc::now();
        match event {
            StoreEvent::GateUpdated(gate) => ServerMessage::GateUpdated { gate, timestamp },
            StoreEvent::AlertRaised(alert) => ServerMessage::AlertRaised { alert, timestamp },
            StoreEvent::AlertAcknowledged(alert) => {
                ServerMessage::AlertAcknowledged { alert, timestamp }
            }
            StoreEvent::MediaProcessed(media) => ServerMessage::MediaProcessed { media, timestamp },
        }
    }
}
