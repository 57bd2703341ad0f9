use crate::state::entity::{
    Alert, ChatMessage, Gate, GateStatus, GateUpdate, MediaRecord, MediaUpdate, NewAlert,
    NewMedia, StoreEvent,
};
use chrono::Utc;
use dashmap::DashMap;
use std::fmt;
use std::sync::RwLock;
use tokio::sync::broadcast;
use tracing::{debug, info};
use uuid::Uuid;

/// Gates created at startup: (name, capacity, initial count)
pub const DEFAULT_GATES: [(&str, u32, u32); 6] = [
    ("Gate A", 1200, 1247),
    ("Gate B", 1200, 892),
    ("Gate C", 1200, 456),
    ("Gate D", 1200, 234),
    ("Gate E", 1200, 678),
    ("Gate F", 1200, 345),
];

/// Store accessor errors
#[derive(Debug, Clone, PartialEq)]
pub enum StoreError {
    NotFound { entity: &'static str, id: String },
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StoreError::NotFound { entity, id } => write!(f, "{} '{}' not found", entity, id),
        }
    }
}

impl std::error::Error for StoreError {}

/// In-memory owner of every gate, alert, chat exchange and media record.
///
/// Records are handed out as clones. Each record lives in its own DashMap entry, so a
/// mutation holds only that record's shard lock for the duration of the change.
pub struct StateStore {
    gates: DashMap<String, Gate>,
    alerts: DashMap<String, Alert>,
    chat_log: RwLock<Vec<ChatMessage>>,
    media: DashMap<String, MediaRecord>,

    /// Broadcast channel for live dashboard subscribers
    events_tx: broadcast::Sender<StoreEvent>,
}

impl StateStore {
    /// Create an empty store
    pub fn new() -> Self {
        let (events_tx, _) = broadcast::channel(1000);

        Self {
            gates: DashMap::new(),
            alerts: DashMap::new(),
            chat_log: RwLock::new(Vec::new()),
            media: DashMap::new(),
            events_tx,
        }
    }

    /// Create a store seeded with the six stadium gates
    pub fn with_default_gates() -> Self {
        let store = Self::new();
        for (name, capacity, count) in DEFAULT_GATES {
            store.create_gate(name, capacity, count);
        }
        info!(gates = store.gates.len(), "Seeded default gates");
        store
    }

    // ── Gates ────────────────────────────────────────────────────────────────

    pub fn create_gate(&self, name: &str, capacity: u32, current_count: u32) -> Gate {
        let gate = Gate {
            id: new_id(),
            name: name.to_string(),
            capacity,
            current_count,
            status: GateStatus::from_occupancy(current_count, capacity),
            last_updated: Utc::now(),
        };
        self.gates.insert(gate.id.clone(), gate.clone());
        gate
    }

    /// All gates, ordered by name
    pub fn list_gates(&self) -> Vec<Gate> {
        let mut gates: Vec<Gate> = self.gates.iter().map(|g| g.value().clone()).collect();
        gates.sort_by(|a, b| a.name.cmp(&b.name));
        gates
    }

    pub fn get_gate(&self, id: &str) -> Option<Gate> {
        self.gates.get(id).map(|g| g.clone())
    }

    pub fn get_gate_by_name(&self, name: &str) -> Option<Gate> {
        self.gates
            .iter()
            .find(|g| g.name == name)
            .map(|g| g.value().clone())
    }

    /// Apply a partial update. Status is recomputed and `last_updated` stamped.
    pub fn update_gate(&self, id: &str, update: GateUpdate) -> Result<Gate, StoreError> {
        self.modify_gate(id, |gate| {
            if let Some(capacity) = update.capacity {
                gate.capacity = capacity;
            }
            if let Some(count) = update.current_count {
                gate.current_count = count;
            }
        })
        .map(|(_, gate)| gate)
    }

    /// Read-modify-write a gate under its entry lock.
    ///
    /// `f` sees the current record and may change `capacity` and `current_count`;
    /// status and timestamp are fixed up afterwards. Returns whatever `f` returned
    /// together with the updated gate.
    pub fn modify_gate<R>(
        &self,
        id: &str,
        f: impl FnOnce(&mut Gate) -> R,
    ) -> Result<(R, Gate), StoreError> {
        let (result, updated) = {
            let mut entry = self.gates.get_mut(id).ok_or_else(|| StoreError::NotFound {
                entity: "gate",
                id: id.to_string(),
            })?;
            let gate = entry.value_mut();

            let result = f(gate);
            gate.status = GateStatus::from_occupancy(gate.current_count, gate.capacity);
            gate.last_updated = Utc::now();

            (result, gate.clone())
        };

        debug!(
            gate = %updated.name,
            count = updated.current_count,
            status = %updated.status,
            "Gate updated"
        );
        let _ = self.events_tx.send(StoreEvent::GateUpdated(updated.clone()));

        Ok((result, updated))
    }

    // ── Alerts ───────────────────────────────────────────────────────────────

    pub fn create_alert(&self, new_alert: NewAlert) -> Alert {
        let alert = Alert {
            id: new_id(),
            gate_id: new_alert.gate_id,
            kind: new_alert.kind,
            message: new_alert.message,
            severity: new_alert.severity,
            is_active: true,
            created_at: Utc::now(),
            acknowledged_at: None,
        };
        self.alerts.insert(alert.id.clone(), alert.clone());

        info!(
            alert_id = %alert.id,
            gate_id = %alert.gate_id,
            message = %alert.message,
            "Alert raised"
        );
        let _ = self.events_tx.send(StoreEvent::AlertRaised(alert.clone()));

        alert
    }

    pub fn get_alert(&self, id: &str) -> Option<Alert> {
        self.alerts.get(id).map(|a| a.clone())
    }

    /// Active alerts, newest first
    pub fn list_active_alerts(&self) -> Vec<Alert> {
        let mut alerts: Vec<Alert> = self
            .alerts
            .iter()
            .filter(|a| a.is_active)
            .map(|a| a.value().clone())
            .collect();
        alerts.sort_by(|a, b| (b.created_at, &b.id).cmp(&(a.created_at, &a.id)));
        alerts
    }

    /// Mark an alert as handled. Acknowledging twice keeps the first timestamp.
    pub fn acknowledge_alert(&self, id: &str) -> Result<Alert, StoreError> {
        let acknowledged = {
            let mut entry = self.alerts.get_mut(id).ok_or_else(|| StoreError::NotFound {
                entity: "alert",
                id: id.to_string(),
            })?;
            let alert = entry.value_mut();
            alert.is_active = false;
            alert.acknowledged_at.get_or_insert_with(Utc::now);
            alert.clone()
        };

        info!(alert_id = %id, "Alert acknowledged");
        let _ = self
            .events_tx
            .send(StoreEvent::AlertAcknowledged(acknowledged.clone()));

        Ok(acknowledged)
    }

    // ── Chat log ─────────────────────────────────────────────────────────────

    pub fn append_chat_message(&self, message: &str, response: &str) -> ChatMessage {
        let entry = ChatMessage {
            id: new_id(),
            message: message.to_string(),
            response: response.to_string(),
            timestamp: Utc::now(),
        };
        self.chat_log
            .write()
            .expect("chat log lock poisoned")
            .push(entry.clone());
        entry
    }

    /// Most recent exchanges, newest first
    pub fn recent_chat_messages(&self, limit: usize) -> Vec<ChatMessage> {
        self.chat_log
            .read()
            .expect("chat log lock poisoned")
            .iter()
            .rev()
            .take(limit)
            .cloned()
            .collect()
    }

    // ── Media ────────────────────────────────────────────────────────────────

    pub fn create_media(&self, new_media: NewMedia) -> MediaRecord {
        let record = MediaRecord {
            id: new_id(),
            filename: new_media.filename,
            original_name: new_media.original_name,
            size: new_media.size,
            mime_type: new_media.mime_type,
            uploaded_at: Utc::now(),
            processed_at: None,
            is_processed: false,
            heatmap_data: None,
        };
        self.media.insert(record.id.clone(), record.clone());
        record
    }

    pub fn get_media(&self, id: &str) -> Option<MediaRecord> {
        self.media.get(id).map(|m| m.clone())
    }

    /// All media records, newest upload first
    pub fn list_media(&self) -> Vec<MediaRecord> {
        let mut records: Vec<MediaRecord> =
            self.media.iter().map(|m| m.value().clone()).collect();
        records.sort_by(|a, b| (b.uploaded_at, &b.id).cmp(&(a.uploaded_at, &a.id)));
        records
    }

    /// Apply a partial update; `None` when the record does not exist
    pub fn update_media(&self, id: &str, update: MediaUpdate) -> Option<MediaRecord> {
        let updated = {
            let mut entry = self.media.get_mut(id)?;
            let record = entry.value_mut();

            if let Some(processed) = update.is_processed {
                record.is_processed = processed;
            }
            if let Some(at) = update.processed_at {
                record.processed_at = Some(at);
            }
            if let Some(heatmap) = update.heatmap_data {
                record.heatmap_data = Some(heatmap);
            }
            record.clone()
        };

        if updated.is_processed {
            let _ = self
                .events_tx
                .send(StoreEvent::MediaProcessed(updated.clone()));
        }

        Some(updated)
    }

    /// Subscribe to store change events
    pub fn subscribe(&self) -> broadcast::Receiver<StoreEvent> {
        self.events_tx.subscribe()
    }
}

impl Default for StateStore {
    fn default() -> Self {
        Self::new()
    }
}

/// Time-ordered identifier
fn new_id() -> String {
    Uuid::now_v7().to_string()
}
