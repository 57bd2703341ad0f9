use crate::media::HeatmapData;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Occupancy band of a gate, derived from `current_count / capacity`
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GateStatus {
    Normal,
    Moderate,
    Critical,
}

impl GateStatus {
    /// Critical above 100% of capacity, moderate above 75%, normal otherwise.
    ///
    /// Compared in integers so the boundaries are exact.
    pub fn from_occupancy(current_count: u32, capacity: u32) -> Self {
        let count = u64::from(current_count);
        let capacity = u64::from(capacity);

        if count > capacity {
            GateStatus::Critical
        } else if count * 4 > capacity * 3 {
            GateStatus::Moderate
        } else {
            GateStatus::Normal
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            GateStatus::Normal => "normal",
            GateStatus::Moderate => "moderate",
            GateStatus::Critical => "critical",
        }
    }
}

impl std::fmt::Display for GateStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A monitored stadium entry point
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Gate {
    pub id: String,

    /// Display name, unique across gates (e.g. "Gate A")
    pub name: String,

    pub capacity: u32,

    pub current_count: u32,

    /// Always equal to `GateStatus::from_occupancy(current_count, capacity)`
    pub status: GateStatus,

    pub last_updated: DateTime<Utc>,
}

impl Gate {
    /// `current_count / capacity`, or 0.0 for a zero-capacity gate
    pub fn occupancy_ratio(&self) -> f64 {
        occupancy_ratio(self.current_count, self.capacity)
    }

    /// Occupancy as a whole percentage of capacity
    pub fn percent_of_capacity(&self) -> u32 {
        (self.occupancy_ratio() * 100.0).round() as u32
    }

    pub fn is_over_capacity(&self) -> bool {
        self.current_count > self.capacity
    }
}

pub(crate) fn occupancy_ratio(current_count: u32, capacity: u32) -> f64 {
    if capacity == 0 {
        return 0.0;
    }
    f64::from(current_count) / f64::from(capacity)
}

/// Partial gate update. Status is never supplied; the store derives it.
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GateUpdate {
    pub current_count: Option<u32>,
    pub capacity: Option<u32>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AlertKind {
    CapacityExceeded,
    ThresholdWarning,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AlertSeverity {
    Low,
    Medium,
    High,
    Critical,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Alert {
    pub id: String,
    pub gate_id: String,
    #[serde(rename = "type")]
    pub kind: AlertKind,
    pub message: String,
    pub severity: AlertSeverity,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub acknowledged_at: Option<DateTime<Utc>>,
}

/// Fields supplied by the caller when raising an alert
#[derive(Clone, Debug)]
pub struct NewAlert {
    pub gate_id: String,
    pub kind: AlertKind,
    pub message: String,
    pub severity: AlertSeverity,
}

impl NewAlert {
    /// Critical `capacity_exceeded` alert for a gate that just went over capacity
    pub fn capacity_exceeded(gate: &Gate) -> Self {
        Self {
            gate_id: gate.id.clone(),
            kind: AlertKind::CapacityExceeded,
            message: format!(
                "{} has exceeded capacity ({}/{})",
                gate.name, gate.current_count, gate.capacity
            ),
            severity: AlertSeverity::Critical,
        }
    }
}

/// One question/answer exchange with the assistant
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub id: String,
    pub message: String,
    pub response: String,
    pub timestamp: DateTime<Utc>,
}

/// Uploaded video and its (simulated) analysis result
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MediaRecord {
    pub id: String,

    /// Opaque name of the stored file inside the upload directory
    pub filename: String,

    /// Client-supplied file name
    pub original_name: String,

    pub size: u64,
    pub mime_type: String,
    pub uploaded_at: DateTime<Utc>,
    pub processed_at: Option<DateTime<Utc>>,
    pub is_processed: bool,
    pub heatmap_data: Option<HeatmapData>,
}

#[derive(Clone, Debug)]
pub struct NewMedia {
    pub filename: String,
    pub original_name: String,
    pub size: u64,
    pub mime_type: String,
}

#[derive(Clone, Debug, Default)]
pub struct MediaUpdate {
    pub is_processed: Option<bool>,
    pub processed_at: Option<DateTime<Utc>>,
    pub heatmap_data: Option<HeatmapData>,
}

/// Change notification broadcast to live subscribers
#[derive(Clone, Debug)]
pub enum StoreEvent {
    GateUpdated(Gate),
    AlertRaised(Alert),
    AlertAcknowledged(Alert),
    MediaProcessed(MediaRecord),
}

impl StoreEvent {
    /// Gate the event concerns, if any
    pub fn gate_id(&self) -> Option<&str> {
        match self {
            StoreEvent::GateUpdated(gate) => Some(&gate.id),
            StoreEvent::AlertRaised(alert) | StoreEvent::AlertAcknowledged(alert) => {
                Some(&alert.gate_id)
            }
            StoreEvent::MediaProcessed(_) => None,
        }
    }
}
