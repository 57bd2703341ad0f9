// In-memory state store and entity model

mod entity;
mod store;

pub use entity::{
    Alert, AlertKind, AlertSeverity, ChatMessage, Gate, GateStatus, GateUpdate, MediaRecord,
    MediaUpdate, NewAlert, NewMedia, StoreEvent,
};
pub(crate) use entity::occupancy_ratio;
pub use store::{StateStore, StoreError, DEFAULT_GATES};

#[cfg(test)]
mod tests;
