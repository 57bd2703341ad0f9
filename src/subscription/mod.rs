// Live dashboard feed over WebSocket

pub mod manager;
pub mod protocol;

pub use manager::ConnectionManager;
pub use protocol::{ClientMessage, ServerMessage};
