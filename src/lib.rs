// In-memory state store and entity model
pub mod state;

// Occupancy simulation
pub mod simulation;

// Rule-based crowd assistant
pub mod assistant;

// Video uploads and simulated heatmap analysis
pub mod media;

// Configuration loading
pub mod config;

// HTTP and WebSocket APIs
pub mod api;

// Subscription management
pub mod subscription;
