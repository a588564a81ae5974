//! Application state shared across all route handlers.

use std::sync::Arc;
use std::time::Instant;

use waypoint_chat::GeoAssistant;
use waypoint_core::WaypointConfig;

/// Shared application state, cloned into each handler task.
#[derive(Clone)]
pub struct AppState {
    /// Application configuration (read-only after startup).
    pub config: Arc<WaypointConfig>,
    /// The chat pipeline; owns the shared conversation context.
    pub assistant: Arc<GeoAssistant>,
    /// Server start time for uptime calculation.
    pub start_time: Instant,
}

impl AppState {
    pub fn new(config: WaypointConfig, assistant: GeoAssistant) -> Self {
        Self {
            config: Arc::new(config),
            assistant: Arc::new(assistant),
            start_time: Instant::now(),
        }
    }
}
