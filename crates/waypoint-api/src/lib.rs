//! Waypoint API crate - axum HTTP server and route handlers.
//!
//! Exposes the chat pipeline as `POST /chat`, plus health and conversation
//! history endpoints for diagnostics.

pub mod error;
pub mod handlers;
pub mod rate_limit;
pub mod routes;
pub mod state;

pub use error::ApiError;
pub use routes::{create_router, start_server};
pub use state::AppState;
