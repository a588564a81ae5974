pub mod config;
pub mod error;

pub use config::WaypointConfig;
pub use error::{Result, WaypointError};
