use thiserror::Error;

/// Top-level error type for the Waypoint system.
///
/// Subsystem crates define their own error types and implement
/// `From<WaypointError>` so that configuration failures surfaced while
/// wiring a component flow through `?` unchanged.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum WaypointError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("API error: {0}")]
    Api(String),
}

impl From<toml::de::Error> for WaypointError {
    fn from(err: toml::de::Error) -> Self {
        WaypointError::Config(err.to_string())
    }
}

impl From<toml::ser::Error> for WaypointError {
    fn from(err: toml::ser::Error) -> Self {
        WaypointError::Serialization(err.to_string())
    }
}

/// A specialized `Result` type for Waypoint operations.
pub type Result<T> = std::result::Result<T, WaypointError>;
