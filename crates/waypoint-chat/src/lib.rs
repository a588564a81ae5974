//! Conversational geospatial pipeline for Waypoint.
//!
//! A model answers in free text with every place wrapped in location tags;
//! the tags are extracted, geocoded one by one, and stripped again before the
//! text reaches the user alongside a list of coordinates.

pub mod assistant;
pub mod context;
pub mod error;
pub mod geocode;
pub mod orchestrator;
pub mod prompt;
pub mod provider;
pub mod response;
pub mod tags;

pub use assistant::{ChatSettings, GeoAssistant};
pub use context::{ContextStore, Role, Turn};
pub use error::ChatError;
pub use geocode::{
    build_geocoder, GeoCandidate, GeoPoint, GeocodeError, GeocodingProvider, GeocodingResolver,
    Resolution, ResolutionMap,
};
pub use orchestrator::QueryOrchestrator;
pub use prompt::{ModelRequest, SYSTEM_CONTRACT};
pub use provider::{build_model_provider, ModelProvider};
pub use response::{ChatReply, Coordinate, ResponseAssembler};
