//! Geocoding: turning location mentions into coordinates.
//!
//! `GeocodingProvider` is the seam to the external service; `GeocodingResolver`
//! drives it over a batch of mentions with a fixed pause between calls and
//! isolates failures per mention, so one bad lookup never costs the others.

pub mod google;
pub mod nominatim;

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};
use waypoint_core::config::{GeocodingBackend, GeocodingConfig};

use crate::error::ChatError;

pub use google::GoogleGeocoder;
pub use nominatim::NominatimGeocoder;

// =============================================================================
// Types
// =============================================================================

/// A latitude/longitude pair in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub lat: f64,
    pub lon: f64,
}

/// One candidate returned by a geocoding provider.
#[derive(Debug, Clone, PartialEq)]
pub struct GeoCandidate {
    pub point: GeoPoint,
    /// Provider's canonical address for the match, when it reports one.
    pub formatted_address: Option<String>,
}

/// Outcome of resolving a single mention.
#[derive(Debug, Clone, PartialEq)]
pub enum Resolution {
    /// First candidate's coordinates.
    Found(GeoPoint),
    /// The provider answered with zero candidates.
    NotFound,
    /// The provider call itself failed.
    Failed(String),
}

impl Resolution {
    pub fn point(&self) -> Option<GeoPoint> {
        match self {
            Resolution::Found(point) => Some(*point),
            _ => None,
        }
    }

    /// Short human-readable description for logs.
    pub fn describe(&self) -> String {
        match self {
            Resolution::Found(p) => format!("({}, {})", p.lat, p.lon),
            Resolution::NotFound => "Coordinates not found".to_string(),
            Resolution::Failed(reason) => format!("Error: {}", reason),
        }
    }
}

/// Mention -> outcome, one entry per distinct mention.
pub type ResolutionMap = HashMap<String, Resolution>;

/// Errors from a geocoding provider call.
#[derive(Debug, thiserror::Error)]
pub enum GeocodeError {
    #[error("transport error: {0}")]
    Transport(String),
    #[error("HTTP {status}: {body}")]
    Http { status: u16, body: String },
    #[error("request rejected ({status}): {message}")]
    Rejected { status: String, message: String },
    #[error("malformed response: {0}")]
    Malformed(String),
}

impl From<reqwest::Error> for GeocodeError {
    fn from(err: reqwest::Error) -> Self {
        // The request URL may carry the provider key in its query.
        let err = err.without_url();
        if err.is_decode() {
            GeocodeError::Malformed(err.to_string())
        } else {
            GeocodeError::Transport(err.to_string())
        }
    }
}

// =============================================================================
// Provider trait
// =============================================================================

/// External geocoding service: name in, ordered candidates out.
#[async_trait]
pub trait GeocodingProvider: Send + Sync {
    /// Provider name for logging.
    fn name(&self) -> &'static str;

    /// Look up a location name. An empty vector means "no match"; an error
    /// means the lookup itself could not be carried out.
    async fn geocode(&self, query: &str) -> Result<Vec<GeoCandidate>, GeocodeError>;
}

/// Build the configured geocoding provider.
///
/// Fails with a configuration error when the provider needs a key that is
/// not set.
pub fn build_geocoder(config: &GeocodingConfig) -> Result<Arc<dyn GeocodingProvider>, ChatError> {
    let client = reqwest::Client::builder()
        .timeout(Duration::from_secs(config.timeout_secs))
        .user_agent(config.user_agent.clone())
        .build()
        .map_err(|e| ChatError::Config(format!("failed to build HTTP client: {}", e)))?;
    let base_url = config.effective_base_url();

    let provider: Arc<dyn GeocodingProvider> = match config.provider {
        GeocodingBackend::Google => {
            let api_key = config.api_key()?.ok_or_else(|| {
                ChatError::Config("Google geocoding requires an API key".to_string())
            })?;
            Arc::new(GoogleGeocoder::new(client, base_url, api_key))
        }
        GeocodingBackend::Nominatim => Arc::new(NominatimGeocoder::new(client, base_url)),
    };

    tracing::info!(
        provider = provider.name(),
        throttle_ms = config.throttle_ms,
        "Geocoding provider ready"
    );
    Ok(provider)
}

// =============================================================================
// GeocodingResolver
// =============================================================================

/// Resolves batches of mentions through a provider, one at a time.
pub struct GeocodingResolver {
    provider: Arc<dyn GeocodingProvider>,
    /// Pause between successive provider calls.
    throttle: Duration,
}

impl GeocodingResolver {
    pub fn new(provider: Arc<dyn GeocodingProvider>, throttle: Duration) -> Self {
        Self { provider, throttle }
    }

    pub fn provider_name(&self) -> &'static str {
        self.provider.name()
    }

    /// Resolve a single mention.
    ///
    /// The mention is trimmed before lookup; a mention that is empty after
    /// trimming is `NotFound` without calling the provider.
    pub async fn resolve_one(&self, mention: &str) -> Resolution {
        let query = mention.trim();
        if query.is_empty() {
            return Resolution::NotFound;
        }

        match self.provider.geocode(query).await {
            Ok(candidates) => match candidates.first() {
                Some(first) => {
                    debug!(
                        query,
                        address = first.formatted_address.as_deref().unwrap_or("-"),
                        candidates = candidates.len(),
                        "Geocoder matched"
                    );
                    Resolution::Found(first.point)
                }
                None => Resolution::NotFound,
            },
            Err(e) => Resolution::Failed(e.to_string()),
        }
    }

    /// Resolve every mention, keyed by the mention exactly as given.
    ///
    /// Never fails as a whole: each entry is either coordinates or a typed
    /// failure, and a failing lookup does not stop the remaining ones.
    pub async fn resolve_all(&self, mentions: &[String]) -> ResolutionMap {
        let mut resolved = ResolutionMap::with_capacity(mentions.len());
        let mut called = false;

        for mention in mentions {
            if resolved.contains_key(mention) {
                continue;
            }

            let needs_call = !mention.trim().is_empty();
            if needs_call && called && !self.throttle.is_zero() {
                tokio::time::sleep(self.throttle).await;
            }
            called |= needs_call;

            let outcome = self.resolve_one(mention).await;
            match &outcome {
                Resolution::Failed(reason) => warn!(
                    mention = %mention,
                    provider = self.provider.name(),
                    error = %reason,
                    "Geocoding failed"
                ),
                other => debug!(mention = %mention, outcome = %other.describe(), "Location looked up"),
            }
            resolved.insert(mention.clone(), outcome);
        }

        resolved
    }
}

// =============================================================================
// Tests
// =============================================================================
