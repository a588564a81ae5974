//! Google Maps Geocoding API provider.

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;

use super::{GeoCandidate, GeoPoint, GeocodeError, GeocodingProvider};

pub struct GoogleGeocoder {
    client: Client,
    base_url: String,
    api_key: String,
}

impl GoogleGeocoder {
    pub fn new(client: Client, base_url: String, api_key: String) -> Self {
        Self {
            client,
            base_url,
            api_key,
        }
    }
}

#[derive(Debug, Deserialize)]
struct GoogleResponse {
    status: String,
    #[serde(default)]
    results: Vec<GoogleResult>,
    error_message: Option<String>,
}

#[derive(Debug, Deserialize)]
struct GoogleResult {
    geometry: GoogleGeometry,
    formatted_address: Option<String>,
}

#[derive(Debug, Deserialize)]
struct GoogleGeometry {
    location: GoogleLatLng,
}

#[derive(Debug, Deserialize)]
struct GoogleLatLng {
    lat: f64,
    lng: f64,
}

/// Map a decoded response to candidates.
///
/// `ZERO_RESULTS` is a normal empty answer; every other non-`OK` status
/// (denied key, exhausted quota, bad request) is a failed lookup.
fn into_candidates(response: GoogleResponse) -> Result<Vec<GeoCandidate>, GeocodeError> {
    match response.status.as_str() {
        "OK" => Ok(response
            .results
            .into_iter()
            .map(|r| GeoCandidate {
                point: GeoPoint {
                    lat: r.geometry.location.lat,
                    lon: r.geometry.location.lng,
                },
                formatted_address: r.formatted_address,
            })
            .collect()),
        "ZERO_RESULTS" => Ok(Vec::new()),
        _ => Err(GeocodeError::Rejected {
            message: response
                .error_message
                .unwrap_or_else(|| "no error message".to_string()),
            status: response.status,
        }),
    }
}

#[async_trait]
impl GeocodingProvider for GoogleGeocoder {
    fn name(&self) -> &'static str {
        "google"
    }

    async fn geocode(&self, query: &str) -> Result<Vec<GeoCandidate>, GeocodeError> {
        let url = format!("{}/geocode/json", self.base_url);
        let response = self
            .client
            .get(&url)
            .query(&[("address", query), ("key", self.api_key.as_str())])
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(GeocodeError::Http { status, body });
        }

        let decoded: GoogleResponse = response.json().await?;
        into_candidates(decoded)
    }
}
