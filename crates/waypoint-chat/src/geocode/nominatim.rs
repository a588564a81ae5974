//! OpenStreetMap Nominatim provider.
//!
//! No API key, but the public instance requires an identifying User-Agent
//! and at most one request per second; set `geocoding.throttle_ms`
//! accordingly when pointing at it.

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;

use super::{GeoCandidate, GeoPoint, GeocodeError, GeocodingProvider};

pub struct NominatimGeocoder {
    client: Client,
    base_url: String,
}

impl NominatimGeocoder {
    pub fn new(client: Client, base_url: String) -> Self {
        Self { client, base_url }
    }
}

// Nominatim encodes coordinates as strings.
#[derive(Debug, Deserialize)]
struct NominatimPlace {
    lat: String,
    lon: String,
    display_name: Option<String>,
}

fn into_candidates(places: Vec<NominatimPlace>) -> Result<Vec<GeoCandidate>, GeocodeError> {
    places
        .into_iter()
        .map(|place| {
            let lat = place
                .lat
                .parse::<f64>()
                .map_err(|_| GeocodeError::Malformed(format!("bad latitude {:?}", place.lat)))?;
            let lon = place
                .lon
                .parse::<f64>()
                .map_err(|_| GeocodeError::Malformed(format!("bad longitude {:?}", place.lon)))?;
            Ok(GeoCandidate {
                point: GeoPoint { lat, lon },
                formatted_address: place.display_name,
            })
        })
        .collect()
}

#[async_trait]
impl GeocodingProvider for NominatimGeocoder {
    fn name(&self) -> &'static str {
        "nominatim"
    }

    async fn geocode(&self, query: &str) -> Result<Vec<GeoCandidate>, GeocodeError> {
        let url = format!("{}/search", self.base_url);
        let response = self
            .client
            .get(&url)
            .query(&[("q", query), ("format", "json"), ("limit", "1")])
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(GeocodeError::Http { status, body });
        }

        let places: Vec<NominatimPlace> = response.json().await?;
        into_candidates(places)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn decode(body: &str) -> Result<Vec<GeoCandidate>, GeocodeError> {
        into_candidates(serde_json::from_str(body).unwrap())
    }

    #[test]
    fn test_parses_string_coordinates() {
        let body = r#"[{
            "place_id": 240109189,
            "lat": "48.8582599",
            "lon": "2.2945006",
            "display_name": "Tour Eiffel, Avenue Gustave Eiffel, Paris, France",
            "type": "attraction"
        }]"#;
        let candidates = decode(body).unwrap();
        assert_eq!(candidates.len(), 1);
        assert!((candidates[0].point.lat - 48.8582599).abs() < 1e-9);
        assert!((candidates[0].point.lon - 2.2945006).abs() < 1e-9);
        assert!(candidates[0]
            .formatted_address
            .as_deref()
            .unwrap()
            .starts_with("Tour Eiffel"));
    }

    #[test]
    fn test_empty_array_is_no_match() {
        assert!(decode("[]").unwrap().is_empty());
    }

    #[test]
    fn test_unparseable_coordinate_is_malformed() {
        let body = r#"[{ "lat": "north-ish", "lon": "2.29" }]"#;
        assert!(matches!(decode(body), Err(GeocodeError::Malformed(_))));
    }
}
