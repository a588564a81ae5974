//! Response assembly.
//!
//! Merges the model's display text with the resolved coordinates into the
//! reply the client renders: clean text for the chat pane, points for the map.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::geocode::{Resolution, ResolutionMap};
use crate::tags;

/// A resolved location as the client receives it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    pub name: String,
    pub lat: f64,
    pub lon: f64,
}

/// Body of a successful chat reply.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatReply {
    /// Model answer with location markers removed.
    pub response: String,
    /// Successfully resolved mentions, in the order they appear in the text.
    pub coordinates: Vec<Coordinate>,
}

/// Per-outcome counts for one assembled reply.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ResolutionTally {
    pub found: usize,
    pub not_found: usize,
    pub failed: usize,
}

impl ResolutionTally {
    pub fn of(mentions: &[String], resolutions: &ResolutionMap) -> Self {
        let mut tally = Self::default();
        for mention in mentions {
            match resolutions.get(mention) {
                Some(Resolution::Found(_)) => tally.found += 1,
                Some(Resolution::Failed(_)) => tally.failed += 1,
                Some(Resolution::NotFound) | None => tally.not_found += 1,
            }
        }
        tally
    }
}

/// Builds `ChatReply` values. Stateless.
#[derive(Debug, Default, Clone, Copy)]
pub struct ResponseAssembler;

impl ResponseAssembler {
    /// Strip markers from `raw` and attach the coordinates of every mention
    /// that resolved. Unresolved and failed mentions are left out.
    pub fn assemble(
        &self,
        raw: &str,
        mentions: &[String],
        resolutions: &ResolutionMap,
    ) -> ChatReply {
        let mut coordinates: Vec<Coordinate> = Vec::with_capacity(mentions.len());
        for mention in mentions {
            if coordinates.iter().any(|c| &c.name == mention) {
                continue;
            }
            if let Some(point) = resolutions.get(mention).and_then(Resolution::point) {
                coordinates.push(Coordinate {
                    name: mention.clone(),
                    lat: point.lat,
                    lon: point.lon,
                });
            }
        }

        let tally = ResolutionTally::of(mentions, resolutions);
        debug!(
            found = tally.found,
            not_found = tally.not_found,
            failed = tally.failed,
            "Reply assembled"
        );

        ChatReply {
            response: tags::strip_tags(raw),
            coordinates,
        }
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geocode::GeoPoint;

    fn found(lat: f64, lon: f64) -> Resolution {
        Resolution::Found(GeoPoint { lat, lon })
    }

    fn names(v: &[&str]) -> Vec<String> {
        v.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_assemble_strips_tags_and_keeps_order() {
        let raw = "Visit [LOCATION]Eiffel Tower, Paris[/LOCATION] and [LOCATION]Louvre, Paris[/LOCATION].";
        let mentions = names(&["Eiffel Tower, Paris", "Louvre, Paris"]);
        let mut map = ResolutionMap::new();
        map.insert(mentions[1].clone(), found(48.8606, 2.3376));
        map.insert(mentions[0].clone(), found(48.8584, 2.2945));

        let reply = ResponseAssembler.assemble(raw, &mentions, &map);
        assert_eq!(reply.response, "Visit Eiffel Tower, Paris and Louvre, Paris.");
        assert_eq!(reply.coordinates.len(), 2);
        assert_eq!(reply.coordinates[0].name, "Eiffel Tower, Paris");
        assert_eq!(reply.coordinates[0].lat, 48.8584);
        assert_eq!(reply.coordinates[1].name, "Louvre, Paris");
        assert_eq!(reply.coordinates[1].lon, 2.3376);
    }

    #[test]
    fn test_unresolved_and_failed_excluded() {
        let raw = "[LOCATION]A[/LOCATION] [LOCATION]B[/LOCATION] [LOCATION]C[/LOCATION]";
        let mentions = names(&["A", "B", "C"]);
        let mut map = ResolutionMap::new();
        map.insert("A".to_string(), Resolution::NotFound);
        map.insert("B".to_string(), found(1.0, 2.0));
        map.insert("C".to_string(), Resolution::Failed("timeout".to_string()));

        let reply = ResponseAssembler.assemble(raw, &mentions, &map);
        assert_eq!(reply.response, "A B C");
        assert_eq!(
            reply.coordinates,
            vec![Coordinate {
                name: "B".to_string(),
                lat: 1.0,
                lon: 2.0
            }]
        );
    }

    #[test]
    fn test_plain_text_passes_through() {
        let reply = ResponseAssembler.assemble("No places here.", &[], &ResolutionMap::new());
        assert_eq!(reply.response, "No places here.");
        assert!(reply.coordinates.is_empty());
    }

    #[test]
    fn test_json_field_names() {
        let reply = ChatReply {
            response: "Pune".to_string(),
            coordinates: vec![Coordinate {
                name: "Pune, Maharashtra".to_string(),
                lat: 18.52,
                lon: 73.85,
            }],
        };
        let json = serde_json::to_value(&reply).unwrap();
        assert_eq!(json["response"], "Pune");
        assert_eq!(json["coordinates"][0]["name"], "Pune, Maharashtra");
        assert_eq!(json["coordinates"][0]["lat"], 18.52);
        assert_eq!(json["coordinates"][0]["lon"], 73.85);
    }

    #[test]
    fn test_tally_counts() {
        let mentions = names(&["A", "B", "C", "D"]);
        let mut map = ResolutionMap::new();
        map.insert("A".to_string(), found(0.0, 0.0));
        map.insert("B".to_string(), Resolution::NotFound);
        map.insert("C".to_string(), Resolution::Failed("x".to_string()));
        let tally = ResolutionTally::of(&mentions, &map);
        assert_eq!(
            tally,
            ResolutionTally {
                found: 1,
                not_found: 2,
                failed: 1
            }
        );
    }
}
