//! Feature normalization from provider GeoJSON payloads.
//!
//! Every domain's data source delivers a GeoJSON-shaped document with a
//! `features` array. Normalization extracts `[lng, lat]` geometry and
//! domain-specific properties, defaulting missing optional values and
//! dropping records whose geometry cannot produce a valid position.

use crate::coord::LatLng;
use crate::layer::types::Domain;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

/// One normalized geographic record within a layer's loaded dataset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Feature {
    pub position: LatLng,
    pub attrs: FeatureAttrs,
}

/// Domain-specific attributes of a feature.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum FeatureAttrs {
    Road {
        kind: String,
        description: String,
    },
    Weather {
        value: f64,
        unit: String,
    },
    Fire {
        size: f64,
        name: String,
        status: String,
        containment: String,
    },
    Info {
        kind: String,
        name: String,
        description: String,
        amenities: Vec<String>,
    },
}

/// Normalizes a decoded JSON document into the registry's cache shape.
///
/// The contract is uniform across domains: always an array of [`Feature`],
/// with malformed source records dropped rather than propagated. A document
/// without a `features` array yields an empty set, which is a valid (empty)
/// success distinct from a load failure.
pub fn normalize_payload(domain: Domain, layer: &str, payload: &Value) -> Vec<Feature> {
    let Some(raw) = payload.get("features").and_then(Value::as_array) else {
        debug!(%domain, layer, "payload carries no features array");
        return Vec::new();
    };

    let mut features = Vec::with_capacity(raw.len());
    let mut dropped = 0usize;
    for record in raw {
        match normalize_record(domain, layer, record) {
            Some(feature) => features.push(feature),
            None => dropped += 1,
        }
    }
    if dropped > 0 {
        debug!(%domain, layer, dropped, "dropped records with malformed geometry");
    }
    features
}

fn normalize_record(domain: Domain, layer: &str, record: &Value) -> Option<Feature> {
    let coords = record
        .pointer("/geometry/coordinates")?
        .as_array()
        .filter(|c| c.len() >= 2)?;
    // GeoJSON order is [lng, lat]
    let lng = coords[0].as_f64()?;
    let lat = coords[1].as_f64()?;
    let position = LatLng::new(lat, lng)?;

    let props = record.get("properties").cloned().unwrap_or(Value::Null);
    let attrs = match domain {
        Domain::RoadConditions => FeatureAttrs::Road {
            kind: layer.to_string(),
            description: str_prop(&props, "description", ""),
        },
        Domain::WeatherCurrent | Domain::WeatherForecast => FeatureAttrs::Weather {
            value: props.get("value").and_then(Value::as_f64).unwrap_or(0.0),
            unit: str_prop(&props, "unit", ""),
        },
        Domain::Fire => FeatureAttrs::Fire {
            size: props.get("size").and_then(Value::as_f64).unwrap_or(0.0),
            name: str_prop(&props, "name", "Unknown Fire"),
            status: str_prop(&props, "status", "Unknown"),
            containment: str_prop(&props, "containment", "0%"),
        },
        Domain::OtherInfo => FeatureAttrs::Info {
            kind: layer.to_string(),
            name: str_prop(&props, "name", "Unknown Location"),
            description: str_prop(&props, "description", ""),
            amenities: props
                .get("amenities")
                .and_then(Value::as_array)
                .map(|a| {
                    a.iter()
                        .filter_map(Value::as_str)
                        .map(str::to_string)
                        .collect()
                })
                .unwrap_or_default(),
        },
    };

    Some(Feature { position, attrs })
}

fn str_prop(props: &Value, key: &str, default: &str) -> String {
    props
        .get(key)
        .and_then(Value::as_str)
        .unwrap_or(default)
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn fire_doc() -> Value {
        json!({
            "features": [
                {
                    "geometry": { "coordinates": [-120.0, 40.0] },
                    "properties": { "size": 250.0, "name": "Ridge Fire", "status": "Active", "containment": "40%" }
                },
                {
                    "geometry": { "coordinates": [-121.5, 39.2] },
                    "properties": {}
                }
            ]
        })
    }

    #[test]
    fn normalizes_fire_features_with_defaults() {
        let features = normalize_payload(Domain::Fire, "FireIncidents", &fire_doc());
        assert_eq!(features.len(), 2);
        assert_eq!(features[0].position.lat, 40.0);
        assert_eq!(features[0].position.lng, -120.0);
        match &features[1].attrs {
            FeatureAttrs::Fire {
                size,
                name,
                status,
                containment,
            } => {
                assert_eq!(*size, 0.0);
                assert_eq!(name, "Unknown Fire");
                assert_eq!(status, "Unknown");
                assert_eq!(containment, "0%");
            }
            other => panic!("expected fire attrs, got {:?}", other),
        }
    }

    #[test]
    fn drops_records_with_malformed_geometry() {
        let doc = json!({
            "features": [
                { "geometry": { "coordinates": [-120.0] } },
                { "geometry": { "coordinates": ["west", "north"] } },
                { "properties": { "name": "no geometry" } },
                { "geometry": { "coordinates": [-120.0, 200.0] } },
                { "geometry": { "coordinates": [-120.0, 40.0] } }
            ]
        });
        let features = normalize_payload(Domain::OtherInfo, "RestAreas", &doc);
        assert_eq!(features.len(), 1);
    }

    #[test]
    fn missing_features_array_is_empty_success() {
        let features = normalize_payload(Domain::Fire, "FireIncidents", &json!({"meta": 1}));
        assert!(features.is_empty());
    }

    #[test]
    fn info_amenities_are_collected() {
        let doc = json!({
            "features": [{
                "geometry": { "coordinates": [-118.2, 36.6] },
                "properties": {
                    "name": "Summit Rest Area",
                    "amenities": ["restrooms", "water", 42]
                }
            }]
        });
        let features = normalize_payload(Domain::OtherInfo, "RestAreas", &doc);
        match &features[0].attrs {
            FeatureAttrs::Info { amenities, .. } => {
                assert_eq!(amenities, &["restrooms", "water"]);
            }
            other => panic!("expected info attrs, got {:?}", other),
        }
    }
}
