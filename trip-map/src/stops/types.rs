//! Stop-monitor DTOs and their map projection.

use geojson::{Feature, FeatureCollection, Geometry, JsonObject, Value};
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::domain::LatLon;
use crate::geo::feature_collection;

/// One stop near the queried box.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StopRecord {
    #[serde(alias = "stop_id")]
    pub stop_id: String,
    #[serde(alias = "stop_name")]
    pub stop_name: String,
    #[serde(alias = "stop_lat")]
    pub lat: f64,
    #[serde(alias = "stop_lon")]
    pub lon: f64,
}

/// The service returns either a bare list or `{"stops": [...]}`.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum StopsResponse {
    List(Vec<StopRecord>),
    Wrapped { stops: Vec<StopRecord> },
}

impl StopsResponse {
    pub fn into_stops(self) -> Vec<StopRecord> {
        match self {
            StopsResponse::List(stops) | StopsResponse::Wrapped { stops } => stops,
        }
    }
}

/// Project stops to point features with `stop_id`, `stop_name` and
/// `type = "Stop"` properties. Stops with invalid coordinates are skipped.
pub fn stops_to_feature_collection(stops: &[StopRecord]) -> FeatureCollection {
    let features = stops
        .iter()
        .filter_map(|stop| match LatLon::new(stop.lat, stop.lon) {
            Ok(position) => Some(stop_feature(stop, position)),
            Err(e) => {
                warn!(stop_id = %stop.stop_id, error = %e, "skipping stop");
                None
            }
        })
        .collect();
    feature_collection(features)
}

fn stop_feature(stop: &StopRecord, position: LatLon) -> Feature {
    let mut properties = JsonObject::new();
    properties.insert("stop_id".into(), stop.stop_id.clone().into());
    properties.insert("stop_name".into(), stop.stop_name.clone().into());
    properties.insert("type".into(), "Stop".into());

    Feature {
        bbox: None,
        geometry: Some(Geometry::new(Value::Point(position.to_position()))),
        id: None,
        properties: Some(properties),
        foreign_members: None,
    }
}
