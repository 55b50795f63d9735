//! Layer definitions in the map style-spec shape.

use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

/// Source holding the selected itinerary's features.
pub const ITINERARY_SOURCE: &str = "itinerary-source";

/// Source holding the stops around the current view.
pub const STOPS_SOURCE: &str = "stops-source";

pub const STOPS_LAYER: &str = "stops-layer";
pub const STOPS_LABELS_LAYER: &str = "stops-labels";

/// Itinerary layer ids in drawing order; later layers render on top.
pub const ITINERARY_LAYER_IDS: [&str; 7] = [
    "walk-layer",
    "tram-layer",
    "suburb-layer",
    "train-layer",
    "bus-layer",
    "leg-endpoints-layer",
    "intermediate-stops-layer",
];

/// Stop layer ids in drawing order.
pub const STOP_LAYER_IDS: [&str; 2] = [STOPS_LAYER, STOPS_LABELS_LAYER];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LayerKind {
    Line,
    Circle,
    Symbol,
}

/// One rendered layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct LayerSpec {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: LayerKind,
    pub source: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub minzoom: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub maxzoom: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub filter: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub layout: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub paint: Option<Value>,
}

impl LayerSpec {
    pub fn new(id: impl Into<String>, kind: LayerKind, source: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            kind,
            source: source.into(),
            minzoom: None,
            maxzoom: None,
            filter: None,
            layout: None,
            paint: None,
        }
    }

    pub fn with_zoom(mut self, minzoom: f64, maxzoom: f64) -> Self {
        self.minzoom = Some(minzoom);
        self.maxzoom = Some(maxzoom);
        self
    }

    pub fn with_filter(mut self, filter: Value) -> Self {
        self.filter = Some(filter);
        self
    }

    pub fn with_layout(mut self, layout: Value) -> Self {
        self.layout = Some(layout);
        self
    }

    pub fn with_paint(mut self, paint: Value) -> Self {
        self.paint = Some(paint);
        self
    }
}

fn route_line(id: &str, mode: &str, color: &str, width: f64) -> LayerSpec {
    LayerSpec::new(id, LayerKind::Line, ITINERARY_SOURCE)
        .with_filter(json!(["==", ["get", "mode"], mode]))
        .with_layout(json!({ "line-join": "round", "line-cap": "round" }))
        .with_paint(json!({ "line-color": color, "line-width": width }))
}

/// The full itinerary layer set, in [`ITINERARY_LAYER_IDS`] order.
pub fn itinerary_layers() -> Vec<LayerSpec> {
    let walk = LayerSpec::new(ITINERARY_LAYER_IDS[0], LayerKind::Line, ITINERARY_SOURCE)
        .with_filter(json!(["==", ["get", "mode"], "WALK"]))
        .with_layout(json!({ "line-join": "round", "line-cap": "round" }))
        .with_paint(json!({
            "line-color": "#6b7280",
            "line-width": 3,
            "line-dasharray": [1, 2],
        }));

    let endpoints = LayerSpec::new(ITINERARY_LAYER_IDS[5], LayerKind::Circle, ITINERARY_SOURCE)
        .with_filter(json!(["in", ["get", "type"], ["literal", ["Leg Start", "Leg End"]]]))
        .with_paint(json!({
            "circle-radius": 5,
            "circle-color": "#ffffff",
            "circle-stroke-width": 2,
            "circle-stroke-color": "#111827",
        }));

    let intermediate = LayerSpec::new(ITINERARY_LAYER_IDS[6], LayerKind::Circle, ITINERARY_SOURCE)
        .with_filter(json!(["==", ["get", "type"], "Intermediate Stop"]))
        .with_paint(json!({
            "circle-radius": 3,
            "circle-color": "#ffffff",
            "circle-stroke-width": 1,
            "circle-stroke-color": "#4b5563",
        }));

    vec![
        walk,
        route_line(ITINERARY_LAYER_IDS[1], "TRAM", "#dc2626", 5.0),
        route_line(ITINERARY_LAYER_IDS[2], "SUBURB", "#16a34a", 5.0),
        route_line(ITINERARY_LAYER_IDS[3], "TRAIN", "#15803d", 5.0),
        route_line(ITINERARY_LAYER_IDS[4], "BUS", "#9333ea", 5.0),
        endpoints,
        intermediate,
    ]
}

/// Stop circles and their name labels.
pub fn stop_layers() -> Vec<LayerSpec> {
    let circles = LayerSpec::new(STOPS_LAYER, LayerKind::Circle, STOPS_SOURCE)
        .with_zoom(14.0, 22.0)
        .with_paint(json!({
            "circle-radius": 4,
            "circle-color": "#ff0000",
            "circle-stroke-width": 1,
            "circle-stroke-color": "#000",
            "circle-opacity": 1,
            "circle-stroke-opacity": 1,
        }));

    let labels = LayerSpec::new(STOPS_LABELS_LAYER, LayerKind::Symbol, STOPS_SOURCE)
        .with_zoom(15.0, 22.0)
        .with_layout(json!({
            "text-field": ["get", "stop_name"],
            "text-size": 12,
            "text-offset": [0, 1.2],
            "text-anchor": "top",
        }))
        .with_paint(json!({
            "text-color": "#000",
            "text-halo-color": "#fff",
            "text-halo-width": 1,
        }));

    vec![circles, labels]
}
