//! Routing service (OpenTripPlanner) response DTOs.
//!
//! These mirror the `/plan` JSON. Fields the backend sometimes omits are
//! `Option` or defaulted. Leg endpoints stay as raw JSON so a malformed
//! place degrades to a placeholder instead of failing the whole response.

use serde::Deserialize;
use serde_json::Value;

/// Top-level `/plan` response.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OtpResponse {
    /// Echo of the request parameters.
    #[serde(default)]
    pub request_parameters: Option<Value>,

    /// Present on success.
    pub plan: Option<PlanDto>,

    /// Present when the service could not plan.
    pub error: Option<OtpErrorDto>,

    /// Backend status, e.g. `{"Value": "OK"}`.
    #[serde(rename = "RetStatus", default)]
    pub ret_status: Option<RetStatusDto>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct RetStatusDto {
    pub value: String,
    pub comments: Option<String>,
}

/// Planner error body, e.g. "no trip found".
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OtpErrorDto {
    pub id: Option<i64>,
    pub msg: Option<String>,
    pub message: Option<String>,
}

impl OtpErrorDto {
    /// Best available human-readable message.
    pub fn describe(&self) -> String {
        self.msg
            .clone()
            .or_else(|| self.message.clone())
            .unwrap_or_else(|| match self.id {
                Some(id) => format!("planner error {id}"),
                None => "planner error".to_string(),
            })
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlanDto {
    /// Query instant, epoch millis.
    pub date: Option<i64>,
    #[serde(default)]
    pub from: Value,
    #[serde(default)]
    pub to: Value,
    #[serde(default)]
    pub itineraries: Vec<ItineraryDto>,
}

/// A place as the backend sends it.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaceDto {
    pub name: Option<String>,
    pub lat: Option<f64>,
    pub lon: Option<f64>,
    pub stop_id: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ItineraryDto {
    /// Seconds.
    pub duration: Option<f64>,
    pub start_time: i64,
    pub end_time: i64,
    #[serde(default)]
    pub walk_time: f64,
    #[serde(default)]
    pub transit_time: f64,
    #[serde(default)]
    pub waiting_time: f64,
    #[serde(default)]
    pub walk_distance: f64,
    #[serde(default)]
    pub transfers: u32,
    #[serde(default)]
    pub legs: Vec<LegDto>,
    pub zone_info: Option<ZoneInfoDto>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LegDto {
    pub start_time: i64,
    pub end_time: i64,
    /// Seconds; positive is late.
    #[serde(default)]
    pub departure_delay: i64,
    #[serde(default)]
    pub arrival_delay: i64,
    #[serde(default)]
    pub real_time: bool,
    /// Meters.
    #[serde(default)]
    pub distance: Option<f64>,
    pub mode: String,
    pub route: Option<String>,
    pub route_color: Option<String>,
    #[serde(default)]
    pub from: Value,
    #[serde(default)]
    pub to: Value,
    pub leg_geometry: Option<LegGeometryDto>,
    /// Seconds.
    pub duration: Option<f64>,
    pub transit_leg: Option<bool>,
    pub intermediate_stops: Option<Vec<Value>>,
    pub rented_bike: Option<bool>,
    pub alerts: Option<Vec<AlertDto>>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LegGeometryDto {
    pub points: GeometryPointsDto,
    /// Number of encoded points, when the backend reports it.
    pub length: Option<usize>,
}

/// Leg path: either explicit points or a Google encoded polyline.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum GeometryPointsDto {
    Decoded(Vec<LatLonDto>),
    Encoded(String),
}

#[derive(Debug, Clone, Copy, Deserialize)]
pub struct LatLonDto {
    pub lat: f64,
    pub lon: f64,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ZoneInfoDto {
    #[serde(default)]
    pub zones: Vec<String>,
    #[serde(default)]
    pub ordered_zones: Vec<String>,
    #[serde(default)]
    pub short_distance_ticket: bool,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AlertDto {
    pub effective_start_date: i64,
    pub effective_end_date: i64,
    #[serde(default)]
    pub alert_description_text: String,
    #[serde(default)]
    pub alert_category: i64,
    pub alert_url: Option<String>,
    pub alert_header_text: Option<String>,
}
