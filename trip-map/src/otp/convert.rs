//! Conversion from routing DTOs to domain types.
//!
//! Malformed places become the "Unknown location" placeholder. An
//! itinerary that cannot be converted at all (unknown mode, inverted time
//! range, undecodable geometry) is skipped with a warning so the rest of
//! the plan still renders. Itineraries that convert but fail validation
//! are kept aside in [`Plan::flagged`].

use serde_json::Value;
use tracing::{debug, warn};

use crate::domain::{
    Alert, DomainError, Itinerary, ItineraryStats, LatLon, Leg, Location, Mode, Plan, Timestamp,
    UNKNOWN_LOCATION_NAME, ZoneInfo,
};

use super::types::{
    AlertDto, GeometryPointsDto, ItineraryDto, LegDto, LegGeometryDto, OtpResponse, PlaceDto,
    PlanDto, ZoneInfoDto,
};

/// Precision of the encoded polylines the routing service emits.
const POLYLINE_PRECISION: u32 = 5;

/// Error during DTO to domain conversion.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ConversionError {
    /// The response carried no plan.
    #[error("no plan: {0}")]
    NoPlan(String),

    #[error("unknown mode: {0}")]
    UnknownMode(String),

    #[error("invalid geometry: {0}")]
    InvalidGeometry(String),

    #[error(transparent)]
    Domain(#[from] DomainError),
}

/// Convert a full `/plan` response.
pub fn convert_response(response: &OtpResponse) -> Result<Plan, ConversionError> {
    match (&response.plan, &response.error) {
        (Some(plan), _) => Ok(convert_plan(plan)),
        (None, Some(error)) => Err(ConversionError::NoPlan(error.describe())),
        (None, None) => Err(ConversionError::NoPlan("response has no plan".to_string())),
    }
}

/// Convert a plan, skipping itineraries that fail to convert.
pub fn convert_plan(dto: &PlanDto) -> Plan {
    let from = convert_place(&dto.from);
    let to = convert_place(&dto.to);

    let mut candidates = Vec::with_capacity(dto.itineraries.len());
    for (index, itinerary) in dto.itineraries.iter().enumerate() {
        match convert_itinerary(itinerary) {
            Ok(converted) => candidates.push(converted),
            Err(e) => warn!(index, error = %e, "skipping itinerary"),
        }
    }

    let plan = Plan::new(dto.date.map(Timestamp::from_millis), from, to, candidates);
    for flagged in &plan.flagged {
        warn!(
            index = flagged.response_index,
            issues = ?flagged.issues,
            "itinerary failed validation"
        );
    }
    debug!(
        itineraries = plan.itineraries.len(),
        flagged = plan.flagged.len(),
        "plan converted"
    );
    plan
}

/// Convert one itinerary and all of its legs.
pub fn convert_itinerary(dto: &ItineraryDto) -> Result<Itinerary, ConversionError> {
    let legs = dto
        .legs
        .iter()
        .map(convert_leg)
        .collect::<Result<Vec<_>, _>>()?;

    let stats = ItineraryStats {
        duration: dto
            .duration
            .unwrap_or_else(|| dto.end_time.saturating_sub(dto.start_time) as f64 / 1000.0),
        walk_time: dto.walk_time,
        transit_time: dto.transit_time,
        waiting_time: dto.waiting_time,
        walk_distance: dto.walk_distance,
        transfers: dto.transfers,
    };

    let itinerary = Itinerary::new(
        Timestamp::from_millis(dto.start_time),
        Timestamp::from_millis(dto.end_time),
        legs,
        stats,
    )?;

    Ok(match &dto.zone_info {
        Some(zone_info) => itinerary.with_zone_info(convert_zone_info(zone_info)),
        None => itinerary,
    })
}

/// Convert one leg.
pub fn convert_leg(dto: &LegDto) -> Result<Leg, ConversionError> {
    let mode: Mode = dto
        .mode
        .parse()
        .map_err(|_| ConversionError::UnknownMode(dto.mode.clone()))?;

    let mut leg = Leg::new(
        mode,
        convert_place(&dto.from),
        convert_place(&dto.to),
        Timestamp::from_millis(dto.start_time),
        Timestamp::from_millis(dto.end_time),
    )?
    .with_delays(dto.departure_delay, dto.arrival_delay)
    .with_real_time(dto.real_time);

    if let Some(distance) = dto.distance {
        leg = leg.with_distance(distance);
    }

    if let Some(route) = &dto.route {
        leg = leg.with_route(route.as_str());
    }
    if let Some(color) = &dto.route_color {
        leg = leg.with_route_color(normalize_color(color));
    }
    if let Some(geometry) = &dto.leg_geometry {
        leg = leg.with_geometry(convert_geometry(geometry)?);
    }
    if let Some(duration) = dto.duration {
        leg = leg.with_duration_secs(duration);
    }
    if let Some(transit_leg) = dto.transit_leg {
        leg = leg.with_transit_leg(transit_leg);
    }
    if let Some(stops) = &dto.intermediate_stops {
        leg = leg.with_intermediate_stops(stops.iter().map(convert_place).collect());
    }
    if let Some(rented) = dto.rented_bike {
        leg = leg.with_rented_bike(rented);
    }
    if let Some(alerts) = &dto.alerts {
        leg = leg.with_alerts(alerts.iter().map(convert_alert).collect());
    }

    Ok(leg)
}

/// Read a place, falling back to the unknown-location placeholder.
///
/// A place with coordinates but a blank name keeps its position.
pub fn convert_place(value: &Value) -> Location {
    let place: PlaceDto = match serde_json::from_value(value.clone()) {
        Ok(place) => place,
        Err(e) => {
            warn!(error = %e, "malformed place, using placeholder");
            return Location::unknown();
        }
    };

    let position = match (place.lat, place.lon) {
        (Some(lat), Some(lon)) => LatLon::new(lat, lon),
        _ => {
            warn!(name = ?place.name, "place without coordinates, using placeholder");
            return Location::unknown();
        }
    };

    match position {
        Ok(position) => match place.name {
            Some(name) if !name.trim().is_empty() => Location::new(name, position),
            _ => Location::new(UNKNOWN_LOCATION_NAME, position),
        },
        Err(e) => {
            warn!(error = %e, "place with invalid coordinates, using placeholder");
            Location::unknown()
        }
    }
}

/// Decode leg geometry, preserving point order.
pub fn convert_geometry(dto: &LegGeometryDto) -> Result<Vec<LatLon>, ConversionError> {
    match &dto.points {
        GeometryPointsDto::Decoded(points) => points
            .iter()
            .map(|p| LatLon::new(p.lat, p.lon).map_err(ConversionError::from))
            .collect(),
        GeometryPointsDto::Encoded(encoded) => {
            if encoded.is_empty() {
                return Ok(Vec::new());
            }
            let line = polyline::decode_polyline(encoded, POLYLINE_PRECISION)
                .map_err(|e| ConversionError::InvalidGeometry(e.to_string()))?;
            line.0
                .iter()
                .map(|c| LatLon::new(c.y, c.x).map_err(ConversionError::from))
                .collect()
        }
    }
}

fn convert_zone_info(dto: &ZoneInfoDto) -> ZoneInfo {
    ZoneInfo {
        zones: dto.zones.clone(),
        ordered_zones: dto.ordered_zones.clone(),
        short_distance_ticket: dto.short_distance_ticket,
    }
}

fn convert_alert(dto: &AlertDto) -> Alert {
    Alert {
        effective_start: Timestamp::from_millis(dto.effective_start_date),
        effective_end: Timestamp::from_millis(dto.effective_end_date),
        description: dto.alert_description_text.clone(),
        category: dto.alert_category,
        url: dto.alert_url.clone(),
        header: dto.alert_header_text.clone(),
    }
}

/// OTP sends route colors without the leading `#`.
fn normalize_color(color: &str) -> String {
    if color.starts_with('#') {
        color.to_string()
    } else {
        format!("#{color}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::annotate::{Classifier, LegKind};
    use serde_json::json;

    fn leg_json(mode: &str, start: i64, end: i64) -> Value {
        json!({
            "startTime": start,
            "endTime": end,
            "mode": mode,
            "from": {"name": "Markt", "lat": 51.3397, "lon": 12.3731},
            "to": {"name": "Hauptbahnhof", "lat": 51.3455, "lon": 12.3821},
        })
    }

    fn response(itineraries: Vec<Value>) -> OtpResponse {
        serde_json::from_value(json!({
            "plan": {
                "date": 1_710_495_000_000i64,
                "from": {"name": "Markt", "lat": 51.3397, "lon": 12.3731},
                "to": {"name": "Hauptbahnhof", "lat": 51.3455, "lon": 12.3821},
                "itineraries": itineraries,
            }
        }))
        .unwrap()
    }

    #[test]
    fn converts_full_leg() {
        let dto: LegDto = serde_json::from_value(json!({
            "startTime": 0,
            "endTime": 600000,
            "departureDelay": 120,
            "arrivalDelay": 60,
            "realTime": true,
            "distance": 1800.5,
            "mode": "SUBURB",
            "route": "S3",
            "routeColor": "0f7a3c",
            "from": {"name": "Markt", "lat": 51.3397, "lon": 12.3731},
            "to": {"name": "Leipzig Hbf", "lat": 51.3455, "lon": 12.3821},
            "legGeometry": {"points": [
                {"lat": 51.3397, "lon": 12.3731},
                {"lat": 51.3455, "lon": 12.3821}
            ]},
            "duration": 600.0,
            "transitLeg": true,
            "intermediateStops": [
                {"name": "Wilhelm-Leuschner-Platz", "lat": 51.335, "lon": 12.375}
            ],
            "alerts": [{
                "effectiveStartDate": 0,
                "effectiveEndDate": 10,
                "alertDescriptionText": "Platform change",
                "alertCategory": 2
            }]
        }))
        .unwrap();

        let leg = convert_leg(&dto).unwrap();
        assert_eq!(leg.mode(), Mode::Suburb);
        assert_eq!(leg.route(), Some("S3"));
        assert_eq!(leg.route_color(), Some("#0f7a3c"));
        assert_eq!(leg.departure_delay(), 120);
        assert_eq!(leg.distance(), Some(1800.5));
        assert!(leg.is_real_time());
        assert_eq!(leg.geometry_points().len(), 2);
        assert_eq!(leg.intermediate_stops().unwrap()[0].name(), "Wilhelm-Leuschner-Platz");
        assert_eq!(leg.alerts()[0].description, "Platform change");
    }

    #[test]
    fn walk_without_distance_between_trams_stays_a_walk() {
        let ride = |from: &str, to: &str, start: i64, end: i64| {
            json!({
                "startTime": start,
                "endTime": end,
                "mode": "TRAM",
                "transitLeg": true,
                "from": {"name": from, "lat": 51.3397, "lon": 12.3731},
                "to": {"name": to, "lat": 51.3455, "lon": 12.3821},
            })
        };
        let walk = json!({
            "startTime": 600_000,
            "endTime": 900_000,
            "mode": "WALK",
            "transitLeg": false,
            "from": {"name": "Markt", "lat": 51.3397, "lon": 12.3731},
            "to": {"name": "Hauptbahnhof", "lat": 51.3455, "lon": 12.3821},
        });
        let itinerary: ItineraryDto = serde_json::from_value(json!({
            "startTime": 0,
            "endTime": 1_500_000,
            "legs": [
                ride("Augustusplatz", "Gohlis", 0, 600_000),
                walk,
                ride("Zoo", "Connewitz", 900_000, 1_500_000),
            ],
        }))
        .unwrap();

        let itinerary = convert_itinerary(&itinerary).unwrap();
        let legs = itinerary.legs();
        assert_eq!(legs[1].distance(), None);
        assert_eq!(Classifier::default().classify(&legs[1], 1, legs), LegKind::Walk);
    }

    #[test]
    fn malformed_places_become_unknown() {
        assert!(convert_place(&Value::Null).is_unknown());
        assert!(convert_place(&json!("Markt")).is_unknown());
        assert!(convert_place(&json!({"name": "Markt"})).is_unknown());
        assert!(convert_place(&json!({"name": "X", "lat": 100.0, "lon": 0.0})).is_unknown());

        let nameless = convert_place(&json!({"name": "  ", "lat": 51.0, "lon": 12.0}));
        assert!(nameless.is_unknown());
        assert_eq!(nameless.lat(), 51.0);
    }

    #[test]
    fn leg_with_missing_endpoint_still_converts() {
        let mut value = leg_json("BUS", 0, 1000);
        value["from"] = Value::Null;
        let dto: LegDto = serde_json::from_value(value).unwrap();
        let leg = convert_leg(&dto).unwrap();
        assert_eq!(leg.from().name(), "Unknown location");
        assert_eq!(leg.to().name(), "Hauptbahnhof");
    }

    #[test]
    fn unknown_mode_skips_itinerary_only() {
        let plan = convert_response(&response(vec![
            json!({"startTime": 0, "endTime": 1000, "legs": [leg_json("GONDOLA", 0, 1000)]}),
            json!({"startTime": 0, "endTime": 1000, "legs": [leg_json("TRAM", 0, 1000)]}),
        ]))
        .unwrap();
        assert_eq!(plan.itineraries.len(), 1);
        assert!(plan.flagged.is_empty());
        assert_eq!(plan.date, Some(Timestamp::from_millis(1_710_495_000_000)));
    }

    #[test]
    fn overlapping_legs_are_flagged() {
        let plan = convert_response(&response(vec![json!({
            "startTime": 0,
            "endTime": 2000,
            "legs": [leg_json("TRAM", 0, 1500), leg_json("BUS", 1000, 2000)],
        })]))
        .unwrap();
        assert!(plan.itineraries.is_empty());
        assert_eq!(plan.flagged.len(), 1);
    }

    #[test]
    fn empty_itinerary_is_skipped() {
        let plan = convert_response(&response(vec![
            json!({"startTime": 0, "endTime": 0, "legs": []}),
        ]))
        .unwrap();
        assert!(plan.itineraries.is_empty());
        assert!(plan.flagged.is_empty());
    }

    #[test]
    fn missing_plan_is_an_error() {
        let response: OtpResponse =
            serde_json::from_value(json!({"error": {"msg": "No trip found"}})).unwrap();
        assert_eq!(
            convert_response(&response),
            Err(ConversionError::NoPlan("No trip found".into()))
        );
    }

    #[test]
    fn decodes_encoded_polyline_in_order() {
        // Reference polyline: (38.5, -120.2), (40.7, -120.95), (43.252, -126.453)
        let dto = LegGeometryDto {
            points: GeometryPointsDto::Encoded("_p~iF~ps|U_ulLnnqC_mqNvxq`@".into()),
            length: Some(3),
        };
        let points = convert_geometry(&dto).unwrap();
        assert_eq!(points.len(), 3);
        assert!((points[0].lat - 38.5).abs() < 1e-9);
        assert!((points[0].lon + 120.2).abs() < 1e-9);
        assert!((points[2].lat - 43.252).abs() < 1e-9);
        assert!((points[2].lon + 126.453).abs() < 1e-9);
    }

    #[test]
    fn empty_encoded_geometry_has_no_points() {
        let dto = LegGeometryDto {
            points: GeometryPointsDto::Encoded(String::new()),
            length: Some(0),
        };
        assert!(convert_geometry(&dto).unwrap().is_empty());
    }
}
