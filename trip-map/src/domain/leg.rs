//! Itinerary leg type.
//!
//! A `Leg` is one uninterrupted segment of travel: on foot, by bike or car,
//! or aboard a single transit vehicle.

use super::{Alert, DomainError, LatLon, Location, Mode, Timestamp};

/// One segment of an itinerary.
///
/// # Invariants
///
/// - `start_time <= end_time` (checked at construction)
/// - `geometry_points` keeps the exact order the routing service reported
///
/// # Examples
///
/// ```
/// use trip_map::domain::{Leg, Location, Mode, Timestamp};
///
/// let from = Location::from_coords("Markt", 51.3397, 12.3731).unwrap();
/// let to = Location::from_coords("Hauptbahnhof", 51.3455, 12.3821).unwrap();
///
/// let leg = Leg::new(
///     Mode::Tram,
///     from,
///     to,
///     Timestamp::from_millis(0),
///     Timestamp::from_millis(600_000),
/// )
/// .unwrap()
/// .with_route("11")
/// .with_delays(60, 120);
///
/// assert!(leg.is_transit_leg());
/// assert_eq!(leg.duration_secs(), 600.0);
/// assert_eq!(leg.route(), Some("11"));
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Leg {
    mode: Mode,
    from: Location,
    to: Location,
    start_time: Timestamp,
    end_time: Timestamp,
    departure_delay: i64,
    arrival_delay: i64,
    real_time: bool,
    distance: Option<f64>,
    route: Option<String>,
    route_color: Option<String>,
    geometry_points: Vec<LatLon>,
    transit_leg: bool,
    intermediate_stops: Option<Vec<Location>>,
    duration_secs: f64,
    rented_bike: bool,
    alerts: Vec<Alert>,
}

impl Leg {
    /// Construct a leg, validating its time range.
    ///
    /// Defaults: no delays, unknown distance, no geometry, `transit_leg` set
    /// from the mode, duration derived from the time range.
    ///
    /// # Errors
    ///
    /// Returns `Err` if `end_time` is before `start_time`.
    pub fn new(
        mode: Mode,
        from: Location,
        to: Location,
        start_time: Timestamp,
        end_time: Timestamp,
    ) -> Result<Self, DomainError> {
        if end_time < start_time {
            return Err(DomainError::InvalidTimeRange {
                start: start_time.as_millis(),
                end: end_time.as_millis(),
            });
        }

        Ok(Self {
            mode,
            from,
            to,
            start_time,
            end_time,
            departure_delay: 0,
            arrival_delay: 0,
            real_time: false,
            distance: None,
            route: None,
            route_color: None,
            geometry_points: Vec::new(),
            transit_leg: mode.is_transit(),
            intermediate_stops: None,
            duration_secs: end_time.millis_since(start_time) as f64 / 1000.0,
            rented_bike: false,
            alerts: Vec::new(),
        })
    }

    /// Set departure and arrival delays, in seconds.
    pub fn with_delays(mut self, departure_delay: i64, arrival_delay: i64) -> Self {
        self.departure_delay = departure_delay;
        self.arrival_delay = arrival_delay;
        self
    }

    /// Mark whether the times come from realtime data.
    pub fn with_real_time(mut self, real_time: bool) -> Self {
        self.real_time = real_time;
        self
    }

    /// Set the travelled distance in meters.
    pub fn with_distance(mut self, meters: f64) -> Self {
        self.distance = Some(meters);
        self
    }

    /// Set the route short name (e.g. "11", "S3").
    pub fn with_route(mut self, route: impl Into<String>) -> Self {
        let route = route.into();
        self.route = (!route.is_empty()).then_some(route);
        self
    }

    /// Set the route color. Only `#rrggbb` values are kept.
    pub fn with_route_color(mut self, color: impl Into<String>) -> Self {
        let color = color.into();
        self.route_color = is_hex_color(&color).then_some(color);
        self
    }

    /// Set the path geometry.
    pub fn with_geometry(mut self, points: Vec<LatLon>) -> Self {
        self.geometry_points = points;
        self
    }

    /// Override whether the backend flagged this as a transit leg.
    pub fn with_transit_leg(mut self, transit_leg: bool) -> Self {
        self.transit_leg = transit_leg;
        self
    }

    /// Set the stops passed between `from` and `to`.
    pub fn with_intermediate_stops(mut self, stops: Vec<Location>) -> Self {
        self.intermediate_stops = Some(stops);
        self
    }

    /// Override the reported duration in seconds.
    pub fn with_duration_secs(mut self, seconds: f64) -> Self {
        self.duration_secs = seconds;
        self
    }

    pub fn with_rented_bike(mut self, rented: bool) -> Self {
        self.rented_bike = rented;
        self
    }

    pub fn with_alerts(mut self, alerts: Vec<Alert>) -> Self {
        self.alerts = alerts;
        self
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn from(&self) -> &Location {
        &self.from
    }

    pub fn to(&self) -> &Location {
        &self.to
    }

    pub fn start_time(&self) -> Timestamp {
        self.start_time
    }

    pub fn end_time(&self) -> Timestamp {
        self.end_time
    }

    /// Departure delay in seconds (positive is late).
    pub fn departure_delay(&self) -> i64 {
        self.departure_delay
    }

    /// Arrival delay in seconds (positive is late).
    pub fn arrival_delay(&self) -> i64 {
        self.arrival_delay
    }

    pub fn is_real_time(&self) -> bool {
        self.real_time
    }

    /// Travelled distance in meters, if the backend reported one.
    pub fn distance(&self) -> Option<f64> {
        self.distance
    }

    pub fn route(&self) -> Option<&str> {
        self.route.as_deref()
    }

    pub fn route_color(&self) -> Option<&str> {
        self.route_color.as_deref()
    }

    /// Path points in travel order.
    pub fn geometry_points(&self) -> &[LatLon] {
        &self.geometry_points
    }

    /// Whether the backend flagged this leg as a ride on public transport.
    pub fn is_transit_leg(&self) -> bool {
        self.transit_leg
    }

    pub fn intermediate_stops(&self) -> Option<&[Location]> {
        self.intermediate_stops.as_deref()
    }

    /// Duration in seconds as reported by the backend.
    pub fn duration_secs(&self) -> f64 {
        self.duration_secs
    }

    pub fn is_rented_bike(&self) -> bool {
        self.rented_bike
    }

    pub fn alerts(&self) -> &[Alert] {
        &self.alerts
    }

    /// Milliseconds between start and end.
    pub fn elapsed_millis(&self) -> i64 {
        self.end_time.millis_since(self.start_time)
    }
}

fn is_hex_color(s: &str) -> bool {
    s.len() == 7
        && s.starts_with('#')
        && s[1..].chars().all(|c| c.is_ascii_hexdigit())
}
