//! Routing request parameters.

use std::collections::BTreeSet;

use chrono::{Duration, NaiveDate, NaiveTime};

use crate::domain::{LatLon, Mode};

/// Default number of itineraries to ask for.
pub const DEFAULT_NUM_ITINERARIES: u32 = 5;

/// Minutes the "earlier" and "later" searches move the requested time.
pub const SHIFT_MINUTES: i64 = 5;

/// A trip query for the routing service.
///
/// ```
/// use trip_map::domain::LatLon;
/// use trip_map::otp::RoutingRequest;
///
/// let request = RoutingRequest::new(
///     LatLon::new(51.3397, 12.3731).unwrap(),
///     LatLon::new(51.3455, 12.3821).unwrap(),
/// );
/// let pairs = request.query_pairs();
/// assert_eq!(pairs[0], ("fromPlace", "51.3397,12.3731".to_string()));
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct RoutingRequest {
    pub from: LatLon,
    pub to: LatLon,
    pub modes: BTreeSet<Mode>,
    pub num_itineraries: u32,
    /// Treat the time as the latest arrival instead of the departure.
    pub arrive_by: bool,
    pub date: Option<NaiveDate>,
    pub time: Option<NaiveTime>,
}

impl RoutingRequest {
    /// A departure-now request over all requestable modes.
    pub fn new(from: LatLon, to: LatLon) -> Self {
        Self {
            from,
            to,
            modes: Mode::REQUESTABLE.into_iter().collect(),
            num_itineraries: DEFAULT_NUM_ITINERARIES,
            arrive_by: false,
            date: None,
            time: None,
        }
    }

    /// Restrict to the given modes.
    pub fn with_modes(mut self, modes: impl IntoIterator<Item = Mode>) -> Self {
        self.modes = modes.into_iter().collect();
        self
    }

    pub fn with_num_itineraries(mut self, n: u32) -> Self {
        self.num_itineraries = n;
        self
    }

    pub fn departing_at(mut self, date: NaiveDate, time: NaiveTime) -> Self {
        self.date = Some(date);
        self.time = Some(time);
        self.arrive_by = false;
        self
    }

    pub fn arriving_by(mut self, date: NaiveDate, time: NaiveTime) -> Self {
        self.date = Some(date);
        self.time = Some(time);
        self.arrive_by = true;
        self
    }

    /// Query parameters for the `/plan` endpoint.
    ///
    /// Dates are `MM-DD-YYYY` and times `HH:MM`; both are omitted when unset.
    pub fn query_pairs(&self) -> Vec<(&'static str, String)> {
        let modes: Vec<&str> = self.modes.iter().map(|m| m.as_str()).collect();

        let mut pairs = vec![
            ("fromPlace", self.from.to_query_string()),
            ("toPlace", self.to.to_query_string()),
            ("mode", modes.join(",")),
            ("numItineraries", self.num_itineraries.to_string()),
            ("arriveBy", self.arrive_by.to_string()),
        ];
        if let Some(date) = self.date {
            pairs.push(("date", date.format("%m-%d-%Y").to_string()));
        }
        if let Some(time) = self.time {
            pairs.push(("time", time.format("%H:%M").to_string()));
        }
        pairs
    }

    /// The same query `minutes` later (or earlier, if negative), as a
    /// departure search. The time wraps within the day; the date is kept.
    pub fn shifted(&self, minutes: i64) -> Self {
        let mut next = self.clone();
        next.arrive_by = false;
        next.time = self
            .time
            .map(|t| t.overflowing_add_signed(Duration::minutes(minutes)).0);
        next
    }

    pub fn earlier(&self) -> Self {
        self.shifted(-SHIFT_MINUTES)
    }

    pub fn later(&self) -> Self {
        self.shifted(SHIFT_MINUTES)
    }

    /// Canonical string form, used as the routing cache key.
    pub fn cache_key(&self) -> String {
        self.query_pairs()
            .into_iter()
            .map(|(k, v)| format!("{k}={v}"))
            .collect::<Vec<_>>()
            .join("&")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request() -> RoutingRequest {
        RoutingRequest::new(
            LatLon::new(51.3397, 12.3731).unwrap(),
            LatLon::new(51.3455, 12.3821).unwrap(),
        )
    }

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, 5).unwrap()
    }

    fn time(h: u32, m: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, m, 0).unwrap()
    }

    #[test]
    fn query_pairs_full() {
        let request = request()
            .with_modes([Mode::Tram, Mode::Walk])
            .arriving_by(date(), time(8, 5));
        let pairs = request.query_pairs();

        assert_eq!(
            pairs,
            vec![
                ("fromPlace", "51.3397,12.3731".to_string()),
                ("toPlace", "51.3455,12.3821".to_string()),
                ("mode", "TRAM,WALK".to_string()),
                ("numItineraries", "5".to_string()),
                ("arriveBy", "true".to_string()),
                ("date", "03-05-2024".to_string()),
                ("time", "08:05".to_string()),
            ]
        );
    }

    #[test]
    fn date_and_time_omitted_when_unset() {
        let keys: Vec<&str> = request().query_pairs().into_iter().map(|(k, _)| k).collect();
        assert!(!keys.contains(&"date"));
        assert!(!keys.contains(&"time"));
    }

    #[test]
    fn shift_forces_departure_and_wraps() {
        let request = request().arriving_by(date(), time(23, 58));
        let later = request.later();
        assert!(!later.arrive_by);
        assert_eq!(later.time, Some(time(0, 3)));
        assert_eq!(later.date, Some(date()));

        let earlier = request.earlier();
        assert_eq!(earlier.time, Some(time(23, 53)));
    }

    #[test]
    fn shift_without_time_keeps_none() {
        assert_eq!(request().later().time, None);
    }

    #[test]
    fn cache_key_distinguishes_requests() {
        let a = request();
        let b = request().with_num_itineraries(3);
        assert_eq!(a.cache_key(), request().cache_key());
        assert_ne!(a.cache_key(), b.cache_key());
    }
}
