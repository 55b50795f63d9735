//! Schedule deviation annotations.
//!
//! The routing service reports actual (realtime) times plus a delay in
//! seconds. The scheduled time is recovered as `actual - delay`, and the
//! difference is shown in whole minutes next to the time.

use std::fmt;

use crate::domain::{Leg, Location, MILLIS_PER_MINUTE, Timestamp};

/// Direction of a deviation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeviationSign {
    Late,
    Early,
    /// Within half a minute of schedule; nothing is shown.
    None,
}

/// Difference between scheduled and actual time, in whole minutes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Deviation {
    /// Signed minutes; positive is late.
    pub minutes: i64,
    pub sign: DeviationSign,
}

impl Deviation {
    pub const NONE: Deviation = Deviation {
        minutes: 0,
        sign: DeviationSign::None,
    };

    fn from_minutes(minutes: i64) -> Self {
        let sign = match minutes {
            0 => DeviationSign::None,
            m if m > 0 => DeviationSign::Late,
            _ => DeviationSign::Early,
        };
        Self { minutes, sign }
    }

    pub fn is_none(&self) -> bool {
        self.sign == DeviationSign::None
    }

    /// Short label: `"+3m"`, `"-2m"`, or empty when on time.
    pub fn label(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for Deviation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.sign {
            DeviationSign::None => Ok(()),
            DeviationSign::Late => write!(f, "+{}m", self.minutes),
            DeviationSign::Early => write!(f, "{}m", self.minutes),
        }
    }
}

/// Deviation of `actual` from `scheduled`.
///
/// The minute difference rounds half up, so +90 s is 2 minutes late and
/// -90 s is 1 minute early.
///
/// ```
/// use trip_map::annotate::{deviation, DeviationSign};
/// use trip_map::domain::Timestamp;
///
/// let d = deviation(Timestamp::from_millis(1_000), Timestamp::from_millis(181_000));
/// assert_eq!(d.minutes, 3);
/// assert_eq!(d.sign, DeviationSign::Late);
/// assert_eq!(d.label(), "+3m");
/// ```
pub fn deviation(scheduled: Timestamp, actual: Timestamp) -> Deviation {
    Deviation::from_minutes(round_millis_to_minutes(actual.millis_since(scheduled)))
}

/// Scheduled time for an actual time reported with a delay in seconds.
pub fn scheduled_from_delay(actual: Timestamp, delay_secs: i64) -> Timestamp {
    actual.offset_millis(delay_secs.saturating_mul(1000).saturating_neg())
}

/// Deviation of the leg's departure.
pub fn departure_deviation(leg: &Leg) -> Deviation {
    let actual = leg.start_time();
    deviation(scheduled_from_delay(actual, leg.departure_delay()), actual)
}

/// Deviation of the leg's arrival.
pub fn arrival_deviation(leg: &Leg) -> Deviation {
    let actual = leg.end_time();
    deviation(scheduled_from_delay(actual, leg.arrival_delay()), actual)
}

fn round_millis_to_minutes(millis: i64) -> i64 {
    millis
        .saturating_add(MILLIS_PER_MINUTE / 2)
        .div_euclid(MILLIS_PER_MINUTE)
}

/// Estimated passing time at an intermediate stop.
#[derive(Debug, Clone, PartialEq)]
pub struct StopEstimate<'a> {
    pub stop: &'a Location,
    /// Interpolated actual time.
    pub estimated: Timestamp,
    /// Interpolated scheduled time.
    pub scheduled: Timestamp,
    pub deviation: Deviation,
}

/// Estimated times at each intermediate stop of `leg`.
///
/// These are approximations, not observations. The backend reports no
/// per-stop times, so stop `i` of `n` is placed at fraction `(i + 1) / n`
/// of the leg, and its delay is blended linearly between the departure
/// and arrival delays at the same fraction. The last stop therefore lands
/// on the leg's arrival.
pub fn intermediate_stop_estimates(leg: &Leg) -> Vec<StopEstimate<'_>> {
    let Some(stops) = leg.intermediate_stops() else {
        return Vec::new();
    };

    let total = stops.len().max(1) as f64;
    let start = leg.start_time().as_millis() as f64;
    let duration = leg.elapsed_millis() as f64;
    let departure_delay = leg.departure_delay() as f64 * 1000.0;
    let arrival_delay = leg.arrival_delay() as f64 * 1000.0;

    stops
        .iter()
        .enumerate()
        .map(|(i, stop)| {
            let ratio = (i + 1) as f64 / total;
            let estimated = (start + duration * ratio).round() as i64;
            let delay =
                (departure_delay + (arrival_delay - departure_delay) * ratio).round() as i64;

            let estimated = Timestamp::from_millis(estimated);
            let scheduled = estimated.offset_millis(-delay);
            StopEstimate {
                stop,
                estimated,
                scheduled,
                deviation: deviation(scheduled, estimated),
            }
        })
        .collect()
}

/// Gap between two consecutive legs, in milliseconds, when it exceeds
/// `min_gap_millis`.
pub fn wait_between(current: &Leg, next: &Leg, min_gap_millis: i64) -> Option<i64> {
    let gap = next.start_time().millis_since(current.end_time());
    (gap > min_gap_millis).then_some(gap)
}
