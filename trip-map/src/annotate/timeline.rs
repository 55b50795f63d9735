//! Per-render itinerary timeline.
//!
//! Classification runs once per leg when the timeline is built, and every
//! label and aggregate reads from that single result.

use std::fmt;

use crate::domain::{Itinerary, Leg, Mode, format_duration_rounded};

use super::classify::{Classifier, LegKind};
use super::deviation::{
    Deviation, StopEstimate, arrival_deviation, departure_deviation, intermediate_stop_estimates,
    wait_between,
};

/// Default minimum gap between legs that is shown as a wait.
pub const DEFAULT_MIN_WAIT_GAP_MILLIS: i64 = 60_000;

/// What a timeline entry says about its leg.
///
/// Walk and wait durations display rounded to the nearest minute.
#[derive(Debug, Clone, PartialEq)]
pub enum LegLabel {
    Ride { mode: Mode, route: Option<String> },
    Walk { duration_secs: i64 },
    Wait { duration_secs: i64 },
}

impl fmt::Display for LegLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LegLabel::Ride {
                mode,
                route: Some(route),
            } => write!(f, "{} {}", mode.display_name(), route),
            LegLabel::Ride { mode, route: None } => write!(f, "{}", mode.display_name()),
            LegLabel::Walk { duration_secs } => {
                write!(f, "Walk ({})", format_duration_rounded(*duration_secs))
            }
            LegLabel::Wait { duration_secs } => {
                write!(f, "Wait ({})", format_duration_rounded(*duration_secs))
            }
        }
    }
}

/// One leg with its classification and annotations.
#[derive(Debug, Clone)]
pub struct TimelineEntry<'a> {
    pub index: usize,
    pub leg: &'a Leg,
    pub kind: LegKind,
    pub label: LegLabel,
    pub departure: Deviation,
    pub arrival: Deviation,
    /// Gap before the next leg, in milliseconds, when long enough to show.
    /// Never set after a transfer wait, which already represents the wait.
    pub wait_after: Option<i64>,
}

impl TimelineEntry<'_> {
    /// Estimated times at the leg's intermediate stops, computed on demand.
    pub fn stop_estimates(&self) -> Vec<StopEstimate<'_>> {
        intermediate_stop_estimates(self.leg)
    }
}

/// Annotated legs of one itinerary.
///
/// ```
/// use trip_map::annotate::{Classifier, ItineraryTimeline, LegKind};
/// use trip_map::domain::{Itinerary, Leg, Location, Mode, Timestamp};
///
/// let a = Location::from_coords("Markt", 51.3397, 12.3731).unwrap();
/// let b = Location::from_coords("Zoo", 51.3485, 12.3710).unwrap();
/// let leg = Leg::new(Mode::Tram, a, b, Timestamp::from_millis(0), Timestamp::from_millis(600_000))
///     .unwrap()
///     .with_route("12");
/// let itinerary = Itinerary::from_legs(vec![leg]).unwrap();
///
/// let timeline = ItineraryTimeline::build(&itinerary, &Classifier::default());
/// assert_eq!(timeline.entries()[0].kind, LegKind::TransitRide);
/// assert_eq!(timeline.entries()[0].label.to_string(), "TRAM 12");
/// ```
#[derive(Debug, Clone)]
pub struct ItineraryTimeline<'a> {
    itinerary: &'a Itinerary,
    entries: Vec<TimelineEntry<'a>>,
}

impl<'a> ItineraryTimeline<'a> {
    /// Build with the default minimum wait gap.
    pub fn build(itinerary: &'a Itinerary, classifier: &Classifier) -> Self {
        Self::build_with_gap(itinerary, classifier, DEFAULT_MIN_WAIT_GAP_MILLIS)
    }

    pub fn build_with_gap(
        itinerary: &'a Itinerary,
        classifier: &Classifier,
        min_wait_gap_millis: i64,
    ) -> Self {
        let legs = itinerary.legs();
        let kinds = classifier.classify_all(legs);

        let entries = legs
            .iter()
            .zip(kinds)
            .enumerate()
            .map(|(index, (leg, kind))| {
                let wait_after = if kind == LegKind::TransferWait {
                    None
                } else {
                    legs.get(index + 1)
                        .and_then(|next| wait_between(leg, next, min_wait_gap_millis))
                };

                TimelineEntry {
                    index,
                    leg,
                    kind,
                    label: label_for(leg, kind),
                    departure: departure_deviation(leg),
                    arrival: arrival_deviation(leg),
                    wait_after,
                }
            })
            .collect();

        Self { itinerary, entries }
    }

    pub fn itinerary(&self) -> &'a Itinerary {
        self.itinerary
    }

    pub fn entries(&self) -> &[TimelineEntry<'a>] {
        &self.entries
    }

    pub fn kinds(&self) -> impl Iterator<Item = LegKind> + '_ {
        self.entries.iter().map(|e| e.kind)
    }

    /// Total shown waiting time in seconds: wait legs plus inter-leg gaps.
    pub fn total_wait_secs(&self) -> i64 {
        self.entries
            .iter()
            .map(|e| {
                let own = match e.label {
                    LegLabel::Wait { duration_secs } => duration_secs,
                    _ => 0,
                };
                own + e.wait_after.map_or(0, |ms| ms / 1000)
            })
            .sum()
    }

    /// Total genuine walking time in seconds.
    pub fn total_walk_secs(&self) -> i64 {
        self.entries
            .iter()
            .filter_map(|e| match e.label {
                LegLabel::Walk { duration_secs } => Some(duration_secs),
                _ => None,
            })
            .sum()
    }
}

fn label_for(leg: &Leg, kind: LegKind) -> LegLabel {
    let duration_secs = leg.duration_secs().round() as i64;
    match kind {
        LegKind::TransferWait | LegKind::PureWait => LegLabel::Wait { duration_secs },
        LegKind::Walk => LegLabel::Walk { duration_secs },
        LegKind::TransitRide => LegLabel::Ride {
            mode: leg.mode(),
            route: leg.route().map(str::to_owned),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Location, Timestamp};

    fn leg(mode: Mode, from: &str, to: &str, start_s: i64, end_s: i64) -> Leg {
        Leg::new(
            mode,
            Location::from_coords(from, 51.34, 12.37).unwrap(),
            Location::from_coords(to, 51.35, 12.38).unwrap(),
            Timestamp::from_millis(start_s * 1000),
            Timestamp::from_millis(end_s * 1000),
        )
        .unwrap()
    }

    /// WALK(300s), TRAM(600s), WALK(90s, 50m), TRAM(600s), WALK(120s)
    fn scenario() -> Itinerary {
        Itinerary::from_legs(vec![
            leg(Mode::Walk, "Home", "Augustusplatz", 0, 300).with_distance(350.0),
            leg(Mode::Tram, "Augustusplatz", "Markt", 300, 900).with_route("4"),
            leg(Mode::Walk, "Markt", "Markt", 900, 990).with_distance(50.0),
            leg(Mode::Tram, "Markt", "Connewitz", 990, 1590).with_route("11"),
            leg(Mode::Walk, "Connewitz", "Office", 1590, 1710).with_distance(150.0),
        ])
        .unwrap()
    }

    #[test]
    fn transfer_walk_renders_as_wait() {
        let itinerary = scenario();
        let timeline = ItineraryTimeline::build(&itinerary, &Classifier::default());
        let middle = &timeline.entries()[2];

        assert_eq!(middle.kind, LegKind::TransferWait);
        assert_eq!(middle.label, LegLabel::Wait { duration_secs: 90 });
        assert_eq!(middle.label.to_string(), "Wait (2min)");
        assert_eq!(timeline.total_wait_secs(), 90);
    }

    #[test]
    fn labels_follow_kinds() {
        let itinerary = scenario();
        let timeline = ItineraryTimeline::build(&itinerary, &Classifier::default());
        let labels: Vec<String> = timeline
            .entries()
            .iter()
            .map(|e| e.label.to_string())
            .collect();
        assert_eq!(
            labels,
            vec!["Walk (5min)", "TRAM 4", "Wait (2min)", "TRAM 11", "Walk (2min)"]
        );
        assert_eq!(timeline.total_walk_secs(), 420);
    }

    #[test]
    fn gaps_are_shown_except_after_transfer_wait() {
        let itinerary = Itinerary::from_legs(vec![
            leg(Mode::Walk, "Home", "Markt", 0, 300),
            leg(Mode::Tram, "Markt", "Zoo", 600, 900),
            leg(Mode::Walk, "Zoo", "Zoo", 900, 960).with_distance(10.0),
            leg(Mode::Bus, "Zoo", "Office", 1200, 1500),
        ])
        .unwrap();
        let timeline = ItineraryTimeline::build(&itinerary, &Classifier::default());
        let gaps: Vec<Option<i64>> = timeline.entries().iter().map(|e| e.wait_after).collect();

        assert_eq!(gaps, vec![Some(300_000), None, None, None]);
        // 300 s gap before the tram, 60 s transfer wait
        assert_eq!(timeline.total_wait_secs(), 360);
    }

    #[test]
    fn durations_round_to_nearest_minute() {
        assert_eq!(LegLabel::Wait { duration_secs: 90 }.to_string(), "Wait (2min)");
        assert_eq!(LegLabel::Wait { duration_secs: 89 }.to_string(), "Wait (1min)");
        assert_eq!(LegLabel::Walk { duration_secs: 150 }.to_string(), "Walk (3min)");
    }

    #[test]
    fn sub_minute_gap_is_suppressed() {
        let itinerary = Itinerary::from_legs(vec![
            leg(Mode::Tram, "A", "B", 0, 300),
            leg(Mode::Bus, "B", "C", 360, 600),
        ])
        .unwrap();
        let timeline = ItineraryTimeline::build(&itinerary, &Classifier::default());
        assert_eq!(timeline.entries()[0].wait_after, None);
    }

    #[test]
    fn deviations_are_attached() {
        let itinerary = Itinerary::from_legs(vec![
            leg(Mode::Tram, "A", "B", 0, 600).with_delays(180, 0),
        ])
        .unwrap();
        let timeline = ItineraryTimeline::build(&itinerary, &Classifier::default());
        assert_eq!(timeline.entries()[0].departure.label(), "+3m");
        assert!(timeline.entries()[0].arrival.is_none());
    }

    #[test]
    fn ride_without_route_uses_display_name() {
        let label = LegLabel::Ride {
            mode: Mode::Suburb,
            route: None,
        };
        assert_eq!(label.to_string(), "S-BAHN");
    }
}
