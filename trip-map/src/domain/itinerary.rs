//! Itinerary and plan types.
//!
//! An `Itinerary` is one complete candidate trip. A `Plan` is the full
//! routing answer: every candidate for one origin/destination query. Plans
//! are rebuilt from scratch on every routing response.

use super::{DomainError, Leg, Location, Mode, Timestamp, ZoneInfo};

/// Aggregate figures the routing service reports per itinerary.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ItineraryStats {
    /// Total duration in seconds.
    pub duration: f64,
    /// Seconds spent walking.
    pub walk_time: f64,
    /// Seconds spent aboard vehicles.
    pub transit_time: f64,
    /// Seconds spent waiting.
    pub waiting_time: f64,
    /// Meters walked.
    pub walk_distance: f64,
    pub transfers: u32,
}

impl ItineraryStats {
    /// Derive stats from legs when the backend did not report them.
    pub fn from_legs(legs: &[Leg]) -> Self {
        let mut stats = ItineraryStats::default();
        let mut rides = 0u32;

        for leg in legs {
            match leg.mode() {
                Mode::Walk => {
                    stats.walk_time += leg.duration_secs();
                    stats.walk_distance += leg.distance().unwrap_or(0.0);
                }
                Mode::Wait => stats.waiting_time += leg.duration_secs(),
                _ if leg.is_transit_leg() => {
                    stats.transit_time += leg.duration_secs();
                    rides += 1;
                }
                _ => {}
            }
        }

        for pair in legs.windows(2) {
            let gap = pair[1].start_time().millis_since(pair[0].end_time());
            if gap > 0 {
                stats.waiting_time += gap as f64 / 1000.0;
            }
        }

        if let (Some(first), Some(last)) = (legs.first(), legs.last()) {
            stats.duration = last.end_time().millis_since(first.start_time()) as f64 / 1000.0;
        }
        stats.transfers = rides.saturating_sub(1);
        stats
    }
}

/// A structural problem found by [`Itinerary::validate`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ItineraryIssue {
    /// `legs[0].start_time` differs from the itinerary start
    #[error("first leg starts at {leg_start}, itinerary starts at {itinerary_start}")]
    StartMismatch {
        leg_start: Timestamp,
        itinerary_start: Timestamp,
    },

    /// `legs[last].end_time` differs from the itinerary end
    #[error("last leg ends at {leg_end}, itinerary ends at {itinerary_end}")]
    EndMismatch {
        leg_end: Timestamp,
        itinerary_end: Timestamp,
    },

    /// Leg `index` ends after leg `index + 1` starts
    #[error("leg {index} overlaps the next leg by {overlap_millis}ms")]
    Overlap { index: usize, overlap_millis: i64 },
}

/// One candidate trip.
///
/// # Invariants
///
/// - At least one leg (checked at construction)
/// - `start_time <= end_time` (checked at construction)
///
/// Leg ordering is not enforced at construction, because backends do send
/// overlapping legs; [`Itinerary::validate`] reports it instead.
#[derive(Debug, Clone, PartialEq)]
pub struct Itinerary {
    start_time: Timestamp,
    end_time: Timestamp,
    legs: Vec<Leg>,
    stats: ItineraryStats,
    zone_info: Option<ZoneInfo>,
}

impl Itinerary {
    /// Construct an itinerary with explicit bounds and stats.
    pub fn new(
        start_time: Timestamp,
        end_time: Timestamp,
        legs: Vec<Leg>,
        stats: ItineraryStats,
    ) -> Result<Self, DomainError> {
        if legs.is_empty() {
            return Err(DomainError::EmptyItinerary);
        }
        if end_time < start_time {
            return Err(DomainError::InvalidTimeRange {
                start: start_time.as_millis(),
                end: end_time.as_millis(),
            });
        }
        Ok(Self {
            start_time,
            end_time,
            legs,
            stats,
            zone_info: None,
        })
    }

    /// Construct an itinerary whose bounds and stats come from its legs.
    ///
    /// # Examples
    ///
    /// ```
    /// use trip_map::domain::{Itinerary, Leg, Location, Mode, Timestamp};
    ///
    /// let a = Location::from_coords("A", 51.0, 12.0).unwrap();
    /// let b = Location::from_coords("B", 51.1, 12.1).unwrap();
    /// let leg = Leg::new(
    ///     Mode::Walk,
    ///     a,
    ///     b,
    ///     Timestamp::from_millis(0),
    ///     Timestamp::from_millis(300_000),
    /// )
    /// .unwrap();
    ///
    /// let itinerary = Itinerary::from_legs(vec![leg]).unwrap();
    /// assert_eq!(itinerary.stats().walk_time, 300.0);
    /// assert!(itinerary.validate().is_empty());
    /// ```
    pub fn from_legs(legs: Vec<Leg>) -> Result<Self, DomainError> {
        let (start, end) = match (legs.first(), legs.last()) {
            (Some(first), Some(last)) => (first.start_time(), last.end_time()),
            _ => return Err(DomainError::EmptyItinerary),
        };
        let stats = ItineraryStats::from_legs(&legs);
        Self::new(start, end, legs, stats)
    }

    pub fn with_zone_info(mut self, zone_info: ZoneInfo) -> Self {
        self.zone_info = Some(zone_info);
        self
    }

    pub fn start_time(&self) -> Timestamp {
        self.start_time
    }

    pub fn end_time(&self) -> Timestamp {
        self.end_time
    }

    /// Legs in travel order.
    pub fn legs(&self) -> &[Leg] {
        &self.legs
    }

    pub fn stats(&self) -> &ItineraryStats {
        &self.stats
    }

    pub fn zone_info(&self) -> Option<&ZoneInfo> {
        self.zone_info.as_ref()
    }

    /// Check leg alignment and ordering.
    ///
    /// Returns every issue found; an empty vector means the itinerary is
    /// safe to render.
    pub fn validate(&self) -> Vec<ItineraryIssue> {
        let mut issues = Vec::new();

        if let Some(first) = self.legs.first() {
            if first.start_time() != self.start_time {
                issues.push(ItineraryIssue::StartMismatch {
                    leg_start: first.start_time(),
                    itinerary_start: self.start_time,
                });
            }
        }
        if let Some(last) = self.legs.last() {
            if last.end_time() != self.end_time {
                issues.push(ItineraryIssue::EndMismatch {
                    leg_end: last.end_time(),
                    itinerary_end: self.end_time,
                });
            }
        }

        for (index, pair) in self.legs.windows(2).enumerate() {
            let overlap = pair[0].end_time().millis_since(pair[1].start_time());
            if overlap > 0 {
                issues.push(ItineraryIssue::Overlap {
                    index,
                    overlap_millis: overlap,
                });
            }
        }

        issues
    }
}

/// An itinerary withheld from rendering because validation failed.
#[derive(Debug, Clone, PartialEq)]
pub struct FlaggedItinerary {
    /// Position among the candidates passed to [`Plan::new`].
    pub response_index: usize,
    pub itinerary: Itinerary,
    pub issues: Vec<ItineraryIssue>,
}

/// The routing answer for one query.
#[derive(Debug, Clone, PartialEq)]
pub struct Plan {
    pub date: Option<Timestamp>,
    pub from: Location,
    pub to: Location,
    /// Itineraries that passed validation, in response order.
    pub itineraries: Vec<Itinerary>,
    /// Itineraries that failed validation.
    pub flagged: Vec<FlaggedItinerary>,
}

impl Plan {
    /// Build a plan, moving itineraries that fail validation into `flagged`.
    pub fn new(
        date: Option<Timestamp>,
        from: Location,
        to: Location,
        candidates: Vec<Itinerary>,
    ) -> Self {
        let mut itineraries = Vec::with_capacity(candidates.len());
        let mut flagged = Vec::new();

        for (response_index, itinerary) in candidates.into_iter().enumerate() {
            let issues = itinerary.validate();
            if issues.is_empty() {
                itineraries.push(itinerary);
            } else {
                flagged.push(FlaggedItinerary {
                    response_index,
                    itinerary,
                    issues,
                });
            }
        }

        Self {
            date,
            from,
            to,
            itineraries,
            flagged,
        }
    }

    /// Itineraries sorted by arrival, earliest first, at most `limit`.
    ///
    /// Each entry carries its index into `self.itineraries` so a selection
    /// maps back to the plan.
    pub fn listed(&self, limit: usize) -> Vec<(usize, &Itinerary)> {
        let mut listed: Vec<(usize, &Itinerary)> = self.itineraries.iter().enumerate().collect();
        listed.sort_by_key(|(_, it)| it.end_time());
        listed.truncate(limit);
        listed
    }
}
