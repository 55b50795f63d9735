//! Fare-zone and service-alert metadata attached to itineraries and legs.

use super::Timestamp;

/// Fare zones an itinerary passes through.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ZoneInfo {
    /// Zones touched, in the order the backend reports them.
    pub zones: Vec<String>,
    /// Zones in travel order.
    pub ordered_zones: Vec<String>,
    /// Whether a short-distance ticket covers the trip.
    pub short_distance_ticket: bool,
}

/// A service alert affecting a leg.
#[derive(Debug, Clone, PartialEq)]
pub struct Alert {
    pub effective_start: Timestamp,
    pub effective_end: Timestamp,
    pub description: String,
    pub category: i64,
    pub url: Option<String>,
    pub header: Option<String>,
}

impl Alert {
    /// Returns true if the alert is in effect at `at`.
    pub fn is_active_at(&self, at: Timestamp) -> bool {
        self.effective_start <= at && at <= self.effective_end
    }
}
