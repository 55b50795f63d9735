//! Domain types for the trip map.
//!
//! This module contains the normalized itinerary model that every other
//! component consumes. Types enforce their invariants at construction
//! time, so code that receives them can trust their validity.

mod bounds;
mod error;
mod itinerary;
mod leg;
mod location;
mod meta;
mod mode;
mod time;

pub use bounds::BoundingBox;
pub use error::DomainError;
pub use itinerary::{FlaggedItinerary, Itinerary, ItineraryIssue, ItineraryStats, Plan};
pub use leg::Leg;
pub use location::{LatLon, Location, UNKNOWN_LOCATION_NAME};
pub use meta::{Alert, ZoneInfo};
pub use mode::Mode;
pub use time::{MILLIS_PER_MINUTE, Timestamp, format_duration, format_duration_rounded};
