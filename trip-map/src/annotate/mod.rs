//! Presentation annotations for itineraries.
//!
//! - [`classify`]: what each leg really is (ride, walk, transfer wait, wait)
//! - [`deviation`]: scheduled-vs-actual minute differences
//! - [`timeline`]: both combined once per rendered itinerary

mod classify;
mod deviation;
mod timeline;

pub use classify::{
    Classifier, DEFAULT_TRANSFER_WALK_MAX_M, LegKind, is_pure_wait, is_transfer_wait,
};
pub use deviation::{
    Deviation, DeviationSign, StopEstimate, arrival_deviation, departure_deviation, deviation,
    intermediate_stop_estimates, scheduled_from_delay, wait_between,
};
pub use timeline::{DEFAULT_MIN_WAIT_GAP_MILLIS, ItineraryTimeline, LegLabel, TimelineEntry};
