//! Leg classification.
//!
//! Routing backends sometimes encode a transfer as a short WALK leg between
//! two transit legs instead of a WAIT leg. Those legs are relabelled as
//! transfer waits so the traveller is not told to walk somewhere.

use crate::domain::{Leg, Mode};

/// Walks shorter than this between two transit legs are transfer waits.
pub const DEFAULT_TRANSFER_WALK_MAX_M: f64 = 300.0;

/// Semantic category of a leg, as presented to the traveller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LegKind {
    /// Aboard a vehicle. Bike and car legs land here too.
    TransitRide,
    /// A genuine walk.
    Walk,
    /// A WALK leg that is really a wait at a transfer point.
    TransferWait,
    /// A leg with no spatial displacement.
    PureWait,
}

impl LegKind {
    /// Whether the leg is shown as waiting rather than moving.
    pub fn is_wait(self) -> bool {
        matches!(self, LegKind::TransferWait | LegKind::PureWait)
    }
}

/// True for WAIT legs, and for non-walk legs that start and end at the
/// same named place.
pub fn is_pure_wait(leg: &Leg) -> bool {
    leg.mode() == Mode::Wait || (leg.from().name() == leg.to().name() && leg.mode() != Mode::Walk)
}

/// [`Classifier::is_transfer_wait`] with the default distance threshold.
pub fn is_transfer_wait(leg: &Leg, index: usize, legs: &[Leg]) -> bool {
    Classifier::default().is_transfer_wait(leg, index, legs)
}

/// Stateless leg classifier with a tunable transfer-walk threshold.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Classifier {
    transfer_walk_max_m: f64,
}

impl Default for Classifier {
    fn default() -> Self {
        Self::new(DEFAULT_TRANSFER_WALK_MAX_M)
    }
}

impl Classifier {
    pub fn new(transfer_walk_max_m: f64) -> Self {
        Self {
            transfer_walk_max_m,
        }
    }

    pub fn transfer_walk_max_m(&self) -> f64 {
        self.transfer_walk_max_m
    }

    /// Whether the walk at `index` is really a wait between two transit legs.
    ///
    /// All of these must hold:
    /// - the leg is a WALK
    /// - it is neither the first nor the last leg
    /// - both neighbours are flagged as transit legs
    /// - it is shorter than the threshold, or its endpoint names overlap
    ///   the neighbouring endpoint names (substring containment either way)
    ///
    /// A walk with no reported distance is never short.
    ///
    /// The name overlap is a fuzzy rule. Nearby stops with related names,
    /// such as "Markt" and "Markt Nord", count as the same place.
    ///
    /// An `index` outside `legs` is never a transfer wait.
    pub fn is_transfer_wait(&self, leg: &Leg, index: usize, legs: &[Leg]) -> bool {
        if leg.mode() != Mode::Walk {
            return false;
        }
        if index == 0 || index + 1 >= legs.len() {
            return false;
        }

        let prev = &legs[index - 1];
        let next = &legs[index + 1];

        if !(prev.is_transit_leg() && next.is_transit_leg()) {
            return false;
        }

        let short_walk = leg
            .distance()
            .is_some_and(|meters| meters < self.transfer_walk_max_m);
        let same_place = names_overlap(leg.from().name(), prev.to().name())
            && names_overlap(leg.to().name(), next.from().name());

        short_walk || same_place
    }

    /// Classify a single leg in the context of its itinerary.
    pub fn classify(&self, leg: &Leg, index: usize, legs: &[Leg]) -> LegKind {
        if self.is_transfer_wait(leg, index, legs) {
            LegKind::TransferWait
        } else if is_pure_wait(leg) {
            LegKind::PureWait
        } else if leg.mode() == Mode::Walk {
            LegKind::Walk
        } else {
            LegKind::TransitRide
        }
    }

    /// Classify every leg once, in order.
    pub fn classify_all(&self, legs: &[Leg]) -> Vec<LegKind> {
        legs.iter()
            .enumerate()
            .map(|(i, leg)| self.classify(leg, i, legs))
            .collect()
    }
}

fn names_overlap(a: &str, b: &str) -> bool {
    a.contains(b) || b.contains(a)
}
