//! Domain error types.
//!
//! These errors represent validation failures in the domain layer. They are
//! distinct from transport errors raised by the service adapters.

/// Domain-level errors for validation and data consistency.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum DomainError {
    /// Latitude or longitude outside the WGS84 range, or not finite
    #[error("invalid coordinate: lat {lat}, lon {lon}")]
    InvalidCoordinate { lat: f64, lon: f64 },

    /// A leg or itinerary that ends before it starts
    #[error("invalid time range: end {end} is before start {start}")]
    InvalidTimeRange { start: i64, end: i64 },

    /// An itinerary must contain at least one leg
    #[error("itinerary must have at least one leg")]
    EmptyItinerary,

    /// South-west corner lies north or east of the north-east corner
    #[error("invalid bounding box: south-west corner is not below and left of north-east corner")]
    InvalidBounds,

    /// A bounding box string that is not four comma-separated numbers
    #[error("invalid bounding box string: {0}")]
    InvalidBoundsString(String),

    /// A travel mode name this client does not know
    #[error("unknown travel mode: {0}")]
    UnknownMode(String),
}
