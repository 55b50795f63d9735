//! Geographic positions and named locations.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::DomainError;

/// Name used when the routing service sends a location we cannot read.
pub const UNKNOWN_LOCATION_NAME: &str = "Unknown location";

/// A WGS84 position.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LatLon {
    pub lat: f64,
    pub lon: f64,
}

impl LatLon {
    /// Creates a position, rejecting non-finite or out-of-range values.
    pub fn new(lat: f64, lon: f64) -> Result<Self, DomainError> {
        let valid = lat.is_finite()
            && lon.is_finite()
            && (-90.0..=90.0).contains(&lat)
            && (-180.0..=180.0).contains(&lon);
        if !valid {
            return Err(DomainError::InvalidCoordinate { lat, lon });
        }
        Ok(Self { lat, lon })
    }

    /// GeoJSON position order: longitude first.
    pub fn to_position(self) -> Vec<f64> {
        vec![self.lon, self.lat]
    }

    /// The `"lat,lon"` form used in routing requests.
    pub fn to_query_string(self) -> String {
        format!("{},{}", self.lat, self.lon)
    }
}

impl fmt::Display for LatLon {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{}", self.lat, self.lon)
    }
}

impl std::str::FromStr for LatLon {
    type Err = DomainError;

    /// Parses `"lat,lon"`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (lat, lon) = s
            .split_once(',')
            .ok_or(DomainError::InvalidCoordinate {
                lat: f64::NAN,
                lon: f64::NAN,
            })?;
        let lat: f64 = lat.trim().parse().unwrap_or(f64::NAN);
        let lon: f64 = lon.trim().parse().unwrap_or(f64::NAN);
        LatLon::new(lat, lon)
    }
}

/// A named point: a stop, a leg endpoint, or a trip origin/destination.
///
/// Immutable once constructed.
#[derive(Debug, Clone, PartialEq)]
pub struct Location {
    name: String,
    position: LatLon,
}

impl Location {
    /// Creates a location from a name and validated position.
    pub fn new(name: impl Into<String>, position: LatLon) -> Self {
        Self {
            name: name.into(),
            position,
        }
    }

    /// Creates a location from raw coordinates.
    pub fn from_coords(name: impl Into<String>, lat: f64, lon: f64) -> Result<Self, DomainError> {
        Ok(Self::new(name, LatLon::new(lat, lon)?))
    }

    /// The placeholder used when a leg endpoint is missing or malformed.
    pub fn unknown() -> Self {
        Self {
            name: UNKNOWN_LOCATION_NAME.to_string(),
            position: LatLon { lat: 0.0, lon: 0.0 },
        }
    }

    /// Returns true if this is the unknown-location placeholder.
    pub fn is_unknown(&self) -> bool {
        self.name == UNKNOWN_LOCATION_NAME
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn position(&self) -> LatLon {
        self.position
    }

    pub fn lat(&self) -> f64 {
        self.position.lat
    }

    pub fn lon(&self) -> f64 {
        self.position.lon
    }
}
