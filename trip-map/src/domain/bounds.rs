//! Axis-aligned bounding boxes.
//!
//! A `BoundingBox` serves both as the live map viewport and as the cached
//! stop query region. Boxes do not wrap the antimeridian.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::{DomainError, LatLon};

/// A latitude/longitude rectangle.
///
/// # Invariants
///
/// - `south_west.lat <= north_east.lat`
/// - `south_west.lon <= north_east.lon`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BoundingBox {
    south_west: LatLon,
    north_east: LatLon,
}

impl BoundingBox {
    /// Creates a box from its corners.
    ///
    /// # Examples
    ///
    /// ```
    /// use trip_map::domain::{BoundingBox, LatLon};
    ///
    /// let sw = LatLon::new(51.33, 12.36).unwrap();
    /// let ne = LatLon::new(51.35, 12.39).unwrap();
    /// let view = BoundingBox::new(sw, ne).unwrap();
    /// assert_eq!(view.to_query_string(), "51.33,12.36,51.35,12.39");
    ///
    /// assert!(BoundingBox::new(ne, sw).is_err());
    /// ```
    pub fn new(south_west: LatLon, north_east: LatLon) -> Result<Self, DomainError> {
        if south_west.lat > north_east.lat || south_west.lon > north_east.lon {
            return Err(DomainError::InvalidBounds);
        }
        Ok(Self {
            south_west,
            north_east,
        })
    }

    /// Creates a box from `(south, west, north, east)` degrees.
    pub fn from_degrees(south: f64, west: f64, north: f64, east: f64) -> Result<Self, DomainError> {
        Self::new(LatLon::new(south, west)?, LatLon::new(north, east)?)
    }

    pub fn south_west(&self) -> LatLon {
        self.south_west
    }

    pub fn north_east(&self) -> LatLon {
        self.north_east
    }

    /// Height in degrees of latitude.
    pub fn lat_span(&self) -> f64 {
        self.north_east.lat - self.south_west.lat
    }

    /// Width in degrees of longitude.
    pub fn lon_span(&self) -> f64 {
        self.north_east.lon - self.south_west.lon
    }

    pub fn center(&self) -> LatLon {
        LatLon {
            lat: (self.south_west.lat + self.north_east.lat) / 2.0,
            lon: (self.south_west.lon + self.north_east.lon) / 2.0,
        }
    }

    /// Returns true if the point lies inside or on the edge of this box.
    pub fn contains_point(&self, point: LatLon) -> bool {
        point.lat >= self.south_west.lat
            && point.lat <= self.north_east.lat
            && point.lon >= self.south_west.lon
            && point.lon <= self.north_east.lon
    }

    /// Returns true if both corners of `other` lie inside this box.
    pub fn contains(&self, other: &BoundingBox) -> bool {
        self.contains_point(other.south_west) && self.contains_point(other.north_east)
    }

    /// Returns a box with the same center and each span multiplied by `factor`.
    ///
    /// Latitudes are clamped to the poles.
    pub fn scaled(&self, factor: f64) -> BoundingBox {
        let center = self.center();
        let half_lat = self.lat_span() * factor / 2.0;
        let half_lon = self.lon_span() * factor / 2.0;
        BoundingBox {
            south_west: LatLon {
                lat: (center.lat - half_lat).max(-90.0),
                lon: center.lon - half_lon,
            },
            north_east: LatLon {
                lat: (center.lat + half_lat).min(90.0),
                lon: center.lon + half_lon,
            },
        }
    }

    /// The smallest box containing both `self` and `other`.
    pub fn union(&self, other: &BoundingBox) -> BoundingBox {
        BoundingBox {
            south_west: LatLon {
                lat: self.south_west.lat.min(other.south_west.lat),
                lon: self.south_west.lon.min(other.south_west.lon),
            },
            north_east: LatLon {
                lat: self.north_east.lat.max(other.north_east.lat),
                lon: self.north_east.lon.max(other.north_east.lon),
            },
        }
    }

    /// Serializes as `"swLat,swLon,neLat,neLon"`, the stop-monitor `bbox` format.
    pub fn to_query_string(&self) -> String {
        format!(
            "{},{},{},{}",
            self.south_west.lat, self.south_west.lon, self.north_east.lat, self.north_east.lon
        )
    }
}

impl fmt::Display for BoundingBox {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_query_string())
    }
}

impl FromStr for BoundingBox {
    type Err = DomainError;

    /// Parses `"swLat,swLon,neLat,neLon"`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parts: Vec<f64> = s
            .split(',')
            .map(|p| p.trim().parse::<f64>())
            .collect::<Result<_, _>>()
            .map_err(|_| DomainError::InvalidBoundsString(s.to_string()))?;
        match parts.as_slice() {
            [south, west, north, east] => BoundingBox::from_degrees(*south, *west, *north, *east),
            _ => Err(DomainError::InvalidBoundsString(s.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bbox(s: f64, w: f64, n: f64, e: f64) -> BoundingBox {
        BoundingBox::from_degrees(s, w, n, e).unwrap()
    }

    #[test]
    fn rejects_inverted_corners() {
        assert_eq!(
            BoundingBox::from_degrees(51.4, 12.3, 51.3, 12.4),
            Err(DomainError::InvalidBounds)
        );
        assert_eq!(
            BoundingBox::from_degrees(51.3, 12.4, 51.4, 12.3),
            Err(DomainError::InvalidBounds)
        );
    }

    #[test]
    fn spans_and_center() {
        let b = bbox(50.0, 10.0, 52.0, 14.0);
        assert_eq!(b.lat_span(), 2.0);
        assert_eq!(b.lon_span(), 4.0);
        assert_eq!(b.center(), LatLon { lat: 51.0, lon: 12.0 });
    }

    #[test]
    fn containment() {
        let outer = bbox(50.0, 10.0, 52.0, 14.0);
        let inner = bbox(50.5, 11.0, 51.5, 13.0);
        let overlapping = bbox(51.5, 13.0, 52.5, 15.0);

        assert!(outer.contains(&inner));
        assert!(outer.contains(&outer));
        assert!(!inner.contains(&outer));
        assert!(!outer.contains(&overlapping));
        assert!(outer.contains_point(LatLon { lat: 52.0, lon: 14.0 }));
    }

    #[test]
    fn scaling_keeps_center() {
        let b = bbox(50.0, 10.0, 52.0, 14.0);
        let s = b.scaled(1.5);
        assert_eq!(s.center(), b.center());
        assert_eq!(s.lat_span(), 3.0);
        assert_eq!(s.lon_span(), 6.0);
        assert!(s.contains(&b));
    }

    #[test]
    fn scaling_clamps_latitude() {
        let b = bbox(80.0, 0.0, 89.0, 10.0);
        let s = b.scaled(3.0);
        assert_eq!(s.north_east().lat, 90.0);
    }

    #[test]
    fn union_covers_both() {
        let a = bbox(50.0, 10.0, 51.0, 11.0);
        let b = bbox(50.5, 10.5, 52.0, 12.0);
        let u = a.union(&b);
        assert!(u.contains(&a));
        assert!(u.contains(&b));
        assert_eq!(u, bbox(50.0, 10.0, 52.0, 12.0));
    }

    #[test]
    fn query_string_round_trip() {
        let b = bbox(51.33, 12.36, 51.35, 12.39);
        assert_eq!(b.to_query_string(), "51.33,12.36,51.35,12.39");
        assert_eq!(b.to_query_string().parse::<BoundingBox>().unwrap(), b);
    }

    #[test]
    fn parse_rejects_garbage() {
        assert!("1,2,3".parse::<BoundingBox>().is_err());
        assert!("a,b,c,d".parse::<BoundingBox>().is_err());
        assert!("1,2,3,4,5".parse::<BoundingBox>().is_err());
    }
}
