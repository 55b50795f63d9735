//! Stop service that serves a recorded stop list.

use std::path::Path;
use std::sync::Arc;

use tracing::trace;

use crate::domain::{BoundingBox, LatLon};

use super::StopService;
use super::client::parse_stops;
use super::error::StopError;
use super::types::StopRecord;

/// File name looked up by [`MockStopClient::from_dir`].
pub const MOCK_STOPS_FILE: &str = "stops.json";

/// Answers each request with the recorded stops that fall inside the box.
#[derive(Debug, Clone)]
pub struct MockStopClient {
    stops: Arc<Vec<StopRecord>>,
}

impl MockStopClient {
    pub fn new(stops: Vec<StopRecord>) -> Self {
        Self {
            stops: Arc::new(stops),
        }
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, StopError> {
        let path = path.as_ref();
        let body = std::fs::read_to_string(path).map_err(|e| StopError::Mock {
            message: format!("failed to read {path:?}: {e}"),
        })?;
        Ok(Self::new(parse_stops(&body)?))
    }

    /// Load `stops.json` from `dir`.
    pub fn from_dir(dir: impl AsRef<Path>) -> Result<Self, StopError> {
        Self::from_file(dir.as_ref().join(MOCK_STOPS_FILE))
    }
}

impl StopService for MockStopClient {
    async fn stops(&self, bbox: &str) -> Result<Vec<StopRecord>, StopError> {
        let bounds: BoundingBox = bbox.parse().map_err(|e| StopError::Api {
            status: 400,
            message: format!("bad bbox {bbox:?}: {e}"),
        })?;
        let inside: Vec<StopRecord> = self
            .stops
            .iter()
            .filter(|stop| {
                LatLon::new(stop.lat, stop.lon).is_ok_and(|p| bounds.contains_point(p))
            })
            .cloned()
            .collect();
        trace!(bbox, count = inside.len(), "mock stops served");
        Ok(inside)
    }
}
