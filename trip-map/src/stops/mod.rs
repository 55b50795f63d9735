//! Stop-monitor adapter.
//!
//! Fetches the stops inside the viewport's query box and projects them to
//! point features for the `stops-source`.

mod client;
mod error;
mod mock;
mod types;

use std::future::Future;

pub use client::{DEFAULT_STOPS_BASE_URL, StopClient, StopClientConfig, parse_stops};
pub use error::StopError;
pub use mock::{MOCK_STOPS_FILE, MockStopClient};
pub use types::{StopRecord, StopsResponse, stops_to_feature_collection};

/// Anything that can list the stops inside a bounding box.
pub trait StopService {
    /// `bbox` is `"swLat,swLon,neLat,neLon"`.
    fn stops(&self, bbox: &str) -> impl Future<Output = Result<Vec<StopRecord>, StopError>> + Send;
}
