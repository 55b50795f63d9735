//! Stop-monitor HTTP client.

use std::time::Duration;

use tracing::debug;

use super::StopService;
use super::error::StopError;
use super::types::{StopRecord, StopsResponse};

/// Default base URL of the stop-monitor service.
pub const DEFAULT_STOPS_BASE_URL: &str = "http://localhost:8081/api";

/// Configuration for the stop-monitor client.
#[derive(Debug, Clone)]
pub struct StopClientConfig {
    /// Base URL; `/stops` is appended.
    pub base_url: String,
    /// Request timeout in seconds
    pub timeout_secs: u64,
}

impl Default for StopClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_STOPS_BASE_URL.to_string(),
            timeout_secs: 30,
        }
    }
}

impl StopClientConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Self::default()
        }
    }

    /// Set request timeout.
    pub fn with_timeout(mut self, secs: u64) -> Self {
        self.timeout_secs = secs;
        self
    }
}

/// Client for the stop-monitor service.
#[derive(Debug, Clone)]
pub struct StopClient {
    http: reqwest::Client,
    base_url: String,
}

impl StopClient {
    pub fn new(config: StopClientConfig) -> Result<Self, StopError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn stops_url(&self) -> String {
        format!("{}/stops", self.base_url)
    }

    /// Fetch the stops inside `bbox` (`"swLat,swLon,neLat,neLon"`).
    pub async fn fetch_stops(&self, bbox: &str) -> Result<Vec<StopRecord>, StopError> {
        let response = self
            .http
            .get(self.stops_url())
            .query(&[("bbox", bbox)])
            .send()
            .await?;
        let status = response.status();

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(StopError::Api {
                status: status.as_u16(),
                message: body,
            });
        }

        let body = response.text().await?;
        let stops = parse_stops(&body)?;
        debug!(bbox, count = stops.len(), "stops received");
        Ok(stops)
    }
}

impl StopService for StopClient {
    async fn stops(&self, bbox: &str) -> Result<Vec<StopRecord>, StopError> {
        self.fetch_stops(bbox).await
    }
}

/// Parse a stop-monitor response body.
pub fn parse_stops(body: &str) -> Result<Vec<StopRecord>, StopError> {
    let response: StopsResponse = serde_json::from_str(body).map_err(|e| StopError::Json {
        message: e.to_string(),
    })?;
    Ok(response.into_stops())
}
