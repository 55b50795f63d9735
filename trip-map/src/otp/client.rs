//! Routing service HTTP client.

use std::time::Duration;

use tracing::debug;

use crate::domain::Plan;

use super::RoutingService;
use super::convert::{ConversionError, convert_response};
use super::error::OtpError;
use super::request::RoutingRequest;
use super::types::OtpResponse;

/// Default base URL of the routing service.
pub const DEFAULT_BASE_URL: &str = "http://localhost:8080/otp/routers/default";

/// Configuration for the routing client.
#[derive(Debug, Clone)]
pub struct RoutingConfig {
    /// Base URL; `/plan` is appended.
    pub base_url: String,
    /// Request timeout in seconds
    pub timeout_secs: u64,
}

impl Default for RoutingConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout_secs: 30,
        }
    }
}

impl RoutingConfig {
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

/// Routing service client.
#[derive(Debug, Clone)]
pub struct RoutingClient {
    http: reqwest::Client,
    base_url: String,
}

impl RoutingClient {
    pub fn new(config: RoutingConfig) -> Result<Self, OtpError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn plan_url(&self) -> String {
        format!("{}/plan", self.base_url)
    }

    /// Fetch and convert a plan.
    pub async fn fetch_plan(&self, request: &RoutingRequest) -> Result<Plan, OtpError> {
        let response = self
            .http
            .get(self.plan_url())
            .query(&request.query_pairs())
            .send()
            .await?;

        let status = response.status();

        if status == reqwest::StatusCode::UNAUTHORIZED {
            return Err(OtpError::Unauthorized);
        }

        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            return Err(OtpError::RateLimited);
        }

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(OtpError::Api {
                status: status.as_u16(),
                message: body,
            });
        }

        let body = response.text().await?;
        debug!(bytes = body.len(), "routing response received");
        parse_plan(&body)
    }
}

impl RoutingService for RoutingClient {
    async fn plan(&self, request: &RoutingRequest) -> Result<Plan, OtpError> {
        self.fetch_plan(request).await
    }
}

/// Parse and convert a `/plan` response body.
pub fn parse_plan(body: &str) -> Result<Plan, OtpError> {
    let response: OtpResponse = serde_json::from_str(body).map_err(|e| OtpError::Json {
        message: e.to_string(),
        body: Some(body.chars().take(500).collect()),
    })?;

    convert_response(&response).map_err(|e| match e {
        ConversionError::NoPlan(message) => OtpError::NoPlan(message),
        other => OtpError::Json {
            message: other.to_string(),
            body: None,
        },
    })
}
