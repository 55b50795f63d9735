//! Mock routing client for use without a routing service.
//!
//! Serves a plan loaded from a recorded `/plan` JSON response.

use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use crate::domain::Plan;

use super::RoutingService;
use super::client::parse_plan;
use super::error::OtpError;
use super::request::RoutingRequest;

/// File name looked up by [`MockRoutingClient::from_dir`].
pub const MOCK_PLAN_FILE: &str = "plan.json";

/// Routing client that answers every request with the same recorded plan.
#[derive(Debug, Clone)]
pub struct MockRoutingClient {
    plan: Arc<Plan>,
    calls: Arc<AtomicUsize>,
}

impl MockRoutingClient {
    pub fn new(plan: Plan) -> Self {
        Self {
            plan: Arc::new(plan),
            calls: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Load a recorded `/plan` response.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, OtpError> {
        let path = path.as_ref();
        let body = std::fs::read_to_string(path)
            .map_err(|e| OtpError::Mock(format!("failed to read {path:?}: {e}")))?;
        let plan = parse_plan(&body)?;
        Ok(Self::new(plan))
    }

    /// Load `plan.json` from `dir`.
    pub fn from_dir(dir: impl AsRef<Path>) -> Result<Self, OtpError> {
        Self::from_file(dir.as_ref().join(MOCK_PLAN_FILE))
    }

    /// Number of requests served.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::Relaxed)
    }
}

impl RoutingService for MockRoutingClient {
    async fn plan(&self, _request: &RoutingRequest) -> Result<Plan, OtpError> {
        self.calls.fetch_add(1, Ordering::Relaxed);
        Ok(Plan::clone(&self.plan))
    }
}
