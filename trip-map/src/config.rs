//! Runtime configuration.
//!
//! [`SessionConfig`] holds the tunables of one map session; [`ServiceConfig`]
//! holds the collaborator endpoints read from the environment.

use std::time::Duration;

use tracing::warn;

use crate::annotate::{DEFAULT_MIN_WAIT_GAP_MILLIS, DEFAULT_TRANSFER_WALK_MAX_M};
use crate::otp::{DEFAULT_BASE_URL, DEFAULT_NUM_ITINERARIES};
use crate::stops::DEFAULT_STOPS_BASE_URL;
use crate::viewport::DEFAULT_BUFFER_FACTOR;

/// Basemap style that needs no access token.
pub const PUBLIC_STYLE_URL: &str = "https://basemaps.cartocdn.com/gl/voyager-gl-style/style.json";

/// Per-session tunables.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionConfig {
    /// Fraction of the view span added around the stop query box.
    pub buffer_factor: f64,

    /// Upper bound on one stop fetch.
    pub fetch_timeout: Duration,

    /// Longest walk between transit legs that can count as a transfer wait.
    pub transfer_walk_max_m: f64,

    /// Gaps between legs at or below this are not shown as waits.
    pub min_wait_gap: Duration,

    /// Itineraries requested per search.
    pub num_itineraries: u32,

    /// Itineraries shown in the result list.
    pub max_listed_itineraries: usize,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            buffer_factor: DEFAULT_BUFFER_FACTOR,
            fetch_timeout: Duration::from_secs(10),
            transfer_walk_max_m: DEFAULT_TRANSFER_WALK_MAX_M,
            min_wait_gap: Duration::from_millis(DEFAULT_MIN_WAIT_GAP_MILLIS as u64),
            num_itineraries: DEFAULT_NUM_ITINERARIES,
            max_listed_itineraries: 5,
        }
    }
}

impl SessionConfig {
    pub fn with_buffer_factor(mut self, factor: f64) -> Self {
        self.buffer_factor = factor;
        self
    }

    pub fn with_fetch_timeout(mut self, timeout: Duration) -> Self {
        self.fetch_timeout = timeout;
        self
    }

    pub fn with_transfer_walk_max_m(mut self, meters: f64) -> Self {
        self.transfer_walk_max_m = meters;
        self
    }

    pub fn with_min_wait_gap(mut self, gap: Duration) -> Self {
        self.min_wait_gap = gap;
        self
    }

    pub fn with_num_itineraries(mut self, n: u32) -> Self {
        self.num_itineraries = n;
        self
    }

    pub fn with_max_listed_itineraries(mut self, n: usize) -> Self {
        self.max_listed_itineraries = n;
        self
    }

    /// Minimum wait gap in milliseconds, as the timeline expects it.
    pub fn min_wait_gap_millis(&self) -> i64 {
        i64::try_from(self.min_wait_gap.as_millis()).unwrap_or(i64::MAX)
    }
}

/// Errors reading configuration.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ConfigError {
    #[error("{name} must be a positive integer, got {value:?}")]
    InvalidNumber { name: &'static str, value: String },
}

/// Collaborator endpoints and credentials.
#[derive(Debug, Clone, PartialEq)]
pub struct ServiceConfig {
    pub otp_base_url: String,
    pub stops_base_url: String,
    pub map_access_token: Option<String>,
    pub map_style_url: Option<String>,
    pub fetch_timeout: Duration,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            otp_base_url: DEFAULT_BASE_URL.to_string(),
            stops_base_url: DEFAULT_STOPS_BASE_URL.to_string(),
            map_access_token: None,
            map_style_url: None,
            fetch_timeout: Duration::from_secs(10),
        }
    }
}

impl ServiceConfig {
    /// Read configuration from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Read configuration through `lookup`. Blank values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());
        let defaults = Self::default();

        let fetch_timeout = match get("FETCH_TIMEOUT_SECS") {
            Some(value) => match value.trim().parse::<u64>() {
                Ok(secs) if secs > 0 => Duration::from_secs(secs),
                _ => {
                    return Err(ConfigError::InvalidNumber {
                        name: "FETCH_TIMEOUT_SECS",
                        value,
                    });
                }
            },
            None => defaults.fetch_timeout,
        };

        let map_access_token = get("MAP_ACCESS_TOKEN");
        if map_access_token.is_none() {
            warn!("MAP_ACCESS_TOKEN not set, falling back to the public basemap style");
        }

        Ok(Self {
            otp_base_url: get("OTP_BASE_URL").unwrap_or(defaults.otp_base_url),
            stops_base_url: get("STOP_MONITOR_BASE_URL").unwrap_or(defaults.stops_base_url),
            map_access_token,
            map_style_url: get("MAP_STYLE_URL"),
            fetch_timeout,
        })
    }

    /// Style URL the map should load.
    ///
    /// A custom style is only usable with an access token; without one the
    /// map renders the public style.
    pub fn map_style(&self) -> &str {
        match (&self.map_access_token, &self.map_style_url) {
            (Some(_), Some(url)) => url,
            _ => PUBLIC_STYLE_URL,
        }
    }

    pub fn is_degraded(&self) -> bool {
        self.map_access_token.is_none()
    }
}
