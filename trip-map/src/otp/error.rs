//! Routing client error types.

use std::fmt;

/// Errors from the routing service client.
#[derive(Debug)]
pub enum OtpError {
    /// HTTP request failed (network error, timeout, etc.)
    Http(reqwest::Error),

    /// Response body could not be parsed or converted
    Json {
        message: String,
        body: Option<String>,
    },

    /// Service returned an error status code
    Api { status: u16, message: String },

    /// The planner answered but found no trip
    NoPlan(String),

    /// Rate limited by the service
    RateLimited,

    /// Credentials rejected
    Unauthorized,

    /// Mock data could not be loaded
    Mock(String),
}

impl fmt::Display for OtpError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OtpError::Http(e) => write!(f, "HTTP error: {e}"),
            OtpError::Json { message, body } => {
                write!(f, "JSON parse error: {message}")?;
                if let Some(body) = body {
                    write!(f, " (body: {body})")?;
                }
                Ok(())
            }
            OtpError::Api { status, message } => write!(f, "API error {status}: {message}"),
            OtpError::NoPlan(message) => write!(f, "no trip found: {message}"),
            OtpError::RateLimited => write!(f, "rate limited by routing service"),
            OtpError::Unauthorized => write!(f, "unauthorized by routing service"),
            OtpError::Mock(message) => write!(f, "mock data error: {message}"),
        }
    }
}

impl std::error::Error for OtpError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            OtpError::Http(e) => Some(e),
            _ => None,
        }
    }
}

impl From<reqwest::Error> for OtpError {
    fn from(err: reqwest::Error) -> Self {
        OtpError::Http(err)
    }
}
