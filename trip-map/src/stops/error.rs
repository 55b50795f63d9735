//! Stop-monitor error types.

/// Errors that can occur when fetching stop data.
#[derive(Debug, thiserror::Error)]
pub enum StopError {
    /// HTTP request failed
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Service returned an error status
    #[error("API error {status}: {message}")]
    Api { status: u16, message: String },

    /// Failed to parse response JSON
    #[error("JSON parse error: {message}")]
    Json { message: String },

    /// Mock data could not be loaded
    #[error("mock data error: {message}")]
    Mock { message: String },
}
