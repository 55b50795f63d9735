//! Request sequencing for asynchronous fetches.
//!
//! Each dispatched fetch gets a monotonically increasing [`RequestTicket`].
//! A result is applied only if its ticket is still the latest one, so a
//! slow response can never overwrite the data of a newer view. Dispatching
//! also aborts the previous in-flight fetch, and every fetch runs under a
//! timeout.

use std::fmt;
use std::future::Future;
use std::time::Duration;

use futures::future::{AbortHandle, AbortRegistration, Abortable};
use tracing::{debug, warn};

/// Identifies one dispatched fetch. Later dispatches compare greater.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RequestTicket(u64);

impl RequestTicket {
    pub fn sequence(self) -> u64 {
        self.0
    }
}

impl fmt::Display for RequestTicket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Why a fetch produced no data.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum FetchError {
    #[error("request timed out after {0:?}")]
    Timeout(Duration),

    /// Superseded by a newer request, or cancelled explicitly.
    #[error("request cancelled")]
    Cancelled,

    #[error("service error: {0}")]
    Service(String),
}

/// Load state shown to the presentation layer.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum FetchStatus {
    #[default]
    Idle,
    Loading(RequestTicket),
    Ready,
    /// The last fetch failed; previously applied data is still shown.
    Failed(FetchError),
}

/// Hands out tickets and keeps the abort handle of the latest fetch.
#[derive(Debug, Default)]
pub struct RequestSequencer {
    latest: u64,
    in_flight: Option<AbortHandle>,
}

impl RequestSequencer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a new fetch, aborting the previous one if still running.
    ///
    /// Wrap the fetch with [`run_fetch`] using the returned registration.
    pub fn dispatch(&mut self) -> (RequestTicket, AbortRegistration) {
        if let Some(previous) = self.in_flight.take() {
            previous.abort();
        }
        self.latest += 1;
        let (handle, registration) = AbortHandle::new_pair();
        self.in_flight = Some(handle);
        let ticket = RequestTicket(self.latest);
        debug!(%ticket, "fetch dispatched");
        (ticket, registration)
    }

    /// The most recently dispatched ticket.
    pub fn latest(&self) -> Option<RequestTicket> {
        (self.latest > 0).then_some(RequestTicket(self.latest))
    }

    pub fn is_current(&self, ticket: RequestTicket) -> bool {
        ticket.0 == self.latest
    }

    /// Mark `ticket` as finished. Returns false for a stale ticket.
    pub fn complete(&mut self, ticket: RequestTicket) -> bool {
        if self.is_current(ticket) {
            self.in_flight = None;
            true
        } else {
            false
        }
    }

    /// Abort the in-flight fetch, if any.
    pub fn cancel(&mut self) {
        if let Some(handle) = self.in_flight.take() {
            handle.abort();
        }
    }
}

/// Run `fut` with a timeout, abortable through `registration`.
pub async fn run_fetch<F, T, E>(
    fut: F,
    registration: AbortRegistration,
    timeout: Duration,
) -> Result<T, FetchError>
where
    F: Future<Output = Result<T, E>>,
    E: fmt::Display,
{
    match Abortable::new(tokio::time::timeout(timeout, fut), registration).await {
        Ok(Ok(Ok(value))) => Ok(value),
        Ok(Ok(Err(e))) => Err(FetchError::Service(e.to_string())),
        Ok(Err(_elapsed)) => {
            warn!(?timeout, "fetch timed out");
            Err(FetchError::Timeout(timeout))
        }
        Err(_aborted) => Err(FetchError::Cancelled),
    }
}
