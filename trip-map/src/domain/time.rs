//! Timestamps for routing data.
//!
//! The routing service reports instants as milliseconds since the Unix epoch
//! and durations as seconds. `Timestamp` keeps the millisecond representation
//! so arithmetic matches the wire data exactly, and converts to `chrono`
//! types only for display.

use std::fmt;

use chrono::{DateTime, FixedOffset, Utc};
use serde::{Deserialize, Serialize};

/// Milliseconds in one minute.
pub const MILLIS_PER_MINUTE: i64 = 60_000;

/// An instant, in milliseconds since the Unix epoch.
///
/// # Examples
///
/// ```
/// use trip_map::domain::Timestamp;
/// use chrono::FixedOffset;
///
/// // 2024-03-15 09:30 UTC
/// let t = Timestamp::from_millis(1_710_495_000_000);
/// let utc = FixedOffset::east_opt(0).unwrap();
/// assert_eq!(t.format_hhmm(utc), "09:30");
/// ```
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Timestamp(i64);

impl Timestamp {
    /// Wrap a raw epoch-millisecond value.
    pub const fn from_millis(millis: i64) -> Self {
        Self(millis)
    }

    /// Returns the raw epoch-millisecond value.
    pub const fn as_millis(self) -> i64 {
        self.0
    }

    /// Milliseconds elapsed from `earlier` to `self` (negative if `earlier` is later).
    pub fn millis_since(self, earlier: Timestamp) -> i64 {
        self.0.saturating_sub(earlier.0)
    }

    /// Returns this instant shifted by `millis`.
    pub fn offset_millis(self, millis: i64) -> Self {
        Self(self.0.saturating_add(millis))
    }

    /// Converts to a UTC datetime, if representable.
    pub fn to_datetime(self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp_millis(self.0)
    }

    /// Formats the wall-clock time as `HH:MM` in the given offset.
    ///
    /// Unrepresentable instants render as `--:--`.
    pub fn format_hhmm(self, offset: FixedOffset) -> String {
        match self.to_datetime() {
            Some(dt) => dt.with_timezone(&offset).format("%H:%M").to_string(),
            None => "--:--".to_string(),
        }
    }
}

impl fmt::Debug for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Timestamp({})", self.0)
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.to_datetime() {
            Some(dt) => write!(f, "{}", dt.format("%Y-%m-%dT%H:%M:%SZ")),
            None => write!(f, "{}ms", self.0),
        }
    }
}

/// Formats a duration in seconds as `"{h}h {m}min"` or `"{m}min"`.
///
/// Seconds below a full minute are dropped.
///
/// ```
/// use trip_map::domain::format_duration;
///
/// assert_eq!(format_duration(90), "1min");
/// assert_eq!(format_duration(3_900), "1h 5min");
/// ```
pub fn format_duration(seconds: i64) -> String {
    let seconds = seconds.max(0);
    let hours = seconds / 3600;
    let minutes = (seconds % 3600) / 60;
    if hours > 0 {
        format!("{hours}h {minutes}min")
    } else {
        format!("{minutes}min")
    }
}

/// Like [`format_duration`], but rounds to the nearest minute.
///
/// ```
/// use trip_map::domain::format_duration_rounded;
///
/// assert_eq!(format_duration_rounded(90), "2min");
/// assert_eq!(format_duration_rounded(89), "1min");
/// ```
pub fn format_duration_rounded(seconds: i64) -> String {
    let minutes = (seconds.max(0) + 30) / 60;
    format_duration(minutes * 60)
}
