//! Time types for availability queries.
//!
//! This module provides [`TimeWindow`] for query ranges, the canonical
//! rendering used for every instant that crosses a boundary, and
//! [`normalize_window`] which clamps a caller-supplied window to the limits
//! the upstream provider accepts.

use chrono::{DateTime, Duration, SecondsFormat, SubsecRound, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Forward buffer applied to "now" before a window may start.
pub const MIN_LEAD_SECONDS: i64 = 60;

/// Longest window the upstream availability endpoint accepts.
pub const MAX_WINDOW_DAYS: i64 = 7;

/// Errors produced while parsing or normalizing caller-supplied instants.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WindowError {
    /// A bound could not be parsed as an absolute instant.
    #[error("invalid {field} instant: {value:?}")]
    Unparseable { field: &'static str, value: String },

    /// The window is empty or inverted.
    #[error("empty time window: start {start} is not before end {end}")]
    Empty { start: String, end: String },
}

/// Parses an RFC 3339 instant with any offset and converts it to UTC.
///
/// Sub-millisecond precision is dropped so that parsed values compare equal
/// exactly when their canonical renderings do.
pub fn parse_instant(value: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value.trim())
        .ok()
        .map(|dt| dt.with_timezone(&Utc).trunc_subsecs(3))
}

/// Renders an instant as `YYYY-MM-DDTHH:MM:SS.mmmZ`.
///
/// Every instant shares this fixed-offset, fixed-precision layout, so the
/// lexicographic order of the strings matches chronological order.
pub fn canonical(dt: &DateTime<Utc>) -> String {
    dt.to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Like [`parse_instant`], but names the offending `field` on failure.
pub fn parse_field(field: &'static str, value: &str) -> Result<DateTime<Utc>, WindowError> {
    parse_instant(value).ok_or_else(|| WindowError::Unparseable {
        field,
        value: value.to_string(),
    })
}

/// Serde adapter that writes instants in canonical form.
pub mod canonical_instant {
    use chrono::{DateTime, Utc};
    use serde::{Deserialize, Deserializer, Serializer, de};

    pub fn serialize<S: Serializer>(dt: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&super::canonical(dt))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<DateTime<Utc>, D::Error> {
        let raw = String::deserialize(deserializer)?;
        super::parse_instant(&raw)
            .ok_or_else(|| de::Error::custom(format!("invalid instant: {raw:?}")))
    }
}

/// A time window for availability queries.
///
/// Represents the interval `[start, end)` in UTC. `end` is always strictly
/// after `start`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeWindow {
    /// Start of the window (inclusive).
    #[serde(with = "canonical_instant")]
    pub start: DateTime<Utc>,
    /// End of the window (exclusive).
    #[serde(with = "canonical_instant")]
    pub end: DateTime<Utc>,
}

impl TimeWindow {
    /// Creates a window, returning `None` unless `start < end`.
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> Option<Self> {
        (start < end).then_some(Self { start, end })
    }

    /// Returns the length of the window.
    pub fn duration(&self) -> Duration {
        self.end - self.start
    }

    /// Canonical rendering of the start bound.
    pub fn start_str(&self) -> String {
        canonical(&self.start)
    }

    /// Canonical rendering of the end bound.
    pub fn end_str(&self) -> String {
        canonical(&self.end)
    }
}

/// Clamps a caller-supplied window to the provider's query constraints.
///
/// The start is pushed to at least one minute after `now`, and the end is
/// pulled in so the window never exceeds seven days. Fails when either bound
/// does not parse or when nothing is left of the window after clamping.
pub fn normalize_window(
    raw_start: &str,
    raw_end: &str,
    now: DateTime<Utc>,
) -> Result<TimeWindow, WindowError> {
    let start = parse_field("start", raw_start)?;
    let end = parse_field("end", raw_end)?;

    let min_start = (now + Duration::seconds(MIN_LEAD_SECONDS)).trunc_subsecs(3);
    let clamped_start = start.max(min_start);
    let max_end = clamped_start + Duration::days(MAX_WINDOW_DAYS);
    let clamped_end = end.min(max_end);

    TimeWindow::new(clamped_start, clamped_end).ok_or_else(|| WindowError::Empty {
        start: canonical(&clamped_start),
        end: canonical(&clamped_end),
    })
}
