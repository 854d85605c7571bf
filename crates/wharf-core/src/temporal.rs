//! # Temporal Types — UTC-Only Timestamps
//!
//! Defines `Timestamp`, a UTC-only timestamp type truncated to seconds
//! precision. Every recorded instant in the stack — history entries, code
//! issuance, shipment promotions — uses this type, so dwell-time arithmetic
//! never has to reason about timezone offsets or sub-second jitter.
//!
//! Inputs with explicit offsets are converted to UTC at construction; the
//! stored value is always UTC.

use chrono::{DateTime, Duration, Timelike, Utc};
use serde::{Deserialize, Serialize};

use crate::error::WharfError;

/// A UTC-only timestamp, truncated to seconds precision.
///
/// # Construction
///
/// - [`Timestamp::now()`] — current UTC time, truncated.
/// - [`Timestamp::from_utc()`] — from a `DateTime<Utc>`, truncating sub-seconds.
/// - [`Timestamp::parse()`] — from an RFC 3339 string, converting to UTC.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Timestamp(DateTime<Utc>);

impl Timestamp {
    /// Create a timestamp from the current UTC time, truncated to seconds.
    pub fn now() -> Self {
        Self(truncate_to_seconds(Utc::now()))
    }

    /// Create a timestamp from a `chrono::DateTime<Utc>`, truncating sub-seconds.
    pub fn from_utc(dt: DateTime<Utc>) -> Self {
        Self(truncate_to_seconds(dt))
    }

    /// Parse a timestamp from an RFC 3339 string.
    ///
    /// Accepts any offset and converts to UTC; the stored value is always
    /// UTC with seconds precision.
    ///
    /// # Errors
    ///
    /// Returns an error if the string is not valid RFC 3339.
    pub fn parse(s: &str) -> Result<Self, WharfError> {
        let dt = DateTime::parse_from_rfc3339(s).map_err(|e| {
            WharfError::InvalidTimestamp(format!("invalid RFC 3339 timestamp {s:?}: {e}"))
        })?;
        Ok(Self(truncate_to_seconds(dt.with_timezone(&Utc))))
    }

    /// Access the inner `DateTime<Utc>`.
    pub fn as_datetime(&self) -> &DateTime<Utc> {
        &self.0
    }

    /// Fractional hours elapsed from `earlier` to `self`.
    ///
    /// Negative when `self` precedes `earlier` — callers comparing dwell
    /// times against an expected duration treat that as "not yet elapsed".
    pub fn hours_since(&self, earlier: Timestamp) -> f64 {
        let seconds = self.0.signed_duration_since(earlier.0).num_seconds();
        seconds as f64 / 3600.0
    }

    /// A timestamp `hours` whole hours after this one.
    ///
    /// Saturates at the representable range rather than wrapping.
    pub fn plus_hours(&self, hours: i64) -> Self {
        let shifted = self
            .0
            .checked_add_signed(Duration::hours(hours))
            .unwrap_or(self.0);
        Self(shifted)
    }

    /// Render as ISO 8601 with Z suffix (e.g., `2026-01-15T12:00:00Z`).
    pub fn to_iso8601(&self) -> String {
        self.0.format("%Y-%m-%dT%H:%M:%SZ").to_string()
    }
}

impl std::fmt::Display for Timestamp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.to_iso8601())
    }
}

/// Truncate a `DateTime<Utc>` to seconds precision (discard nanoseconds).
fn truncate_to_seconds(dt: DateTime<Utc>) -> DateTime<Utc> {
    dt.with_nanosecond(0).unwrap_or(dt)
}
