// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! High-resolution protocol timestamps.
//!
//! A [`DateTime`] is a 64-bit count of 100-nanosecond ticks since
//! 1601-01-01 00:00:00 UTC. That epoch is not the Unix epoch; conversions
//! go through the fixed [`UNIX_EPOCH_TICKS`] offset.
//!
//! Rendering takes an explicit [`DateTimeFormat`]; there is no
//! process-wide format state. `Display` is fixed ISO-8601 UTC with
//! millisecond precision.
//!
//! # Examples
//!
//! ```
//! use forge_types::datetime::DateTime;
//!
//! let ts = DateTime::parse("2025-06-01T12:00:00Z").unwrap();
//! assert_eq!(ts.to_string(), "2025-06-01T12:00:00.000Z");
//! ```

use std::fmt;

use chrono::{FixedOffset, TimeZone, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{ParseError, UaError};

/// Ticks (100 ns) per second.
pub const TICKS_PER_SECOND: i64 = 10_000_000;

/// Ticks (100 ns) per millisecond.
pub const TICKS_PER_MILLISECOND: i64 = 10_000;

/// Tick count of the Unix epoch (1970-01-01) relative to 1601-01-01.
pub const UNIX_EPOCH_TICKS: i64 = 116_444_736_000_000_000;

/// Tick count of 9999-12-31 23:59:59 UTC, the last representable instant.
const MAX_TICKS: i64 = 2_650_467_743_990_000_000;

// =============================================================================
// DateTime
// =============================================================================

/// A timestamp with 100-nanosecond resolution.
///
/// Immutable value object; tick count zero is the canonical null.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Default,
)]
#[serde(transparent)]
pub struct DateTime {
    ticks: i64,
}

impl DateTime {
    /// The null timestamp (tick count zero, 1601-01-01).
    pub const NULL: DateTime = DateTime { ticks: 0 };

    /// The earliest representable timestamp.
    pub const MIN: DateTime = DateTime { ticks: 0 };

    /// The latest representable timestamp (9999-12-31 23:59:59 UTC).
    pub const MAX: DateTime = DateTime { ticks: MAX_TICKS };

    /// Creates a timestamp from a raw tick count.
    #[inline]
    pub const fn from_ticks(ticks: i64) -> Self {
        Self { ticks }
    }

    /// Returns the raw tick count.
    #[inline]
    pub const fn ticks(&self) -> i64 {
        self.ticks
    }

    /// Returns `true` if this is the null timestamp.
    #[inline]
    pub const fn is_null(&self) -> bool {
        self.ticks == 0
    }

    /// Returns the current instant.
    pub fn now() -> Self {
        Self::from_chrono(&Utc::now())
    }

    /// Converts a calendar timestamp into ticks.
    ///
    /// Instants outside the representable range saturate at
    /// [`MIN`](Self::MIN) / [`MAX`](Self::MAX).
    pub fn from_chrono(dt: &chrono::DateTime<Utc>) -> Self {
        let secs = dt.timestamp();
        let sub_ticks = i64::from(dt.timestamp_subsec_nanos()) / 100;
        let ticks = secs
            .checked_mul(TICKS_PER_SECOND)
            .and_then(|t| t.checked_add(sub_ticks))
            .and_then(|t| t.checked_add(UNIX_EPOCH_TICKS));
        match ticks {
            Some(t) if t < 0 => Self::MIN,
            Some(t) if t > MAX_TICKS => Self::MAX,
            Some(t) => Self { ticks: t },
            None => {
                if dt.timestamp() < 0 {
                    Self::MIN
                } else {
                    Self::MAX
                }
            }
        }
    }

    /// Converts to a calendar timestamp in UTC.
    ///
    /// Tick counts outside the representable range are clamped first.
    pub fn to_chrono(&self) -> chrono::DateTime<Utc> {
        let unix_ticks = self.ticks.clamp(0, MAX_TICKS) - UNIX_EPOCH_TICKS;
        let secs = unix_ticks.div_euclid(TICKS_PER_SECOND);
        let nanos = (unix_ticks.rem_euclid(TICKS_PER_SECOND) * 100) as u32;
        chrono::DateTime::<Utc>::from_timestamp(secs, nanos).unwrap_or(chrono::DateTime::UNIX_EPOCH)
    }

    /// Decomposes the timestamp into an arbitrary timezone.
    pub fn with_timezone<Tz: TimeZone>(&self, tz: &Tz) -> chrono::DateTime<Tz> {
        self.to_chrono().with_timezone(tz)
    }

    /// Returns milliseconds since the Unix epoch.
    #[inline]
    pub const fn as_unix_millis(&self) -> i64 {
        (self.ticks - UNIX_EPOCH_TICKS) / TICKS_PER_MILLISECOND
    }

    /// Creates a timestamp from milliseconds since the Unix epoch.
    #[inline]
    pub const fn from_unix_millis(millis: i64) -> Self {
        Self {
            ticks: millis * TICKS_PER_MILLISECOND + UNIX_EPOCH_TICKS,
        }
    }

    /// Parses a constrained ISO-8601 timestamp.
    ///
    /// Accepted inputs are RFC 3339 instants with either a `Z` suffix or
    /// an explicit numeric offset, e.g. `2025-06-01T12:00:00Z` or
    /// `2025-06-01T14:30:00.250+02:30`.
    ///
    /// # Errors
    ///
    /// Fails with a parse error naming the offending input on malformed
    /// text or on instants outside the representable range.
    pub fn parse(input: &str) -> Result<Self, UaError> {
        let parsed = chrono::DateTime::parse_from_rfc3339(input.trim())
            .map_err(|e| ParseError::new("DateTime", input, e.to_string()))?;
        let utc = parsed.with_timezone(&Utc);
        let secs = utc.timestamp();
        let unix_min = -(UNIX_EPOCH_TICKS / TICKS_PER_SECOND);
        let unix_max = (MAX_TICKS - UNIX_EPOCH_TICKS) / TICKS_PER_SECOND;
        if secs < unix_min || secs > unix_max {
            return Err(ParseError::new(
                "DateTime",
                input,
                "instant outside the 1601-9999 representable range",
            )
            .into());
        }
        Ok(Self::from_chrono(&utc))
    }

    /// Renders with explicit formatting options.
    pub fn format(&self, options: &DateTimeFormat) -> String {
        let fraction = |ticks: i64| -> String {
            let sub = ticks.rem_euclid(TICKS_PER_SECOND);
            match options.precision {
                SecondsPrecision::Seconds => String::new(),
                SecondsPrecision::Milliseconds => {
                    format!(".{:03}", sub / TICKS_PER_MILLISECOND)
                }
                SecondsPrecision::Microseconds => format!(".{:06}", sub / 10),
                SecondsPrecision::Ticks => format!(".{:07}", sub),
            }
        };
        match options.offset {
            None => {
                let dt = self.to_chrono();
                format!(
                    "{}{}Z",
                    dt.format("%Y-%m-%dT%H:%M:%S"),
                    fraction(self.ticks)
                )
            }
            Some(offset) => {
                let dt = self.with_timezone(&offset);
                format!(
                    "{}{}{}",
                    dt.format("%Y-%m-%dT%H:%M:%S"),
                    fraction(self.ticks),
                    dt.format("%:z")
                )
            }
        }
    }
}

impl fmt::Display for DateTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.format(&DateTimeFormat::default()))
    }
}

// =============================================================================
// DateTimeFormat
// =============================================================================

/// Explicit rendering options for [`DateTime::format`].
///
/// There is no process-global default format; every render site states
/// what it wants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DateTimeFormat {
    /// Sub-second precision.
    pub precision: SecondsPrecision,

    /// Target offset; `None` renders UTC with a `Z` suffix.
    pub offset: Option<FixedOffset>,
}

impl DateTimeFormat {
    /// ISO-8601 UTC with millisecond precision.
    pub fn iso8601_utc() -> Self {
        Self::default()
    }

    /// ISO-8601 at a fixed offset.
    pub fn iso8601_offset(offset: FixedOffset) -> Self {
        Self {
            precision: SecondsPrecision::Milliseconds,
            offset: Some(offset),
        }
    }

    /// Returns a copy with the given sub-second precision.
    #[must_use]
    pub fn with_precision(mut self, precision: SecondsPrecision) -> Self {
        self.precision = precision;
        self
    }
}

/// Sub-second rendering precision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SecondsPrecision {
    /// Whole seconds.
    Seconds,

    /// Three fractional digits.
    #[default]
    Milliseconds,

    /// Six fractional digits.
    Microseconds,

    /// Seven fractional digits, the full tick resolution.
    Ticks,
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unix_epoch_offset() {
        let epoch = chrono::DateTime::<Utc>::from_timestamp(0, 0).unwrap();
        assert_eq!(DateTime::from_chrono(&epoch).ticks(), UNIX_EPOCH_TICKS);
        assert_eq!(DateTime::from_unix_millis(0).ticks(), UNIX_EPOCH_TICKS);
    }

    #[test]
    fn test_chrono_round_trip() {
        let dt = DateTime::parse("2025-06-01T12:34:56.789Z").unwrap();
        let back = DateTime::from_chrono(&dt.to_chrono());
        assert_eq!(dt, back);
        assert_eq!(dt.to_chrono().timestamp_subsec_millis(), 789);
    }

    #[test]
    fn test_parse_offset_input() {
        let utc = DateTime::parse("2025-06-01T12:00:00Z").unwrap();
        let offset = DateTime::parse("2025-06-01T14:30:00+02:30").unwrap();
        assert_eq!(utc, offset);
    }

    #[test]
    fn test_parse_rejects_malformed() {
        assert!(DateTime::parse("not a date").is_err());
        assert!(DateTime::parse("2025-13-01T00:00:00Z").is_err());
        assert!(DateTime::parse("2025-06-01 12:00:00").is_err());
        let err = DateTime::parse("garbage").unwrap_err();
        assert!(err.to_string().contains("garbage"));
    }

    #[test]
    fn test_null_and_bounds() {
        assert!(DateTime::NULL.is_null());
        assert!(!DateTime::now().is_null());
        assert!(DateTime::MIN < DateTime::MAX);

        // Out-of-range chrono instants saturate.
        let far_future = Utc.with_ymd_and_hms(9999, 12, 31, 23, 59, 59).unwrap()
            + chrono::Duration::days(400);
        assert_eq!(DateTime::from_chrono(&far_future), DateTime::MAX);
    }

    #[test]
    fn test_format_precisions() {
        let dt = DateTime::parse("2025-06-01T12:00:00.250Z").unwrap();
        let fmt = DateTimeFormat::iso8601_utc();
        assert_eq!(dt.format(&fmt), "2025-06-01T12:00:00.250Z");
        assert_eq!(
            dt.format(&fmt.with_precision(SecondsPrecision::Seconds)),
            "2025-06-01T12:00:00Z"
        );
        assert_eq!(
            dt.format(&fmt.with_precision(SecondsPrecision::Ticks)),
            "2025-06-01T12:00:00.2500000Z"
        );
    }

    #[test]
    fn test_format_with_offset() {
        let dt = DateTime::parse("2025-06-01T12:00:00Z").unwrap();
        let plus_two = FixedOffset::east_opt(2 * 3600).unwrap();
        assert_eq!(
            dt.format(&DateTimeFormat::iso8601_offset(plus_two)),
            "2025-06-01T14:00:00.000+02:00"
        );
    }

    #[test]
    fn test_timezone_decomposition() {
        let dt = DateTime::parse("2025-06-01T12:00:00Z").unwrap();
        let minus_five = FixedOffset::west_opt(5 * 3600).unwrap();
        let local = dt.with_timezone(&minus_five);
        assert_eq!(local.format("%H").to_string(), "07");
    }
}
