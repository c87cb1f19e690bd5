// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Timestamped values.
//!
//! A [`DataValue`] pairs a [`Variant`] with the [`StatusCode`] of the
//! read and the source/server timestamps (each with an optional
//! picosecond remainder beyond the tick resolution). Every field is
//! optional on the wire; an absent status means Good.

use std::fmt;

use crate::datetime::DateTime;
use crate::status::StatusCode;
use crate::variant::Variant;

// =============================================================================
// DataValue
// =============================================================================

/// A value with quality and provenance timestamps.
///
/// # Examples
///
/// ```
/// use forge_types::data_value::DataValue;
/// use forge_types::datetime::DateTime;
/// use forge_types::variant::Variant;
///
/// let dv = DataValue::new(Variant::from(25.5f64))
///     .with_source_timestamp(DateTime::now());
/// assert!(dv.is_good());
/// ```
#[derive(Debug, Clone, PartialEq, Default)]
pub struct DataValue {
    /// The value; `None` when the read produced no value.
    pub value: Option<Variant>,

    /// Quality of the value; absent means Good.
    pub status: Option<StatusCode>,

    /// Timestamp assigned by the data source.
    pub source_timestamp: Option<DateTime>,

    /// Picoseconds past the source timestamp's tick.
    pub source_picoseconds: Option<u16>,

    /// Timestamp assigned by the server.
    pub server_timestamp: Option<DateTime>,

    /// Picoseconds past the server timestamp's tick.
    pub server_picoseconds: Option<u16>,
}

impl DataValue {
    /// Creates a data value with Good quality and no timestamps.
    pub fn new(value: Variant) -> Self {
        Self {
            value: Some(value),
            ..Default::default()
        }
    }

    /// Returns a copy with the given status.
    #[must_use]
    pub fn with_status(mut self, status: StatusCode) -> Self {
        self.status = Some(status);
        self
    }

    /// Returns a copy with the given source timestamp.
    #[must_use]
    pub fn with_source_timestamp(mut self, timestamp: DateTime) -> Self {
        self.source_timestamp = Some(timestamp);
        self
    }

    /// Returns a copy with the given server timestamp.
    #[must_use]
    pub fn with_server_timestamp(mut self, timestamp: DateTime) -> Self {
        self.server_timestamp = Some(timestamp);
        self
    }

    /// Returns the effective status; absent means Good.
    #[inline]
    pub fn status(&self) -> StatusCode {
        self.status.unwrap_or(StatusCode::GOOD)
    }

    /// Returns `true` if the effective status is Good.
    #[inline]
    pub fn is_good(&self) -> bool {
        self.status().is_good()
    }

    /// Returns the value, [`Variant::Empty`] when absent.
    #[inline]
    pub fn value_or_empty(&self) -> &Variant {
        self.value.as_ref().unwrap_or(&Variant::Empty)
    }

    /// Converts to a JSON object.
    pub fn to_json(&self) -> serde_json::Value {
        let mut map = serde_json::Map::new();
        map.insert("value".into(), self.value_or_empty().to_json());
        map.insert("status".into(), serde_json::json!(self.status().bits()));
        if let Some(ts) = self.source_timestamp {
            map.insert("source_timestamp".into(), serde_json::json!(ts.to_string()));
        }
        if let Some(ts) = self.server_timestamp {
            map.insert("server_timestamp".into(), serde_json::json!(ts.to_string()));
        }
        serde_json::Value::Object(map)
    }
}

impl From<Variant> for DataValue {
    fn from(value: Variant) -> Self {
        Self::new(value)
    }
}

impl fmt::Display for DataValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} [{}]", self.value_or_empty(), self.status())?;
        if let Some(ts) = self.source_timestamp {
            write!(f, " @ {}", ts)?;
        }
        Ok(())
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_absent_status_means_good() {
        let dv = DataValue::new(Variant::from(1i32));
        assert_eq!(dv.status, None);
        assert_eq!(dv.status(), StatusCode::GOOD);
        assert!(dv.is_good());

        let bad = dv.with_status(StatusCode::BAD_INTERNAL_ERROR);
        assert!(!bad.is_good());
    }

    #[test]
    fn test_value_or_empty() {
        let dv = DataValue::default();
        assert!(dv.value_or_empty().is_null());
        let dv = DataValue::new(Variant::from("x"));
        assert_eq!(dv.value_or_empty().as_str(), Some("x"));
    }

    #[test]
    fn test_display() {
        let ts = DateTime::parse("2025-06-01T12:00:00Z").unwrap();
        let dv = DataValue::new(Variant::from(2.5f64)).with_source_timestamp(ts);
        let rendered = dv.to_string();
        assert!(rendered.contains("2.5"));
        assert!(rendered.contains("Good"));
        assert!(rendered.contains("2025-06-01T12:00:00.000Z"));
    }

    #[test]
    fn test_to_json() {
        let dv = DataValue::new(Variant::from(vec![1i32, 2]));
        let json = dv.to_json();
        assert_eq!(json["value"], serde_json::json!([1, 2]));
        assert_eq!(json["status"], serde_json::json!(0));
    }
}
