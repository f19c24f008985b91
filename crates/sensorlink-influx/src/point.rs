// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! InfluxDB v2 Line Protocol points.
//!
//! Line Protocol format:
//! ```text
//! measurement,tag1=val1,tag2=val2 field1=val1,field2=val2 timestamp_ns
//! ```
//!
//! See: <https://docs.influxdata.com/influxdb/v2/reference/syntax/line-protocol/>

use std::fmt;
use thiserror::Error;

/// A value that can be stored in an InfluxDB field.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    /// 64-bit floating point.
    Float(f64),
    /// 64-bit signed integer.
    Integer(i64),
    /// UTF-8 string.
    String(String),
    /// Boolean value.
    Boolean(bool),
}

impl FieldValue {
    /// Format this value for InfluxDB Line Protocol.
    ///
    /// - Float: written as-is (e.g., `3.14`)
    /// - Integer: suffixed with `i` (e.g., `42i`)
    /// - String: quoted with double quotes, inner quotes escaped (e.g., `"hello"`)
    /// - Boolean: `true` or `false`
    pub fn to_line_protocol(&self) -> String {
        match self {
            FieldValue::Float(v) => format!("{}", v),
            FieldValue::Integer(v) => format!("{}i", v),
            FieldValue::String(v) => {
                let escaped = v.replace('\\', "\\\\").replace('"', "\\\"");
                format!("\"{}\"", escaped)
            }
            FieldValue::Boolean(v) => v.to_string(),
        }
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_line_protocol())
    }
}

impl From<i64> for FieldValue {
    fn from(v: i64) -> Self {
        FieldValue::Integer(v)
    }
}

impl From<f64> for FieldValue {
    fn from(v: f64) -> Self {
        FieldValue::Float(v)
    }
}

impl From<bool> for FieldValue {
    fn from(v: bool) -> Self {
        FieldValue::Boolean(v)
    }
}

impl From<&str> for FieldValue {
    fn from(v: &str) -> Self {
        FieldValue::String(v.to_string())
    }
}

/// Errors raised while encoding a point.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum PointError {
    /// InfluxDB rejects points without at least one field.
    #[error("point '{0}' has no fields")]
    NoFields(String),
}

/// A single InfluxDB data point.
///
/// Built with chained setters, encoded with [`Point::to_line_protocol`].
#[derive(Debug, Clone, PartialEq)]
pub struct Point {
    measurement: String,
    tags: Vec<(String, String)>,
    fields: Vec<(String, FieldValue)>,
    timestamp_ns: Option<i64>,
}

impl Point {
    /// Start a point for the given measurement.
    pub fn new(measurement: impl Into<String>) -> Self {
        Self {
            measurement: measurement.into(),
            tags: Vec::new(),
            fields: Vec::new(),
            timestamp_ns: None,
        }
    }

    /// Add a tag. A later tag with the same key replaces the earlier one.
    pub fn tag(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        let key = key.into();
        self.tags.retain(|(k, _)| *k != key);
        self.tags.push((key, value.into()));
        self
    }

    /// Add a field.
    pub fn field(mut self, key: impl Into<String>, value: impl Into<FieldValue>) -> Self {
        self.fields.push((key.into(), value.into()));
        self
    }

    /// Set the timestamp in nanoseconds since the Unix epoch.
    ///
    /// Without a timestamp the server assigns its own receive time.
    pub fn timestamp(mut self, timestamp_ns: i64) -> Self {
        self.timestamp_ns = Some(timestamp_ns);
        self
    }

    /// Measurement name.
    pub fn measurement(&self) -> &str {
        &self.measurement
    }

    /// Tag value for `key`, if set.
    pub fn tag_value(&self, key: &str) -> Option<&str> {
        self.tags
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Field value for `key`, if set.
    pub fn field_value(&self, key: &str) -> Option<&FieldValue> {
        self.fields.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    /// Encode this point as one Line Protocol line (no trailing newline).
    pub fn to_line_protocol(&self) -> Result<String, PointError> {
        if self.fields.is_empty() {
            return Err(PointError::NoFields(self.measurement.clone()));
        }

        let mut line = escape_measurement(&self.measurement);

        // Tags sorted by key for canonical form
        let mut sorted_tags: Vec<_> = self.tags.iter().collect();
        sorted_tags.sort_by(|(a, _), (b, _)| a.cmp(b));
        for (key, value) in sorted_tags {
            line.push(',');
            line.push_str(&escape_key(key));
            line.push('=');
            line.push_str(&escape_key(value));
        }

        line.push(' ');
        for (i, (key, value)) in self.fields.iter().enumerate() {
            if i > 0 {
                line.push(',');
            }
            line.push_str(&escape_key(key));
            line.push('=');
            line.push_str(&value.to_line_protocol());
        }

        if let Some(ts) = self.timestamp_ns {
            line.push(' ');
            line.push_str(&ts.to_string());
        }

        Ok(line)
    }
}

/// Encode several points into a newline-separated request body.
pub fn encode_batch(points: &[Point]) -> Result<String, PointError> {
    let lines = points
        .iter()
        .map(Point::to_line_protocol)
        .collect::<Result<Vec<_>, _>>()?;
    Ok(lines.join("\n"))
}

/// Spaces and commas are escaped in measurement names.
fn escape_measurement(s: &str) -> String {
    s.replace(',', "\\,").replace(' ', "\\ ")
}

/// Tag keys, tag values and field keys share the same escaping rules.
///
/// Backslashes are doubled first so a trailing one cannot escape the
/// separator that follows. Line breaks would end the line early.
fn escape_key(s: &str) -> String {
    s.replace('\\', "\\\\")
        .replace(',', "\\,")
        .replace('=', "\\=")
        .replace(' ', "\\ ")
        .replace('\n', "\\n")
        .replace('\r', "\\r")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_field_value_formats() {
        assert_eq!(FieldValue::Float(3.15).to_line_protocol(), "3.15");
        assert_eq!(FieldValue::Integer(42).to_line_protocol(), "42i");
        assert_eq!(FieldValue::Integer(-7).to_line_protocol(), "-7i");
        assert_eq!(FieldValue::Boolean(true).to_line_protocol(), "true");
        assert_eq!(
            FieldValue::String("say \"hi\"".to_string()).to_line_protocol(),
            "\"say \\\"hi\\\"\""
        );
    }

    #[test]
    fn test_sensor_point_line() {
        let point = Point::new("sensor_data")
            .tag("user", "jay")
            .tag("device_id", "01")
            .field("light", 123i64)
            .timestamp(1_000_000_000);

        assert_eq!(
            point.to_line_protocol().expect("encode"),
            "sensor_data,device_id=01,user=jay light=123i 1000000000"
        );
    }

    #[test]
    fn test_point_without_timestamp() {
        let point = Point::new("m").field("f", 1i64);
        assert_eq!(point.to_line_protocol().expect("encode"), "m f=1i");
    }

    #[test]
    fn test_point_requires_field() {
        let point = Point::new("sensor_data").tag("user", "jay");
        assert_eq!(
            point.to_line_protocol(),
            Err(PointError::NoFields("sensor_data".to_string()))
        );
    }

    #[test]
    fn test_duplicate_tag_replaced() {
        let point = Point::new("m").tag("user", "a").tag("user", "b").field("f", 1i64);
        assert_eq!(point.tag_value("user"), Some("b"));
        assert_eq!(point.to_line_protocol().expect("encode"), "m,user=b f=1i");
    }

    #[test]
    fn test_escape_special_chars() {
        let point = Point::new("my measurement")
            .tag("tag key", "tag,value")
            .field("field=key", "hello \"world\"")
            .timestamp(3_000_000_000);

        assert_eq!(
            point.to_line_protocol().expect("encode"),
            "my\\ measurement,tag\\ key=tag\\,value field\\=key=\"hello \\\"world\\\"\" 3000000000"
        );
    }

    #[test]
    fn test_trailing_backslash_in_tag_value() {
        let point = Point::new("sensor_data")
            .tag("user", "jay")
            .tag("device_id", "0\\")
            .field("light", 5i64);

        assert_eq!(
            point.to_line_protocol().expect("encode"),
            "sensor_data,device_id=0\\\\,user=jay light=5i"
        );
    }

    #[test]
    fn test_line_breaks_in_tag_value() {
        let point = Point::new("sensor_data")
            .tag("device_id", "0\r")
            .field("light", 5i64);

        let line = point.to_line_protocol().expect("encode");
        assert_eq!(line, "sensor_data,device_id=0\\r light=5i");
        assert!(!line.contains('\r'));
    }

    #[test]
    fn test_encode_batch_joins_lines() {
        let points = vec![
            Point::new("a").field("v", 1i64).timestamp(1),
            Point::new("b").field("v", 2i64).timestamp(2),
        ];
        assert_eq!(encode_batch(&points).expect("encode"), "a v=1i 1\nb v=2i 2");
    }

    #[test]
    fn test_encode_batch_fails_on_empty_point() {
        let points = vec![Point::new("a").field("v", 1i64), Point::new("b")];
        assert!(encode_batch(&points).is_err());
    }
}
