//! Cross-source averaging of hourly forecast records
//!
//! A raw payload carries one reading per upstream source for every field of
//! every hour:
//!
//! ```json
//! {"hours": [{"time": "2024-01-15T00:00:00+00:00", "waveHeight": {"noaa": 1.2, "sg": 1.4}}]}
//! ```
//!
//! The averaged payload collapses each per-source mapping to one number and
//! re-keys `hours` by the record's Unix timestamp, ascending.

use std::collections::BTreeMap;

use chrono::{DateTime, NaiveDateTime};
use serde_json::{Map, Value};
use tracing::{debug, instrument};

use super::forecast_value::ForecastValue;
use crate::error::ApplicationError;

/// Name of the collection holding hourly records
pub const HOURS_FIELD: &str = "hours";

/// Default name of the per-record time field
pub const DEFAULT_TIME_FIELD: &str = "time";

/// Decimal places kept in averaged readings
const PRECISION: i32 = 3;

/// Naive layouts accepted for the time field, interpreted as UTC
const NAIVE_TIME_FORMATS: &[&str] = &["%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M"];

/// Collapses per-source readings into a single averaged reading per field
#[derive(Debug, Clone)]
pub struct SourceAverager {
    time_field: String,
}

impl Default for SourceAverager {
    fn default() -> Self {
        Self::new()
    }
}

impl SourceAverager {
    /// Create an averager using the `time` field for re-keying
    #[must_use]
    pub fn new() -> Self {
        Self {
            time_field: DEFAULT_TIME_FIELD.to_string(),
        }
    }

    /// Use a different field as the record timestamp
    #[must_use]
    pub fn with_time_field(mut self, time_field: impl Into<String>) -> Self {
        self.time_field = time_field.into();
        self
    }

    /// Average a multi-source payload
    ///
    /// `hours` may be an array (raw payload) or an object (already averaged);
    /// running the pass on its own output yields the same output. Top-level
    /// keys other than `hours` are kept as-is.
    ///
    /// A payload without `hours` averages to an empty `hours` object.
    ///
    /// # Errors
    ///
    /// Returns [`ApplicationError::MalformedRecord`] if `hours` is not a
    /// collection or any record lacks a parseable time field. The whole pass
    /// is aborted in that case.
    #[instrument(skip(self, payload), fields(time_field = %self.time_field))]
    pub fn average(&self, payload: &Value) -> Result<Value, ApplicationError> {
        let Value::Object(top) = payload else {
            return Err(malformed("payload", "expected a JSON object"));
        };

        let records: Vec<(String, &Value)> = match top.get(HOURS_FIELD) {
            Some(Value::Array(items)) => items
                .iter()
                .enumerate()
                .map(|(i, record)| (format!("{HOURS_FIELD}[{i}]"), record))
                .collect(),
            Some(Value::Object(items)) => items
                .iter()
                .map(|(k, record)| (format!("{HOURS_FIELD}.{k}"), record))
                .collect(),
            Some(_) => return Err(malformed(HOURS_FIELD, "expected an array or object")),
            // Pruning drops an empty collection
            None => Vec::new(),
        };

        let mut by_timestamp: BTreeMap<i64, Value> = BTreeMap::new();
        for (label, record) in records {
            let (timestamp, averaged) = self.average_record(&label, record)?;
            if by_timestamp.insert(timestamp, averaged).is_some() {
                debug!(record = %label, timestamp, "Duplicate timestamp replaced earlier record");
            }
        }

        debug!(hours = by_timestamp.len(), "Averaged hourly records");

        let hours: Map<String, Value> = by_timestamp
            .into_iter()
            .map(|(ts, record)| (ts.to_string(), record))
            .collect();

        let mut output = top.clone();
        output.insert(HOURS_FIELD.to_string(), Value::Object(hours));
        Ok(Value::Object(output))
    }

    fn average_record(&self, label: &str, record: &Value) -> Result<(i64, Value), ApplicationError> {
        let ForecastValue::Mapping(fields) = ForecastValue::from(record.clone()) else {
            return Err(malformed(label, "expected a JSON object"));
        };

        let mut timestamp = None;
        let mut averaged = Vec::with_capacity(fields.len());
        for (name, value) in fields {
            if name == self.time_field {
                let text = value
                    .as_text()
                    .ok_or_else(|| malformed(label, "time field is not a string"))?;
                let ts = parse_timestamp(text)
                    .ok_or_else(|| malformed(label, &format!("unparsable time '{text}'")))?;
                timestamp = Some(ts);
                averaged.push((name, value));
            } else if let ForecastValue::Mapping(readings) = &value {
                averaged.push((name, average_readings(readings)));
            } else {
                averaged.push((name, value));
            }
        }

        let timestamp = timestamp
            .ok_or_else(|| malformed(label, &format!("missing '{}' field", self.time_field)))?;
        Ok((timestamp, ForecastValue::Mapping(averaged).into()))
    }
}

/// Mean of the non-zero numeric readings, rounded; 0 when there are none
///
/// Readings that are exactly zero count as "no reading" and are excluded
/// from both the sum and the count.
fn average_readings(readings: &[(String, ForecastValue)]) -> ForecastValue {
    let (sum, count) = readings
        .iter()
        .filter_map(|(_, value)| value.as_reading())
        .filter(|reading| *reading != 0.0)
        .fold((0.0_f64, 0_u32), |(sum, count), reading| (sum + reading, count + 1));

    let mean = if count == 0 {
        0.0
    } else {
        round(sum / f64::from(count))
    };
    ForecastValue::from_f64(mean).unwrap_or(ForecastValue::Null)
}

fn round(value: f64) -> f64 {
    let factor = 10_f64.powi(PRECISION);
    (value * factor).round() / factor
}

fn parse_timestamp(text: &str) -> Option<i64> {
    let text = text.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(text) {
        return Some(dt.timestamp());
    }
    NAIVE_TIME_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(text, format).ok())
        .map(|naive| naive.and_utc().timestamp())
}

fn malformed(record: &str, reason: &str) -> ApplicationError {
    ApplicationError::MalformedRecord {
        record: record.to_string(),
        reason: reason.to_string(),
    }
}
