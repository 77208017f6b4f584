//! Tagged value used by the averaging pass
//!
//! Forecast payloads mix strings, numbers and per-source mappings in the
//! same position. Converting to [`ForecastValue`] up front makes every
//! coercion explicit.

use serde_json::{Map, Number, Value};

/// A JSON value with explicit variants for the shapes found in forecasts
///
/// Mappings keep their original key order.
#[derive(Debug, Clone, PartialEq)]
pub enum ForecastValue {
    /// `null`
    Null,
    /// `true` / `false`
    Bool(bool),
    /// A number, kept in its original JSON representation
    Number(Number),
    /// A string
    Text(String),
    /// An array
    Sequence(Vec<ForecastValue>),
    /// An object, in document order
    Mapping(Vec<(String, ForecastValue)>),
}

impl ForecastValue {
    /// Interpret this value as a numeric reading
    ///
    /// Numbers and numeric strings yield their value; everything else,
    /// including non-finite results, yields `None`.
    #[must_use]
    pub fn as_reading(&self) -> Option<f64> {
        let reading = match self {
            Self::Number(n) => n.as_f64()?,
            Self::Text(s) => s.trim().parse::<f64>().ok()?,
            _ => return None,
        };
        reading.is_finite().then_some(reading)
    }

    /// The string content, if this is text
    #[must_use]
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Build a number from an `f64`, `None` for NaN or infinity
    #[must_use]
    pub fn from_f64(value: f64) -> Option<Self> {
        Number::from_f64(value).map(Self::Number)
    }
}

impl From<Value> for ForecastValue {
    fn from(value: Value) -> Self {
        match value {
            Value::Null => Self::Null,
            Value::Bool(b) => Self::Bool(b),
            Value::Number(n) => Self::Number(n),
            Value::String(s) => Self::Text(s),
            Value::Array(items) => Self::Sequence(items.into_iter().map(Self::from).collect()),
            Value::Object(map) => {
                Self::Mapping(map.into_iter().map(|(k, v)| (k, Self::from(v))).collect())
            },
        }
    }
}

impl From<ForecastValue> for Value {
    fn from(value: ForecastValue) -> Self {
        match value {
            ForecastValue::Null => Self::Null,
            ForecastValue::Bool(b) => Self::Bool(b),
            ForecastValue::Number(n) => Self::Number(n),
            ForecastValue::Text(s) => Self::String(s),
            ForecastValue::Sequence(items) => {
                Self::Array(items.into_iter().map(Self::from).collect())
            },
            ForecastValue::Mapping(entries) => Self::Object(
                entries
                    .into_iter()
                    .map(|(k, v)| (k, Self::from(v)))
                    .collect::<Map<String, Self>>(),
            ),
        }
    }
}
