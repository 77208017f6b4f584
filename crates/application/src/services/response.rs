//! Interpretation of raw forecast API responses

use serde_json::Value;
use tracing::{debug, warn};

use crate::error::{ApplicationError, RemoteFieldError};

/// Top-level key under which the remote API reports per-parameter errors
pub const ERRORS_FIELD: &str = "errors";

/// Turn a raw response body into a payload ready for caching
///
/// The body is decoded, pruned of empty values and checked for an `errors`
/// map. Content next to a well-formed payload is accepted as-is even if
/// individual fields look odd.
///
/// # Errors
///
/// - [`ApplicationError::Transport`] for an empty or undecodable body, or a
///   body that is empty after pruning
/// - [`ApplicationError::RemoteApi`] with one entry per reported parameter
pub fn interpret_response(body: &[u8]) -> Result<Value, ApplicationError> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Err(ApplicationError::Transport(
            "JSON decode failed: empty response body".to_string(),
        ));
    }

    let decoded: Value = serde_json::from_slice(body)
        .map_err(|e| ApplicationError::Transport(format!("JSON decode failed: {e}")))?;

    let payload = prune_empty(decoded).unwrap_or(Value::Null);

    if let Some(errors) = payload.get(ERRORS_FIELD) {
        let errors = remote_errors(errors);
        warn!(count = errors.len(), "Forecast API reported errors");
        return Err(ApplicationError::RemoteApi(errors));
    }

    let keys = payload.as_object().map_or(0, serde_json::Map::len);
    if keys == 0 {
        return Err(ApplicationError::Transport(
            "JSON decode failed: response holds no forecast data".to_string(),
        ));
    }

    debug!(keys, "Decoded forecast payload");
    Ok(payload)
}

/// Collect one error per named parameter
///
/// A parameter may carry a single message or a list; for a list the last
/// message is reported.
fn remote_errors(errors: &Value) -> Vec<RemoteFieldError> {
    let Value::Object(map) = errors else {
        return vec![RemoteFieldError {
            param: ERRORS_FIELD.to_string(),
            message: message_text(errors),
        }];
    };

    map.iter()
        .map(|(param, message)| {
            let message = match message {
                Value::Array(items) => items.last().map(message_text).unwrap_or_default(),
                other => message_text(other),
            };
            RemoteFieldError {
                param: param.clone(),
                message,
            }
        })
        .collect()
}

fn message_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Recursively drop empty values
///
/// `null`, `false`, empty strings and empty containers are removed. Numeric
/// zero is kept. A container that only held empty values is itself removed,
/// so a single pass is enough to reach a fixed point. Returns `None` if the
/// value itself is empty.
#[must_use]
pub fn prune_empty(value: Value) -> Option<Value> {
    match value {
        Value::Null | Value::Bool(false) => None,
        Value::String(ref s) if s.is_empty() => None,
        Value::Array(items) => {
            let items: Vec<Value> = items.into_iter().filter_map(prune_empty).collect();
            (!items.is_empty()).then_some(Value::Array(items))
        },
        Value::Object(map) => {
            let map: serde_json::Map<String, Value> = map
                .into_iter()
                .filter_map(|(k, v)| prune_empty(v).map(|v| (k, v)))
                .collect();
            (!map.is_empty()).then_some(Value::Object(map))
        },
        other => Some(other),
    }
}
