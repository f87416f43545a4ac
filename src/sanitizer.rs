//! Final pass before persistence: drop malformed media references.
//!
//! A property whose value is an object carrying a `connect` key is a media
//! reference. It is removed when `connect` is not an array, is empty, or holds
//! a falsy element (`null`, `false`, `0`, `""`). All other structure is kept.

use serde_json::{Map, Value};

/// Return `value` with every malformed media reference property removed
pub fn sanitize_record_before_create(value: Value) -> Value {
    match value {
        Value::Object(map) => Value::Object(sanitize_object(map)),
        Value::Array(items) => Value::Array(
            items
                .into_iter()
                .map(sanitize_record_before_create)
                .collect(),
        ),
        other => other,
    }
}

fn sanitize_object(map: Map<String, Value>) -> Map<String, Value> {
    map.into_iter()
        .filter_map(|(key, value)| {
            if is_broken_reference(&value) {
                tracing::debug!(field = %key, "dropping malformed media reference");
                None
            } else {
                Some((key, sanitize_record_before_create(value)))
            }
        })
        .collect()
}

/// True for `{connect: ...}` objects that must not reach the store
pub fn is_broken_reference(value: &Value) -> bool {
    let Some(connect) = value.as_object().and_then(|object| object.get("connect")) else {
        return false;
    };
    match connect {
        Value::Array(ids) => ids.is_empty() || ids.iter().any(is_falsy),
        _ => true,
    }
}

fn is_falsy(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Bool(b) => !b,
        Value::Number(n) => n.as_f64().is_none_or(|f| f == 0.0),
        Value::String(s) => s.is_empty(),
        Value::Array(_) | Value::Object(_) => false,
    }
}
