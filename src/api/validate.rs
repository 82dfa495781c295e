// src/api/validate.rs

//! Shape checks for response bodies. Anything that does not match the
//! expected schema becomes `ChatError::InvalidResponse` instead of a
//! silently substituted default.

use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::error::{ChatError, Result};

fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

fn parse_json(endpoint: &str, body: &str) -> Result<Value> {
    serde_json::from_str(body)
        .map_err(|e| ChatError::invalid_response(endpoint, format!("body is not JSON: {}", e)))
}

/// Decode a body that must be a JSON array of `T`.
pub fn decode_list<T: DeserializeOwned>(endpoint: &str, body: &str) -> Result<Vec<T>> {
    let items = match parse_json(endpoint, body)? {
        Value::Array(items) => items,
        other => {
            return Err(ChatError::invalid_response(
                endpoint,
                format!("expected an array, got {}", kind_of(&other)),
            ))
        }
    };

    items
        .into_iter()
        .enumerate()
        .map(|(i, item)| {
            serde_json::from_value(item).map_err(|e| {
                ChatError::invalid_response(endpoint, format!("item {}: {}", i, e))
            })
        })
        .collect()
}

/// Decode a body that must be a JSON object matching `T`.
pub fn decode_object<T: DeserializeOwned>(endpoint: &str, body: &str) -> Result<T> {
    let value = parse_json(endpoint, body)?;
    if !value.is_object() {
        return Err(ChatError::invalid_response(
            endpoint,
            format!("expected an object, got {}", kind_of(&value)),
        ));
    }
    serde_json::from_value(value).map_err(|e| ChatError::invalid_response(endpoint, e.to_string()))
}
