//! Text codec for [`Value`] trees.
//!
//! The persisted form is compact JSON. Encoding is deterministic (map
//! entries are ordered), so re-writing an unchanged field is idempotent at
//! the storage layer. Decoding accepts exactly the shapes the closed
//! [`Value`] variant can express, which is every well-formed JSON text.

use crate::error::{DecodeError, EncodeError};
use crate::value::Value;

/// Encode a value into its persisted text form.
///
/// Fails only when the tree contains a non-finite float; every other
/// constructible tree encodes.
pub fn encode(value: &Value) -> Result<String, EncodeError> {
    if let Some(f) = first_non_finite(value) {
        return Err(EncodeError::NonFiniteFloat(f));
    }
    Ok(serde_json::to_string(value)?)
}

/// Decode persisted text back into a value.
///
/// Decoding the output of [`encode`] always succeeds and reproduces an
/// equal value.
pub fn decode(input: &str) -> Result<Value, DecodeError> {
    Ok(serde_json::from_str(input)?)
}

fn first_non_finite(value: &Value) -> Option<f64> {
    match value {
        Value::Float(f) if !f.is_finite() => Some(*f),
        Value::List(items) => items.iter().find_map(first_non_finite),
        Value::Map(entries) => entries.values().find_map(first_non_finite),
        _ => None,
    }
}
