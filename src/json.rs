//! Lenient extractors over `serde_json::Value`.
//!
//! The server's JSON is loosely typed: numbers arrive as numbers or as
//! decimal strings, booleans as true/false, 0/1 or "true"/"false",
//! depending on the code path that produced them. Required extractors
//! turn a missing or mistyped field into `ApiError::DataIntegrity` with
//! enough context to name the offending field.

use serde_json::Value;

use crate::error::{ApiError, Result};

/// Read a bool from a bool, an integer, or a string encoding.
pub(crate) fn as_bool_lenient(v: &Value) -> Option<bool> {
    match v {
        Value::Bool(b) => Some(*b),
        Value::Number(n) => n.as_i64().map(|i| i != 0),
        Value::String(s) => match s.as_str() {
            "true" | "1" => Some(true),
            "false" | "0" | "" => Some(false),
            _ => None,
        },
        _ => None,
    }
}

/// Read an i64 from a number or a decimal string.
pub(crate) fn as_i64_lenient(v: &Value) -> Option<i64> {
    match v {
        Value::Number(n) => n.as_i64().or_else(|| n.as_f64().map(|f| f as i64)),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

/// Read an f64 from a number or a decimal string.
pub(crate) fn as_f64_lenient(v: &Value) -> Option<f64> {
    match v {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

/// Required object field as a string slice.
pub(crate) fn req_str<'a>(v: &'a Value, field: &str) -> Result<&'a str> {
    v.get(field)
        .and_then(Value::as_str)
        .ok_or_else(|| ApiError::shape(format!("missing string field `{field}`")))
}

/// Required object field as an i64 (lenient).
pub(crate) fn req_i64(v: &Value, field: &str) -> Result<i64> {
    v.get(field)
        .and_then(as_i64_lenient)
        .ok_or_else(|| ApiError::shape(format!("missing numeric field `{field}`")))
}

/// Required object field as an array.
pub(crate) fn req_array<'a>(v: &'a Value, field: &str) -> Result<&'a Vec<Value>> {
    v.get(field)
        .and_then(Value::as_array)
        .ok_or_else(|| ApiError::shape(format!("missing array field `{field}`")))
}

/// Optional string field; absent or null yields None.
pub(crate) fn opt_str<'a>(v: &'a Value, field: &str) -> Option<&'a str> {
    v.get(field).and_then(Value::as_str)
}

/// Optional i64 field (lenient); absent, null or mistyped yields None.
pub(crate) fn opt_i64(v: &Value, field: &str) -> Option<i64> {
    v.get(field).and_then(as_i64_lenient)
}

/// Optional bool field (lenient); absent yields `default`.
pub(crate) fn opt_bool(v: &Value, field: &str, default: bool) -> bool {
    v.get(field).and_then(as_bool_lenient).unwrap_or(default)
}

/// Optional f64 field (lenient); absent yields 0.0.
pub(crate) fn opt_f64(v: &Value, field: &str) -> f64 {
    v.get(field).and_then(as_f64_lenient).unwrap_or(0.0)
}
