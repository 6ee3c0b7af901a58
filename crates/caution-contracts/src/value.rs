//! Helpers over attribute values.
//!
//! Attribute values are plain `serde_json::Value`s so host records can expose
//! untyped user input ("very old") next to typed data (23) without the engine
//! prescribing a value model.

use serde_json::Value;

/// True for null, `false`, strings that are empty or whitespace only, and
/// empty arrays or objects.
pub fn is_blank(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Bool(b) => !b,
        Value::String(s) => s.trim().is_empty(),
        Value::Array(items) => items.is_empty(),
        Value::Object(map) => map.is_empty(),
        Value::Number(_) => false,
    }
}

/// The value as plain text: strings verbatim, null as the empty string, and
/// everything else in its JSON rendering.
pub fn to_text(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// The value as a float when it is a JSON number.
pub fn as_number(value: &Value) -> Option<f64> {
    value.as_f64()
}

/// Equality that treats numbers by numeric value, so `1` equals `1.0`.
pub fn loosely_equal(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Number(x), Value::Number(y)) => x.as_f64() == y.as_f64(),
        _ => a == b,
    }
}

/// Render a number for messages: whole numbers without a fractional part.
pub fn format_number(n: f64) -> String {
    if n.fract() == 0.0 && n.is_finite() && n.abs() < 1e15 {
        format!("{}", n as i64)
    } else {
        n.to_string()
    }
}
