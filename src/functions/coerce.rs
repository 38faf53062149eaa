//! Text argument coercion by declared primitive type

use crate::schema::PrimitiveType;
use serde_json::{Number, Value};

/// Parse a textual argument into a JSON value of the declared primitive type.
///
/// Strings are taken verbatim. Numeric and boolean text is trimmed first.
/// Arrays and objects must be JSON text of that shape.
pub fn coerce(raw: &str, expected: PrimitiveType) -> Result<Value, String> {
    match expected {
        PrimitiveType::String => Ok(Value::String(raw.to_string())),
        PrimitiveType::Integer => {
            let trimmed = raw.trim();
            if let Ok(n) = trimmed.parse::<i64>() {
                Ok(Value::Number(n.into()))
            } else if let Ok(n) = trimmed.parse::<u64>() {
                Ok(Value::Number(n.into()))
            } else {
                Err(format!("`{raw}` is not an integer"))
            }
        }
        PrimitiveType::Number => {
            let n: f64 = raw
                .trim()
                .parse()
                .map_err(|_| format!("`{raw}` is not a number"))?;
            Number::from_f64(n)
                .map(Value::Number)
                .ok_or_else(|| format!("`{raw}` is not a finite number"))
        }
        PrimitiveType::Boolean => match raw.trim().to_ascii_lowercase().as_str() {
            "true" => Ok(Value::Bool(true)),
            "false" => Ok(Value::Bool(false)),
            _ => Err(format!("`{raw}` is not a boolean")),
        },
        PrimitiveType::Array => match serde_json::from_str::<Value>(raw) {
            Ok(value @ Value::Array(_)) => Ok(value),
            Ok(_) => Err(format!("`{raw}` is not a JSON array")),
            Err(e) => Err(format!("`{raw}` is not valid JSON: {e}")),
        },
        PrimitiveType::Object => match serde_json::from_str::<Value>(raw) {
            Ok(value @ Value::Object(_)) => Ok(value),
            Ok(_) => Err(format!("`{raw}` is not a JSON object")),
            Err(e) => Err(format!("`{raw}` is not valid JSON: {e}")),
        },
    }
}
