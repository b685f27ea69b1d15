//! Lenient field deserializers for LLM-produced records.
//!
//! Models are sloppy with types: numbers where strings belong, a bare string
//! where a list belongs, `null` for empty lists. These helpers accept those
//! shapes, trim whitespace, and reject only values that cannot be read at all
//! (an object where a string belongs, for instance).

use serde::de::Error as _;
use serde::{Deserialize, Deserializer};
use serde_json::Value;

/// Optional string; numbers and booleans are stringified, whitespace trimmed.
pub fn opt_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    match value {
        None | Some(Value::Null) => Ok(None),
        Some(scalar) => scalar_to_string(&scalar)
            .map(Some)
            .ok_or_else(|| D::Error::custom(format!("expected a string, found {}", kind(&scalar)))),
    }
}

/// List of strings; `null` is empty, a single scalar becomes a one-item list,
/// null items and blank strings are dropped.
pub fn string_list<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    let items = match value {
        None | Some(Value::Null) => return Ok(Vec::new()),
        Some(Value::Array(items)) => items,
        Some(other) => vec![other],
    };

    let mut out = Vec::with_capacity(items.len());
    for item in items {
        if item.is_null() {
            continue;
        }
        let text = scalar_to_string(&item).ok_or_else(|| {
            D::Error::custom(format!("expected a list of strings, found {}", kind(&item)))
        })?;
        if !text.is_empty() {
            out.push(text);
        }
    }
    Ok(out)
}

/// Optional whole number; accepts numbers and strings with a leading number
/// ("5+ years" reads as 5). Unreadable strings become `None`.
pub fn opt_years<'de, D>(deserializer: D) -> Result<Option<u32>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    match value {
        None | Some(Value::Null) => Ok(None),
        Some(Value::Number(n)) => Ok(n
            .as_u64()
            .or_else(|| n.as_f64().filter(|f| *f >= 0.0).map(|f| f.floor() as u64))
            .and_then(|n| u32::try_from(n).ok())),
        Some(Value::String(s)) => Ok(leading_number(&s)),
        Some(other) => Err(D::Error::custom(format!(
            "expected a number of years, found {}",
            kind(&other)
        ))),
    }
}

fn leading_number(s: &str) -> Option<u32> {
    let digits: String = s
        .trim()
        .chars()
        .skip_while(|c| !c.is_ascii_digit())
        .take_while(|c| c.is_ascii_digit())
        .collect();
    digits.parse().ok()
}

fn scalar_to_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.trim().to_string()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

fn kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
