//! Small helpers for adapters.

use serde_json::Value;

/// Render a function result for frameworks that only accept strings.
///
/// Strings pass through untouched, `null` becomes an empty string and
/// everything else is compact JSON.
pub fn stringify_for_model(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}
