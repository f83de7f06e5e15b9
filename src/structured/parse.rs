//! Raw payload to JSON value.
//!
//! Models often wrap arguments in markdown fences or surround them with
//! prose. Extraction is tried in order: bare JSON, ```` ```json ```` fence,
//! any fence, then the outermost `{...}` span.

use crate::config::ParseConfig;
use crate::structured::error::ValidationError;
use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;

static FENCE_PATTERNS: Lazy<Vec<Regex>> = Lazy::new(|| {
    [
        r"```json\s*([\s\S]*?)\s*```",
        r"```\s*([\s\S]*?)\s*```",
        r"\{[\s\S]*\}",
    ]
    .iter()
    .filter_map(|p| Regex::new(p).ok())
    .collect()
});

/// Parse a raw arguments string into a JSON value.
pub fn parse_json_payload(raw: &str, config: &ParseConfig) -> Result<Value, ValidationError> {
    if let Some(limit) = config.max_input_bytes {
        if raw.len() > limit {
            return Err(ValidationError::without_path(format!(
                "Input too large ({} bytes, maximum {})",
                raw.len(),
                limit
            )));
        }
    }

    let text = raw.trim();
    if text.is_empty() {
        return Err(ValidationError::without_path("Empty input"));
    }

    let direct_err = match serde_json::from_str::<Value>(text) {
        Ok(value) => return Ok(value),
        Err(e) => e,
    };

    if config.extract_fenced_json {
        if let Some(value) = extract_embedded_json(text) {
            return Ok(value);
        }
    }

    Err(ValidationError::without_path(format!(
        "Invalid JSON: {}",
        direct_err
    )))
}

fn extract_embedded_json(text: &str) -> Option<Value> {
    for re in FENCE_PATTERNS.iter() {
        let Some(captures) = re.captures(text) else {
            continue;
        };
        let candidate = match captures.get(1) {
            Some(inner) => inner.as_str(),
            None => captures.get(0).map(|c| c.as_str()).unwrap_or(text),
        };
        if let Ok(value) = serde_json::from_str::<Value>(candidate.trim()) {
            return Some(value);
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_bare_json() {
        let value = parse_json_payload(r#" {"a": 1} "#, &ParseConfig::default()).unwrap();
        assert_eq!(value, json!({"a": 1}));
    }

    #[test]
    fn test_fenced_json() {
        let raw = "Here you go:\n```json\n{\"city\": \"Paris\"}\n```";
        let value = parse_json_payload(raw, &ParseConfig::default()).unwrap();
        assert_eq!(value["city"], "Paris");
    }

    #[test]
    fn test_object_inside_prose() {
        let raw = "arguments: {\"n\": 3} thanks";
        let value = parse_json_payload(raw, &ParseConfig::default()).unwrap();
        assert_eq!(value["n"], 3);
    }

    #[test]
    fn test_fence_extraction_disabled() {
        let config = ParseConfig::default().extract_fenced_json(false);
        let err = parse_json_payload("```json\n{}\n```", &config).unwrap_err();
        assert!(err.message.starts_with("Invalid JSON"));
    }

    #[test]
    fn test_empty_and_oversized() {
        let config = ParseConfig::default().max_input_bytes(4);
        assert_eq!(
            parse_json_payload("   ", &ParseConfig::default())
                .unwrap_err()
                .message,
            "Empty input"
        );
        assert!(parse_json_payload(r#"{"a": 1}"#, &config)
            .unwrap_err()
            .message
            .contains("too large"));
    }
}
