//! Parsing configuration for structured function input.
//!
//! Defaults can be taken from the environment with [`ParseConfig::from_env`]:
//! - `AI_FN_STRICT_INPUT` (`1`/`true` to reject unknown object properties)
//! - `AI_FN_EXTRACT_FENCED_JSON` (`0`/`false` to require bare JSON)
//! - `AI_FN_MAX_INPUT_BYTES` (upper bound on raw payload size)

use serde::{Deserialize, Serialize};

/// Knobs applied when a raw payload is turned into a validated input value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ParseConfig {
    /// Reject properties not declared by an object schema unless the schema
    /// sets `additionalProperties` itself.
    pub strict: bool,
    /// Fall back to extracting JSON from markdown code fences.
    pub extract_fenced_json: bool,
    /// Maximum raw payload size in bytes.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_input_bytes: Option<usize>,
}

impl Default for ParseConfig {
    fn default() -> Self {
        Self {
            strict: false,
            extract_fenced_json: true,
            max_input_bytes: None,
        }
    }
}

impl ParseConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Defaults overridden by `AI_FN_*` environment variables.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        let strict = std::env::var("AI_FN_STRICT_INPUT")
            .ok()
            .and_then(|s| parse_flag(&s))
            .unwrap_or(defaults.strict);
        let extract_fenced_json = std::env::var("AI_FN_EXTRACT_FENCED_JSON")
            .ok()
            .and_then(|s| parse_flag(&s))
            .unwrap_or(defaults.extract_fenced_json);
        let max_input_bytes = std::env::var("AI_FN_MAX_INPUT_BYTES")
            .ok()
            .and_then(|s| s.trim().parse::<usize>().ok())
            .filter(|n| *n > 0)
            .or(defaults.max_input_bytes);

        Self {
            strict,
            extract_fenced_json,
            max_input_bytes,
        }
    }

    pub fn strict(mut self, enable: bool) -> Self {
        self.strict = enable;
        self
    }

    pub fn extract_fenced_json(mut self, enable: bool) -> Self {
        self.extract_fenced_json = enable;
        self
    }

    pub fn max_input_bytes(mut self, limit: usize) -> Self {
        self.max_input_bytes = Some(limit.max(1));
        self
    }
}

fn parse_flag(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
