//! JSON Schema validator for function input.
//!
//! Wraps a compiled Draft 7 schema and reports every failure with its JSON
//! pointer, so a model can be told exactly which argument was wrong.

use crate::structured::error::ValidationError;
use jsonschema::{Draft, JSONSchema};
use serde_json::Value;
use std::fmt;

/// Compiled JSON Schema used to validate parsed payloads.
pub struct SchemaValidator {
    schema: Value,
    compiled: JSONSchema,
}

impl SchemaValidator {
    /// Compile `schema`. When `strict` is set, object schemas that do not
    /// declare `additionalProperties` are closed first.
    pub fn compile(schema: Value, strict: bool) -> Result<Self, String> {
        let mut schema = schema;
        if strict {
            close_object_schemas(&mut schema);
        }

        let compiled = JSONSchema::options()
            .with_draft(Draft::Draft7)
            .compile(&schema)
            .map_err(|e| format!("Failed to compile schema: {}", e))?;

        Ok(Self { schema, compiled })
    }

    /// The schema actually enforced (after strict adjustments).
    pub fn schema(&self) -> &Value {
        &self.schema
    }

    pub fn is_valid(&self, data: &Value) -> bool {
        self.compiled.is_valid(data)
    }

    /// Validate `data`, collecting every failure.
    pub fn validate(&self, data: &Value) -> Result<(), Vec<ValidationError>> {
        match self.compiled.validate(data) {
            Ok(()) => Ok(()),
            Err(errors) => Err(errors
                .map(|e| ValidationError::with_path(e.to_string(), e.instance_path.to_string()))
                .collect()),
        }
    }
}

impl fmt::Debug for SchemaValidator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SchemaValidator")
            .field("schema", &self.schema)
            .finish_non_exhaustive()
    }
}

fn close_object_schemas(schema: &mut Value) {
    let Some(map) = schema.as_object_mut() else {
        return;
    };

    let is_object = match map.get("type") {
        Some(Value::String(t)) => t == "object",
        Some(Value::Array(types)) => types.iter().any(|t| t == "object"),
        _ => map.contains_key("properties"),
    };
    if is_object && !map.contains_key("additionalProperties") {
        map.insert("additionalProperties".into(), Value::Bool(false));
    }

    for key in ["properties", "definitions", "$defs"] {
        if let Some(Value::Object(children)) = map.get_mut(key) {
            for child in children.values_mut() {
                close_object_schemas(child);
            }
        }
    }
    if let Some(items) = map.get_mut("items") {
        close_object_schemas(items);
    }
    for key in ["anyOf", "oneOf", "allOf"] {
        if let Some(Value::Array(variants)) = map.get_mut(key) {
            for variant in variants {
                close_object_schemas(variant);
            }
        }
    }
}
