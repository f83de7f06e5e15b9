//! Input shapes: what a function accepts and how it is described.
//!
//! An [`InputSchema`] validates a raw arguments string into a typed value and
//! renders itself as a wire schema. Two shapes ship with the crate:
//! [`TypedInput<T>`] derives everything from a Rust type, [`JsonSchemaInput`]
//! wraps a literal JSON Schema and yields `serde_json::Value`.

use std::any::Any;
use std::fmt;
use std::marker::PhantomData;
use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::config::ParseConfig;
use crate::error::Error;
use crate::structured::{
    json_schema_from_type, parse_json_payload, to_wire_schema, SchemaValidator, ValidationError,
};

/// Declarative input shape of a structured-input function.
pub trait InputSchema: Send + Sync + 'static {
    /// Value produced by a successful validation.
    type Output: Send + 'static;

    /// Validate and parse a raw arguments string.
    fn validate(&self, raw: &str) -> Result<Self::Output, Vec<ValidationError>>;

    /// Serializable description of the accepted input.
    fn to_wire_schema(&self) -> Value;
}

impl<S: InputSchema> InputSchema for Arc<S> {
    type Output = S::Output;

    fn validate(&self, raw: &str) -> Result<Self::Output, Vec<ValidationError>> {
        S::validate(self, raw)
    }

    fn to_wire_schema(&self) -> Value {
        S::to_wire_schema(self)
    }
}

/// Type-erased parsed input, as produced by [`DynInputSchema::validate_raw`].
pub struct ParsedInput(Box<dyn Any + Send>);

impl ParsedInput {
    pub fn new<T: Send + 'static>(value: T) -> Self {
        Self(Box::new(value))
    }

    pub fn is<T: 'static>(&self) -> bool {
        self.0.is::<T>()
    }

    pub fn downcast_ref<T: 'static>(&self) -> Option<&T> {
        self.0.downcast_ref::<T>()
    }

    /// Take the value out; gives `self` back when the type does not match.
    pub fn downcast<T: 'static>(self) -> Result<T, Self> {
        match self.0.downcast::<T>() {
            Ok(value) => Ok(*value),
            Err(inner) => Err(Self(inner)),
        }
    }
}

impl fmt::Debug for ParsedInput {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ParsedInput").finish_non_exhaustive()
    }
}

/// Object-safe view of an [`InputSchema`], stored on every descriptor.
pub trait DynInputSchema: Send + Sync {
    fn validate_raw(&self, raw: &str) -> Result<ParsedInput, Vec<ValidationError>>;

    fn wire_schema(&self) -> Value;

    /// Rust type name of the parsed value.
    fn output_type_name(&self) -> &'static str;

    fn as_any(&self) -> &dyn Any;
}

impl<S: InputSchema> DynInputSchema for S {
    fn validate_raw(&self, raw: &str) -> Result<ParsedInput, Vec<ValidationError>> {
        InputSchema::validate(self, raw).map(ParsedInput::new)
    }

    fn wire_schema(&self) -> Value {
        InputSchema::to_wire_schema(self)
    }

    fn output_type_name(&self) -> &'static str {
        std::any::type_name::<S::Output>()
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// Input shape backed by a literal JSON Schema document.
#[derive(Debug)]
pub struct JsonSchemaInput {
    validator: SchemaValidator,
    config: ParseConfig,
}

impl JsonSchemaInput {
    pub fn new(schema: Value) -> crate::Result<Self> {
        Self::with_config(schema, ParseConfig::default())
    }

    pub fn with_config(schema: Value, config: ParseConfig) -> crate::Result<Self> {
        let validator = SchemaValidator::compile(schema, config.strict)
            .map_err(|e| Error::construction("spec.input_schema", e))?;
        Ok(Self { validator, config })
    }

    /// The schema enforced by this shape.
    pub fn schema(&self) -> &Value {
        self.validator.schema()
    }

    pub fn config(&self) -> &ParseConfig {
        &self.config
    }
}

impl InputSchema for JsonSchemaInput {
    type Output = Value;

    fn validate(&self, raw: &str) -> Result<Value, Vec<ValidationError>> {
        let value = parse_json_payload(raw, &self.config).map_err(|e| vec![e])?;
        self.validator.validate(&value)?;
        Ok(value)
    }

    fn to_wire_schema(&self) -> Value {
        to_wire_schema(self.validator.schema())
    }
}

/// Input shape derived from a Rust type.
///
/// The JSON Schema comes from `schemars`; validation runs the schema first
/// (for pointer-located messages) and then deserializes into `T`.
pub struct TypedInput<T> {
    validator: SchemaValidator,
    config: ParseConfig,
    _marker: PhantomData<fn() -> T>,
}

impl<T> TypedInput<T>
where
    T: DeserializeOwned + schemars::JsonSchema + Send + 'static,
{
    pub fn new() -> crate::Result<Self> {
        Self::with_config(ParseConfig::default())
    }

    pub fn with_config(config: ParseConfig) -> crate::Result<Self> {
        let validator = SchemaValidator::compile(json_schema_from_type::<T>(), config.strict)
            .map_err(|e| {
                Error::construction(
                    "spec.input_schema",
                    format!("{} for {}", e, std::any::type_name::<T>()),
                )
            })?;
        Ok(Self {
            validator,
            config,
            _marker: PhantomData,
        })
    }

    pub fn schema(&self) -> &Value {
        self.validator.schema()
    }
}

impl<T> InputSchema for TypedInput<T>
where
    T: DeserializeOwned + schemars::JsonSchema + Send + 'static,
{
    type Output = T;

    fn validate(&self, raw: &str) -> Result<T, Vec<ValidationError>> {
        let value = parse_json_payload(raw, &self.config).map_err(|e| vec![e])?;
        self.validator.validate(&value)?;
        serde_json::from_value(value)
            .map_err(|e| vec![ValidationError::without_path(e.to_string())])
    }

    fn to_wire_schema(&self) -> Value {
        to_wire_schema(self.validator.schema())
    }
}

impl<T> fmt::Debug for TypedInput<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TypedInput")
            .field("type", &std::any::type_name::<T>())
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;
    use serde_json::json;

    #[derive(Debug, PartialEq, Deserialize, schemars::JsonSchema)]
    struct AddArgs {
        a: i64,
        b: i64,
    }

    #[test]
    fn test_typed_input_parses() {
        let input = TypedInput::<AddArgs>::new().unwrap();
        assert_eq!(
            input.validate(r#"{"a": 1, "b": 2}"#).unwrap(),
            AddArgs { a: 1, b: 2 }
        );
    }

    #[test]
    fn test_typed_input_reports_schema_errors() {
        let input = TypedInput::<AddArgs>::new().unwrap();
        let errors = input.validate(r#"{"a": "one", "b": 2}"#).unwrap_err();
        assert_eq!(errors[0].path.as_deref(), Some("/a"));
    }

    #[test]
    fn test_typed_input_wire_schema() {
        let wire = TypedInput::<AddArgs>::new().unwrap().to_wire_schema();
        assert_eq!(wire["type"], "object");
        assert!(wire.get("$schema").is_none());
        assert_eq!(wire["properties"]["a"]["type"], "integer");
    }

    #[test]
    fn test_json_schema_input_strict() {
        let schema = json!({"type": "object", "properties": {"q": {"type": "string"}}});
        let lenient = JsonSchemaInput::new(schema.clone()).unwrap();
        let strict =
            JsonSchemaInput::with_config(schema, ParseConfig::default().strict(true)).unwrap();

        assert!(lenient.validate(r#"{"q": "x", "extra": 1}"#).is_ok());
        assert!(strict.validate(r#"{"q": "x", "extra": 1}"#).is_err());
    }

    #[test]
    fn test_json_schema_input_rejects_bad_schema() {
        let err = JsonSchemaInput::new(json!({"type": 5})).unwrap_err();
        assert!(err.to_string().contains("spec.input_schema"));
    }

    #[test]
    fn test_parsed_input_downcast() {
        let parsed = TypedInput::<AddArgs>::new()
            .unwrap()
            .validate_raw(r#"{"a": 3, "b": 4}"#)
            .unwrap();
        assert!(parsed.is::<AddArgs>());
        let parsed = parsed.downcast::<String>().unwrap_err();
        assert_eq!(parsed.downcast::<AddArgs>().unwrap(), AddArgs { a: 3, b: 4 });
    }
}
