//! Structured input support.
//!
//! Everything needed to turn a model-produced arguments string into a
//! validated value, and to describe the expected shape back to the model:
//! - [`parse_json_payload`]: raw text (bare or fenced) to JSON
//! - [`SchemaValidator`]: compiled JSON Schema validation with JSON-pointer errors
//! - [`json_schema_from_type`], [`SchemaGenerator`]: input schema construction
//! - [`to_wire_schema`]: schema normalization for tool definitions
//!
//! # Examples
//!
//! ```
//! use ai_fn_rust::structured::{parse_json_payload, SchemaValidator};
//! use ai_fn_rust::ParseConfig;
//! use serde_json::json;
//!
//! let schema = json!({
//!     "type": "object",
//!     "properties": {"name": {"type": "string"}},
//!     "required": ["name"]
//! });
//! let validator = SchemaValidator::compile(schema, false).unwrap();
//!
//! let value = parse_json_payload(r#"{"name": "Alice"}"#, &ParseConfig::default()).unwrap();
//! assert!(validator.validate(&value).is_ok());
//! ```

pub mod error;
pub mod parse;
pub mod schema;
pub mod validator;

pub use error::ValidationError;
pub use parse::parse_json_payload;
pub use schema::{is_object_schema, json_schema_from_type, to_wire_schema, SchemaGenerator};
pub use validator::SchemaValidator;
