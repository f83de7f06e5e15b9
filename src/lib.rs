//! # ai-fn-rust
//!
//! 结构化输入的 AI 函数：带模式校验、可自描述的 LLM 工具。
//!
//! Structured-input AI functions: schema-validated, self-describing tools for
//! LLM function calling.
//!
//! ## Overview
//!
//! An AI function is a name, a description, an input schema and an
//! implementation. The crate validates model-produced arguments against the
//! schema before the implementation runs, and describes each function as a
//! wire schema that orchestration adapters turn into tool definitions.
//!
//! - [`create_ai_function`] builds a single [`AiFunction`]
//! - [`AiFunctionSet`] groups functions by unique name, in a stable order
//! - [`provider::AiFunctionsProvider`] lets a type declare its methods once
//!   and materialize a bound [`AiFunctionSet`] per instance on first use
//!
//! ## Quick Start
//!
//! ```rust
//! use ai_fn_rust::{create_ai_function, AiFunctionSet, AiFunctionSpec, Msg, TypedInput};
//! use serde::Deserialize;
//!
//! #[derive(Deserialize, schemars::JsonSchema)]
//! struct Weather {
//!     /// City name
//!     city: String,
//! }
//!
//! #[tokio::main]
//! async fn main() -> ai_fn_rust::Result<()> {
//!     let weather = create_ai_function(
//!         AiFunctionSpec::new("get_weather", TypedInput::<Weather>::new()?)
//!             .description("Current weather for a city"),
//!         |args: Weather| async move {
//!             Ok::<_, std::convert::Infallible>(format!("Sunny in {}", args.city))
//!         },
//!     )?;
//!
//!     let functions = AiFunctionSet::try_new([weather])?;
//!     let tools = functions.tool_definitions();
//!     assert_eq!(tools[0].function.name, "get_weather");
//!
//!     let reply = Msg::function_call("get_weather", r#"{"city": "Oslo"}"#);
//!     let result = functions.call("get_weather", reply).await?;
//!     assert_eq!(result, "Sunny in Oslo");
//!     Ok(())
//! }
//! ```
//!
//! ## Module Organization
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`function`] | Function descriptors, input shapes and function sets |
//! | [`provider`] | Per-type declarations, lazily bound per instance |
//! | [`structured`] | JSON payload extraction, schema validation and generation |
//! | [`types`] | Message and tool wire types |
//! | [`config`] | Payload parsing configuration |

pub mod config;
pub mod function;
pub mod provider;
pub mod structured;
pub mod types;
pub mod utils;

// Re-export main types for convenience
pub use config::ParseConfig;
pub use function::{
    create_ai_function, create_ai_function_sync, AiFunction, AiFunctionLike, AiFunctionSet,
    AiFunctionSpec, FunctionInput, FunctionSpec, InputSchema, JsonSchemaInput, TypedInput,
};
pub use provider::{AiFunctionsProvider, Declarations, FunctionDeclaration, FunctionsCache};
pub use types::{
    message::{MessageRole, Msg},
    tool::{ToolCall, ToolDefinition, ToolResult},
};
pub use utils::stringify_for_model;

/// Result type alias for the library
pub type Result<T> = std::result::Result<T, Error>;

/// Error type for the library
pub mod error;
pub use error::{BoxError, Error, ErrorContext};
