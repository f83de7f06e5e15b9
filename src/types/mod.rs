//! Wire types shared with orchestration layers.
//!
//! | Type | Description |
//! |------|-------------|
//! | [`Msg`] | Model message that may carry a `function_call` |
//! | [`ToolDefinition`] | Tool entry presented to a model |
//! | [`ToolCall`] | Tool invocation requested by a model |
//! | [`ToolResult`] | Outcome reported back for a tool call |

pub mod message;
pub mod tool;

pub use message::{FunctionCall, MessageRole, Msg};
pub use tool::{FunctionDefinition, ToolCall, ToolDefinition, ToolResult};
