//! Function specs: builder input and the serializable wire form.

use serde::{Deserialize, Serialize};

use crate::types::tool::{FunctionDefinition, ToolDefinition};

/// Name, description and input shape handed to
/// [`create_ai_function`](super::create_ai_function).
#[derive(Debug, Clone)]
pub struct AiFunctionSpec<S> {
    pub name: String,
    pub description: Option<String>,
    pub input_schema: S,
}

impl<S> AiFunctionSpec<S> {
    pub fn new(name: impl Into<String>, input_schema: S) -> Self {
        Self {
            name: name.into(),
            description: None,
            input_schema,
        }
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

/// The adapter-facing description of a built function.
///
/// `parameters` is the wire schema, converted once when the descriptor is
/// built.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FunctionSpec {
    pub name: String,
    pub description: String,
    pub parameters: serde_json::Value,
}

impl FunctionSpec {
    /// OpenAI-style `tools` entry for this function.
    pub fn to_tool_definition(&self) -> ToolDefinition {
        ToolDefinition::function(FunctionDefinition {
            name: self.name.clone(),
            description: if self.description.is_empty() {
                None
            } else {
                Some(self.description.clone())
            },
            parameters: Some(self.parameters.clone()),
        })
    }
}
