//! Chat message shape carrying a function call.

use serde::{Deserialize, Serialize};

/// Message role
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    System,
    User,
    Assistant,
    Function,
    Tool,
}

/// Function call requested by the model inside an assistant message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FunctionCall {
    pub name: String,
    /// JSON-encoded arguments, exactly as produced by the model.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub arguments: Option<String>,
}

/// Model message as returned by a chat completion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Msg {
    pub role: MessageRole,
    #[serde(default)]
    pub content: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub function_call: Option<FunctionCall>,
}

impl Msg {
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            role: MessageRole::User,
            content: Some(text.into()),
            name: None,
            function_call: None,
        }
    }

    pub fn assistant(text: impl Into<String>) -> Self {
        Self {
            role: MessageRole::Assistant,
            content: Some(text.into()),
            name: None,
            function_call: None,
        }
    }

    /// Assistant message asking for `name` to be called with `arguments`.
    pub fn function_call(name: impl Into<String>, arguments: impl Into<String>) -> Self {
        Self {
            role: MessageRole::Assistant,
            content: None,
            name: None,
            function_call: Some(FunctionCall {
                name: name.into(),
                arguments: Some(arguments.into()),
            }),
        }
    }

    /// The `function_call.arguments` string, if present and non-empty.
    pub fn function_arguments(&self) -> Option<&str> {
        self.function_call
            .as_ref()
            .and_then(|call| call.arguments.as_deref())
            .filter(|args| !args.is_empty())
    }
}
