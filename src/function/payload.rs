//! Call payloads accepted by a descriptor.

use crate::types::message::Msg;

/// Arguments for one call: either the raw arguments string, or a model
/// message whose `function_call.arguments` carries it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FunctionInput {
    Raw(String),
    Message(Msg),
}

impl FunctionInput {
    pub fn raw(text: impl Into<String>) -> Self {
        FunctionInput::Raw(text.into())
    }
}

impl From<&str> for FunctionInput {
    fn from(text: &str) -> Self {
        FunctionInput::Raw(text.to_string())
    }
}

impl From<String> for FunctionInput {
    fn from(text: String) -> Self {
        FunctionInput::Raw(text)
    }
}

impl From<&String> for FunctionInput {
    fn from(text: &String) -> Self {
        FunctionInput::Raw(text.clone())
    }
}

impl From<Msg> for FunctionInput {
    fn from(msg: Msg) -> Self {
        FunctionInput::Message(msg)
    }
}

impl From<&Msg> for FunctionInput {
    fn from(msg: &Msg) -> Self {
        FunctionInput::Message(msg.clone())
    }
}
