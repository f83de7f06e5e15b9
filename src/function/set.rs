//! Ordered, name-keyed collections of AI functions.

use std::fmt;
use std::sync::Arc;

use indexmap::map::{Entry, IntoValues, Values};
use indexmap::{IndexMap, IndexSet};
use serde_json::Value;

use super::descriptor::AiFunction;
use super::payload::FunctionInput;
use super::spec::FunctionSpec;
use crate::error::Error;
use crate::provider::AiFunctionsProvider;
use crate::types::tool::{ToolCall, ToolDefinition, ToolResult};
use crate::Result;

/// Anything a set can be built from: a single function or a whole set to
/// flatten in. Providers join through [`AiFunctionSet::from_provider`].
#[derive(Debug, Clone)]
pub enum AiFunctionLike {
    Function(AiFunction),
    Set(AiFunctionSet),
}

impl From<AiFunction> for AiFunctionLike {
    fn from(function: AiFunction) -> Self {
        AiFunctionLike::Function(function)
    }
}

impl From<&AiFunction> for AiFunctionLike {
    fn from(function: &AiFunction) -> Self {
        AiFunctionLike::Function(function.clone())
    }
}

impl From<AiFunctionSet> for AiFunctionLike {
    fn from(set: AiFunctionSet) -> Self {
        AiFunctionLike::Set(set)
    }
}

impl From<&AiFunctionSet> for AiFunctionLike {
    fn from(set: &AiFunctionSet) -> Self {
        AiFunctionLike::Set(set.clone())
    }
}

/// An immutable, insertion-ordered set of functions with unique names.
///
/// Derived sets (`pick`, `omit`, `merge`) are new sets. Descriptors are
/// immutable, so they are shared between sets rather than copied.
#[derive(Clone, Default)]
pub struct AiFunctionSet {
    functions: IndexMap<String, AiFunction>,
}

impl AiFunctionSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a set from functions and sets, flattened in order.
    ///
    /// Fails with [`Error::DuplicateName`] on the first name seen twice.
    pub fn try_new<I>(items: I) -> Result<Self>
    where
        I: IntoIterator,
        I::Item: Into<AiFunctionLike>,
    {
        let mut set = Self::new();
        for item in items {
            match item.into() {
                AiFunctionLike::Function(function) => set.insert(function)?,
                AiFunctionLike::Set(other) => {
                    for function in other.functions.into_values() {
                        set.insert(function)?;
                    }
                }
            }
        }
        Ok(set)
    }

    /// A set holding `provider`'s functions, for composing with others.
    ///
    /// Materializes the provider's own set on first use; the result shares
    /// its descriptors.
    pub fn from_provider<P: AiFunctionsProvider>(provider: &Arc<P>) -> Result<Self> {
        provider.functions().cloned()
    }

    fn insert(&mut self, function: AiFunction) -> Result<()> {
        match self.functions.entry(function.name().to_string()) {
            Entry::Occupied(entry) => {
                tracing::debug!(function = %entry.key(), "duplicate function name");
                Err(Error::DuplicateName {
                    name: entry.key().clone(),
                })
            }
            Entry::Vacant(entry) => {
                entry.insert(function);
                Ok(())
            }
        }
    }

    /// A new set with this set's functions followed by `other`'s.
    pub fn merge(&self, other: impl Into<AiFunctionLike>) -> Result<Self> {
        let mut merged = self.clone();
        match other.into() {
            AiFunctionLike::Function(function) => merged.insert(function)?,
            AiFunctionLike::Set(set) => {
                for function in set.functions.into_values() {
                    merged.insert(function)?;
                }
            }
        }
        Ok(merged)
    }

    pub fn get(&self, name: &str) -> Option<&AiFunction> {
        self.functions.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.functions.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.functions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.functions.is_empty()
    }

    /// Functions in insertion order. Restartable: every call starts over.
    pub fn iter(&self) -> Values<'_, String, AiFunction> {
        self.functions.values()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> + '_ {
        self.functions.keys().map(String::as_str)
    }

    pub fn to_vec(&self) -> Vec<AiFunction> {
        self.functions.values().cloned().collect()
    }

    /// A new set holding only `names`, in the order requested.
    ///
    /// Unknown names fail with [`Error::UnknownFunction`]; repeated names are
    /// kept once.
    pub fn pick<I>(&self, names: I) -> Result<Self>
    where
        I: IntoIterator,
        I::Item: AsRef<str>,
    {
        let mut picked = IndexMap::new();
        for name in names {
            let name = name.as_ref();
            let function = self.get(name).ok_or_else(|| Error::UnknownFunction {
                name: name.to_string(),
            })?;
            picked
                .entry(name.to_string())
                .or_insert_with(|| function.clone());
        }
        Ok(Self { functions: picked })
    }

    /// A new set without `names`. Names not in the set are ignored.
    pub fn omit<I>(&self, names: I) -> Self
    where
        I: IntoIterator,
        I::Item: AsRef<str>,
    {
        let excluded: IndexSet<String> = names
            .into_iter()
            .map(|name| name.as_ref().to_string())
            .collect();
        let functions = self
            .functions
            .iter()
            .filter(|(name, _)| !excluded.contains(name.as_str()))
            .map(|(name, function)| (name.clone(), function.clone()))
            .collect();
        Self { functions }
    }

    pub fn specs(&self) -> Vec<&FunctionSpec> {
        self.iter().map(AiFunction::spec).collect()
    }

    /// OpenAI-style `tools` array, in insertion order.
    pub fn tool_definitions(&self) -> Vec<ToolDefinition> {
        self.iter().map(AiFunction::to_tool_definition).collect()
    }

    /// Parse and call the function registered under `name`.
    pub async fn call(&self, name: &str, input: impl Into<FunctionInput>) -> Result<Value> {
        let function = self.get(name).ok_or_else(|| Error::UnknownFunction {
            name: name.to_string(),
        })?;
        function.call(input).await
    }

    /// Run a model-issued tool call.
    ///
    /// Input problems (unknown tool, bad or missing arguments) come back as
    /// an error [`ToolResult`] for the model to see. Failures raised by the
    /// implementation itself are returned as `Err`.
    pub async fn invoke_tool_call(&self, call: &ToolCall) -> Result<ToolResult> {
        match self.call(&call.name, call.arguments_json()).await {
            Ok(content) => Ok(ToolResult::success(&call.id, content)),
            Err(err) if err.is_input_error() => {
                tracing::warn!(
                    tool = %call.name,
                    tool_call_id = %call.id,
                    error = %err,
                    "tool call rejected"
                );
                Ok(ToolResult::error(&call.id, err.to_string()))
            }
            Err(err) => Err(err),
        }
    }
}

impl TryFrom<Vec<AiFunction>> for AiFunctionSet {
    type Error = Error;

    fn try_from(functions: Vec<AiFunction>) -> Result<Self> {
        Self::try_new(functions)
    }
}

impl<'a> IntoIterator for &'a AiFunctionSet {
    type Item = &'a AiFunction;
    type IntoIter = Values<'a, String, AiFunction>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl IntoIterator for AiFunctionSet {
    type Item = AiFunction;
    type IntoIter = IntoValues<String, AiFunction>;

    fn into_iter(self) -> Self::IntoIter {
        self.functions.into_values()
    }
}

impl fmt::Debug for AiFunctionSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.functions.keys()).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::function::{create_ai_function_sync, AiFunctionSpec, JsonSchemaInput};
    use serde_json::json;
    use std::convert::Infallible;

    fn constant(name: &str, value: i64) -> AiFunction {
        create_ai_function_sync(
            AiFunctionSpec::new(
                name,
                JsonSchemaInput::new(json!({"type": "object", "properties": {}})).unwrap(),
            ),
            move |_: Value| Ok::<_, Infallible>(value),
        )
        .unwrap()
    }

    fn abc() -> AiFunctionSet {
        AiFunctionSet::try_new([constant("a", 1), constant("b", 2), constant("c", 3)]).unwrap()
    }

    #[test]
    fn test_insertion_order_is_stable() {
        let set = abc();
        let first: Vec<_> = set.names().collect();
        let second: Vec<_> = set.iter().map(AiFunction::name).collect();
        assert_eq!(first, ["a", "b", "c"]);
        assert_eq!(first, second);
    }

    #[test]
    fn test_flattens_nested_sets() {
        let set = AiFunctionSet::try_new([
            AiFunctionLike::from(constant("z", 0)),
            AiFunctionLike::from(abc()),
        ])
        .unwrap();
        assert_eq!(set.names().collect::<Vec<_>>(), ["z", "a", "b", "c"]);
    }

    #[test]
    fn test_duplicate_name_rejected() {
        let err = abc().merge(constant("b", 20)).unwrap_err();
        assert!(matches!(err, Error::DuplicateName { ref name } if name == "b"));
    }

    #[test]
    fn test_pick_keeps_requested_order() {
        let picked = abc().pick(["c", "a", "c"]).unwrap();
        assert_eq!(picked.names().collect::<Vec<_>>(), ["c", "a"]);
    }

    #[test]
    fn test_pick_unknown_name() {
        assert!(matches!(
            abc().pick(["a", "nope"]),
            Err(Error::UnknownFunction { ref name }) if name == "nope"
        ));
    }

    #[test]
    fn test_omit_ignores_unknown_names() {
        let set = abc();
        let rest = set.omit(["a", "nope"]);
        assert_eq!(rest.names().collect::<Vec<_>>(), ["b", "c"]);
        assert_eq!(set.len(), 3);
    }

    #[test]
    fn test_tool_definitions() {
        let tools = abc().tool_definitions();
        assert_eq!(tools.len(), 3);
        assert_eq!(tools[1].function.name, "b");
        assert_eq!(
            serde_json::to_value(&tools[0]).unwrap()["type"],
            json!("function")
        );
    }

    #[tokio::test]
    async fn test_call_by_name() {
        let set = abc();
        assert_eq!(set.call("c", "{}").await.unwrap(), json!(3));
        assert!(matches!(
            set.call("d", "{}").await,
            Err(Error::UnknownFunction { .. })
        ));
    }

    #[tokio::test]
    async fn test_invoke_tool_call_reports_input_errors() {
        let set = abc();
        let ok = set
            .invoke_tool_call(&ToolCall::new("call_1", "a", json!({})))
            .await
            .unwrap();
        assert_eq!(ok, ToolResult::success("call_1", json!(1)));

        let missing = set
            .invoke_tool_call(&ToolCall::new("call_2", "missing", json!({})))
            .await
            .unwrap();
        assert!(missing.is_error);
        assert_eq!(missing.tool_use_id, "call_2");
    }
}
