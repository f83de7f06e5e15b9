//! Building invocable function descriptors.

use std::fmt;
use std::future::Future;
use std::sync::Arc;

use futures::future::{self, BoxFuture, FutureExt};
use serde::Serialize;
use serde_json::Value;

use super::input::{DynInputSchema, InputSchema, ParsedInput};
use super::payload::FunctionInput;
use super::spec::{AiFunctionSpec, FunctionSpec};
use crate::error::{BoxError, Error, ErrorContext};
use crate::structured::is_object_schema;
use crate::types::tool::ToolDefinition;
use crate::Result;

/// Implementation after type erasure: parsed input in, JSON result out.
pub(crate) type ErasedImplementation =
    Arc<dyn Fn(ParsedInput) -> BoxFuture<'static, Result<Value>> + Send + Sync>;

/// A structured-input function: spec, cached wire schema, input shape and
/// implementation.
///
/// Cloning is cheap and yields the same descriptor (see [`AiFunction::ptr_eq`]).
#[derive(Clone)]
pub struct AiFunction {
    inner: Arc<AiFunctionInner>,
}

struct AiFunctionInner {
    spec: FunctionSpec,
    input_schema: Arc<dyn DynInputSchema>,
    implementation: ErasedImplementation,
}

/// Build a descriptor around an async implementation.
///
/// Fails when `spec.name` is blank or the input shape does not describe a
/// JSON object. The wire schema is converted here, once.
///
/// ```
/// use ai_fn_rust::{create_ai_function, AiFunctionSpec, TypedInput};
/// use serde::Deserialize;
///
/// #[derive(Deserialize, schemars::JsonSchema)]
/// struct AddArgs { a: i64, b: i64 }
///
/// # tokio_test::block_on(async {
/// let add = create_ai_function(
///     AiFunctionSpec::new("add", TypedInput::<AddArgs>::new()?).description("Add two numbers"),
///     |args: AddArgs| async move { Ok::<_, std::convert::Infallible>(args.a + args.b) },
/// )?;
///
/// assert_eq!(add.call(r#"{"a": 2, "b": 3}"#).await?, 5);
/// # Ok::<_, ai_fn_rust::Error>(())
/// # }).unwrap();
/// ```
pub fn create_ai_function<S, F, Fut, R, E>(
    spec: AiFunctionSpec<S>,
    implementation: F,
) -> Result<AiFunction>
where
    S: InputSchema,
    F: Fn(S::Output) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = std::result::Result<R, E>> + Send + 'static,
    R: Serialize + Send + 'static,
    E: Into<BoxError> + Send + 'static,
{
    let erased = erase_implementation::<S::Output, _, _, _, _>(spec.name.clone(), implementation);
    AiFunction::from_parts(spec, erased)
}

/// Build a descriptor around a synchronous implementation.
pub fn create_ai_function_sync<S, F, R, E>(
    spec: AiFunctionSpec<S>,
    implementation: F,
) -> Result<AiFunction>
where
    S: InputSchema,
    F: Fn(S::Output) -> std::result::Result<R, E> + Send + Sync + 'static,
    R: Serialize + Send + 'static,
    E: Into<BoxError> + Send + 'static,
{
    create_ai_function(spec, move |input| future::ready(implementation(input)))
}

fn erase_implementation<I, F, Fut, R, E>(function: String, implementation: F) -> ErasedImplementation
where
    I: Send + 'static,
    F: Fn(I) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = std::result::Result<R, E>> + Send + 'static,
    R: Serialize + Send + 'static,
    E: Into<BoxError> + Send + 'static,
{
    Arc::new(move |input: ParsedInput| match input.downcast::<I>() {
        Ok(value) => complete(implementation(value)),
        Err(_) => mismatch::<I>(&function),
    })
}

/// Await an implementation future and serialize its output.
pub(crate) fn complete<Fut, R, E>(pending: Fut) -> BoxFuture<'static, Result<Value>>
where
    Fut: Future<Output = std::result::Result<R, E>> + Send + 'static,
    R: Serialize + Send + 'static,
    E: Into<BoxError> + Send + 'static,
{
    async move {
        let output = pending.await.map_err(Error::implementation)?;
        Ok(serde_json::to_value(output)?)
    }
    .boxed()
}

pub(crate) fn mismatch<I>(function: &str) -> BoxFuture<'static, Result<Value>> {
    future::ready(Err(Error::TypeMismatch {
        function: function.to_string(),
        expected: std::any::type_name::<I>(),
    }))
    .boxed()
}

impl AiFunction {
    pub(crate) fn from_parts<S: InputSchema>(
        spec: AiFunctionSpec<S>,
        implementation: ErasedImplementation,
    ) -> Result<Self> {
        if spec.name.trim().is_empty() {
            return Err(Error::construction(
                "spec.name",
                "missing required \"spec.name\"",
            ));
        }

        let parameters = spec.input_schema.to_wire_schema();
        if !is_object_schema(&parameters) {
            let found = parameters
                .get("type")
                .map(|t| t.to_string())
                .unwrap_or_else(|| "no \"type\"".to_string());
            return Err(Error::construction_with_context(
                format!(
                    "\"spec.input_schema\" for function \"{}\" must describe a JSON object",
                    spec.name
                ),
                ErrorContext::new()
                    .with_field_path("spec.input_schema")
                    .with_details(format!("found {}", found))
                    .with_source("create_ai_function"),
            ));
        }

        let description = spec
            .description
            .as_deref()
            .map(str::trim)
            .unwrap_or_default()
            .to_string();

        let properties = parameters
            .get("properties")
            .and_then(Value::as_object)
            .map(|p| p.len())
            .unwrap_or(0);
        tracing::debug!(function = %spec.name, properties, "built AI function");

        Ok(Self {
            inner: Arc::new(AiFunctionInner {
                spec: FunctionSpec {
                    name: spec.name,
                    description,
                    parameters,
                },
                input_schema: Arc::new(spec.input_schema),
                implementation,
            }),
        })
    }

    pub fn name(&self) -> &str {
        &self.inner.spec.name
    }

    pub fn description(&self) -> &str {
        &self.inner.spec.description
    }

    pub fn spec(&self) -> &FunctionSpec {
        &self.inner.spec
    }

    /// Wire schema computed when the descriptor was built.
    pub fn wire_schema(&self) -> &Value {
        &self.inner.spec.parameters
    }

    /// The original input shape, for adapters that validate natively.
    pub fn input_schema(&self) -> &dyn DynInputSchema {
        self.inner.input_schema.as_ref()
    }

    /// The original input shape as its concrete type.
    pub fn input_schema_as<T: 'static>(&self) -> Option<&T> {
        let any = self.inner.input_schema.as_any();
        any.downcast_ref::<T>()
            .or_else(|| any.downcast_ref::<Arc<T>>().map(|shared| shared.as_ref()))
    }

    pub fn to_tool_definition(&self) -> ToolDefinition {
        self.inner.spec.to_tool_definition()
    }

    /// Validate a payload without calling the implementation.
    pub fn parse_input(&self, input: &FunctionInput) -> Result<ParsedInput> {
        let raw = match input {
            FunctionInput::Raw(text) => text.as_str(),
            FunctionInput::Message(msg) => {
                msg.function_arguments()
                    .ok_or_else(|| Error::MissingArguments {
                        function: self.name().to_string(),
                    })?
            }
        };

        self.inner.input_schema.validate_raw(raw).map_err(|errors| {
            tracing::debug!(
                function = %self.name(),
                errors = errors.len(),
                "input validation failed"
            );
            Error::Validation {
                function: self.name().to_string(),
                errors,
            }
        })
    }

    /// [`parse_input`](Self::parse_input) downcast to the shape's output type.
    pub fn parse_input_as<T: 'static>(&self, input: &FunctionInput) -> Result<T> {
        self.parse_input(input)?
            .downcast::<T>()
            .map_err(|_| Error::TypeMismatch {
                function: self.name().to_string(),
                expected: std::any::type_name::<T>(),
            })
    }

    /// Parse `input`, then run the implementation on the parsed value.
    pub async fn call(&self, input: impl Into<FunctionInput>) -> Result<Value> {
        let input = input.into();
        let parsed = self.parse_input(&input)?;
        self.call_parsed(parsed).await
    }

    /// Run the implementation on an already-parsed value, skipping validation.
    pub fn call_parsed(&self, input: ParsedInput) -> BoxFuture<'static, Result<Value>> {
        (self.inner.implementation)(input)
    }

    /// Whether both handles refer to the same descriptor.
    pub fn ptr_eq(a: &AiFunction, b: &AiFunction) -> bool {
        Arc::ptr_eq(&a.inner, &b.inner)
    }
}

impl fmt::Debug for AiFunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AiFunction")
            .field("name", &self.inner.spec.name)
            .field("description", &self.inner.spec.description)
            .field("parameters", &self.inner.spec.parameters)
            .finish_non_exhaustive()
    }
}
