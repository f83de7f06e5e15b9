//! Per-type function declarations, materialized lazily per instance.
//!
//! A provider type lists its functions once, in a static [`Declarations`]
//! table. The first call to [`AiFunctionsProvider::functions`] on an instance
//! binds every declaration to that instance and caches the resulting
//! [`AiFunctionSet`]; later calls return the cached set.
//!
//! ```
//! use std::sync::Arc;
//! use ai_fn_rust::provider::{AiFunctionsProvider, Declarations, FunctionDeclaration, FunctionsCache};
//! use once_cell::sync::Lazy;
//! use serde::Deserialize;
//!
//! #[derive(Deserialize, schemars::JsonSchema)]
//! struct Greeting { name: String }
//!
//! #[derive(Default)]
//! struct Greeter { cache: FunctionsCache }
//!
//! impl AiFunctionsProvider for Greeter {
//!     fn declarations() -> &'static Declarations<Self> {
//!         static DECLARATIONS: Lazy<Declarations<Greeter>> = Lazy::new(|| {
//!             Declarations::new().declare(
//!                 FunctionDeclaration::typed_sync("greet", |_: Arc<Greeter>, g: Greeting| {
//!                     Ok::<_, std::convert::Infallible>(format!("Hello, {}!", g.name))
//!                 })
//!                 .description("Greet someone by name"),
//!             )
//!         });
//!         &DECLARATIONS
//!     }
//!
//!     fn functions_cache(&self) -> &FunctionsCache {
//!         &self.cache
//!     }
//! }
//!
//! # tokio_test::block_on(async {
//! let greeter = Arc::new(Greeter::default());
//! let functions = greeter.functions()?;
//! assert_eq!(functions.call("greet", r#"{"name": "Ada"}"#).await?, "Hello, Ada!");
//! # Ok::<_, ai_fn_rust::Error>(())
//! # }).unwrap();
//! ```

use std::collections::HashSet;
use std::fmt;
use std::future::Future;
use std::sync::{Arc, Weak};

use futures::future::{self, FutureExt};
use once_cell::sync::OnceCell;
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::error::{BoxError, Error, ErrorContext};
use crate::function::{
    complete, mismatch, AiFunction, AiFunctionSet, AiFunctionSpec, ErasedImplementation,
    InputSchema, ParsedInput, TypedInput,
};
use crate::Result;

/// A type whose methods are exposed as AI functions.
pub trait AiFunctionsProvider: Send + Sync + Sized + 'static {
    /// The type's declarations, normally a `Lazy` static.
    fn declarations() -> &'static Declarations<Self>;

    /// Per-instance storage for the materialized set.
    fn functions_cache(&self) -> &FunctionsCache;

    /// The instance's function set, built on first access.
    fn functions(self: &Arc<Self>) -> Result<&AiFunctionSet> {
        self.functions_cache().get_or_materialize(self)
    }
}

type Binder<P> =
    Box<dyn Fn(&str, Option<&str>, &Weak<P>) -> Result<AiFunction> + Send + Sync>;

/// One declared method: spec fields plus how to bind it to an instance.
pub struct FunctionDeclaration<P> {
    name: String,
    method: &'static str,
    description: Option<String>,
    bind: Binder<P>,
}

impl<P: AiFunctionsProvider> FunctionDeclaration<P> {
    /// Declare an async method. The function is named after `method` unless
    /// renamed with [`name`](Self::name).
    pub fn new<S, F, Fut, R, E>(method: &'static str, input_schema: S, implementation: F) -> Self
    where
        S: InputSchema,
        F: Fn(Arc<P>, S::Output) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = std::result::Result<R, E>> + Send + 'static,
        R: Serialize + Send + 'static,
        E: Into<BoxError> + Send + 'static,
    {
        Self::with_schema(method, Ok(input_schema), implementation)
    }

    pub fn new_sync<S, F, R, E>(method: &'static str, input_schema: S, implementation: F) -> Self
    where
        S: InputSchema,
        F: Fn(Arc<P>, S::Output) -> std::result::Result<R, E> + Send + Sync + 'static,
        R: Serialize + Send + 'static,
        E: Into<BoxError> + Send + 'static,
    {
        Self::new(method, input_schema, move |provider, input| {
            future::ready(implementation(provider, input))
        })
    }

    /// Declare an async method taking a typed argument struct.
    ///
    /// A schema that cannot be derived for `T` surfaces when the set is
    /// materialized.
    pub fn typed<T, F, Fut, R, E>(method: &'static str, implementation: F) -> Self
    where
        T: DeserializeOwned + schemars::JsonSchema + Send + 'static,
        F: Fn(Arc<P>, T) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = std::result::Result<R, E>> + Send + 'static,
        R: Serialize + Send + 'static,
        E: Into<BoxError> + Send + 'static,
    {
        let schema = TypedInput::<T>::new().map_err(|e| e.to_string());
        Self::with_schema(method, schema, implementation)
    }

    pub fn typed_sync<T, F, R, E>(method: &'static str, implementation: F) -> Self
    where
        T: DeserializeOwned + schemars::JsonSchema + Send + 'static,
        F: Fn(Arc<P>, T) -> std::result::Result<R, E> + Send + Sync + 'static,
        R: Serialize + Send + 'static,
        E: Into<BoxError> + Send + 'static,
    {
        Self::typed(method, move |provider, input: T| {
            future::ready(implementation(provider, input))
        })
    }

    fn with_schema<S, F, Fut, R, E>(
        method: &'static str,
        input_schema: std::result::Result<S, String>,
        implementation: F,
    ) -> Self
    where
        S: InputSchema,
        F: Fn(Arc<P>, S::Output) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = std::result::Result<R, E>> + Send + 'static,
        R: Serialize + Send + 'static,
        E: Into<BoxError> + Send + 'static,
    {
        // Shared by every instance; only the binding is per instance.
        let input_schema = input_schema.map(Arc::new);
        let implementation = Arc::new(implementation);

        let bind = move |name: &str,
                         description: Option<&str>,
                         provider: &Weak<P>|
              -> Result<AiFunction> {
            let input_schema = match &input_schema {
                Ok(schema) => Arc::clone(schema),
                Err(details) => {
                    return Err(Error::materialization_with_context(
                        format!("input schema for function \"{}\" could not be built", name),
                        ErrorContext::new()
                            .with_field_path("spec.input_schema")
                            .with_details(details.clone())
                            .with_source(std::any::type_name::<P>()),
                    ))
                }
            };

            let implementation = Arc::clone(&implementation);
            let provider = provider.clone();
            let function = name.to_string();
            let erased: ErasedImplementation = Arc::new(move |input: ParsedInput| {
                let Some(provider) = provider.upgrade() else {
                    return future::ready(Err(provider_dropped::<P>(&function))).boxed();
                };
                match input.downcast::<S::Output>() {
                    Ok(value) => complete((*implementation)(provider, value)),
                    Err(_) => mismatch::<S::Output>(&function),
                }
            });

            let mut spec = AiFunctionSpec::new(name, input_schema);
            spec.description = description.map(str::to_string);
            AiFunction::from_parts(spec, erased)
        };

        Self {
            name: method.to_string(),
            method,
            description: None,
            bind: Box::new(bind),
        }
    }

    /// Override the function name (defaults to the method name).
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn function_name(&self) -> &str {
        &self.name
    }

    pub fn method(&self) -> &'static str {
        self.method
    }

    fn bind(&self, provider: &Weak<P>) -> Result<AiFunction> {
        (self.bind)(&self.name, self.description.as_deref(), provider)
    }
}

fn provider_dropped<P>(function: &str) -> Error {
    Error::materialization_with_context(
        format!(
            "provider bound to function \"{}\" has been dropped",
            function
        ),
        ErrorContext::new().with_source(std::any::type_name::<P>()),
    )
}

impl<P> fmt::Debug for FunctionDeclaration<P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FunctionDeclaration")
            .field("name", &self.name)
            .field("method", &self.method)
            .field("description", &self.description)
            .finish_non_exhaustive()
    }
}

/// Declaration table of one provider type, in declaration order.
pub struct Declarations<P> {
    entries: Vec<FunctionDeclaration<P>>,
}

impl<P> Default for Declarations<P> {
    fn default() -> Self {
        Self {
            entries: Vec::new(),
        }
    }
}

impl<P: AiFunctionsProvider> Declarations<P> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a declaration.
    pub fn declare(mut self, declaration: FunctionDeclaration<P>) -> Self {
        self.entries.push(declaration);
        self
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, FunctionDeclaration<P>> {
        self.entries.iter()
    }

    /// Bind every declaration to `provider`, in order.
    fn materialize(&self, provider: &Arc<P>) -> Result<AiFunctionSet> {
        let provider_type = std::any::type_name::<P>();
        if self.is_empty() {
            return Err(Error::materialization_with_context(
                "no AI functions declared",
                ErrorContext::new().with_source(provider_type),
            ));
        }

        let mut methods = HashSet::new();
        for declaration in &self.entries {
            if !methods.insert(declaration.method) {
                return Err(Error::materialization_with_context(
                    format!("method \"{}\" is declared more than once", declaration.method),
                    ErrorContext::new().with_source(provider_type),
                ));
            }
        }

        let weak = Arc::downgrade(provider);
        let functions = self
            .entries
            .iter()
            .map(|declaration| declaration.bind(&weak))
            .collect::<Result<Vec<_>>>()?;

        let set = AiFunctionSet::try_new(functions).map_err(|err| {
            tracing::warn!(provider = provider_type, error = %err, "conflicting declarations");
            err
        })?;
        tracing::debug!(
            provider = provider_type,
            declared = self.len(),
            functions = set.len(),
            "materialized AI functions"
        );
        Ok(set)
    }
}

impl<P> fmt::Debug for Declarations<P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(&self.entries).finish()
    }
}

/// Holds a provider instance's function set once it has been built.
///
/// Concurrent first accesses materialize at most once. A failed
/// materialization is not cached.
#[derive(Debug, Default)]
pub struct FunctionsCache {
    functions: OnceCell<AiFunctionSet>,
}

impl FunctionsCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// The cached set, building it from `P`'s declarations if needed.
    pub fn get_or_materialize<P: AiFunctionsProvider>(
        &self,
        provider: &Arc<P>,
    ) -> Result<&AiFunctionSet> {
        if let Some(functions) = self.functions.get() {
            tracing::trace!(provider = std::any::type_name::<P>(), "functions cache hit");
            return Ok(functions);
        }
        self.functions
            .get_or_try_init(|| P::declarations().materialize(provider))
    }

    pub fn get(&self) -> Option<&AiFunctionSet> {
        self.functions.get()
    }

    pub fn is_materialized(&self) -> bool {
        self.functions.get().is_some()
    }
}
