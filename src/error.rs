use crate::structured::ValidationError;
use thiserror::Error;

/// Boxed error produced by a wrapped function implementation.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Structured error context for construction and materialization failures.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ErrorContext {
    /// Spec field that caused the error (e.g., "spec.name", "spec.input_schema")
    pub field_path: Option<String>,
    /// Additional context about the error (e.g., the offending value)
    pub details: Option<String>,
    /// Where the error was raised (e.g., "create_ai_function", a provider type name)
    pub source: Option<String>,
}

impl ErrorContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_field_path(mut self, path: impl Into<String>) -> Self {
        self.field_path = Some(path.into());
        self
    }

    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }

    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = Some(source.into());
        self
    }
}

/// Unified error type for building, materializing and invoking AI functions.
#[derive(Debug, Error)]
pub enum Error {
    /// A descriptor could not be built from its spec.
    #[error("Construction error: {message}{}", format_context(.context))]
    Construction {
        message: String,
        context: ErrorContext,
    },

    /// A provider's function set could not be assembled.
    #[error("Materialization error: {message}{}", format_context(.context))]
    Materialization {
        message: String,
        context: ErrorContext,
    },

    #[error("Invalid input for function \"{function}\": {}", format_errors(.errors))]
    Validation {
        function: String,
        errors: Vec<ValidationError>,
    },

    #[error("Missing required function_call.arguments for function \"{function}\"")]
    MissingArguments { function: String },

    #[error("Parsed input for function \"{function}\" is not a {expected}")]
    TypeMismatch {
        function: String,
        expected: &'static str,
    },

    #[error("Duplicate function name \"{name}\"")]
    DuplicateName { name: String },

    #[error("Unknown function \"{name}\"")]
    UnknownFunction { name: String },

    /// Error raised by the wrapped implementation, passed through as-is.
    #[error(transparent)]
    Implementation(BoxError),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

fn format_context(ctx: &ErrorContext) -> String {
    let mut parts = Vec::new();
    if let Some(ref field) = ctx.field_path {
        parts.push(format!("field: {}", field));
    }
    if let Some(ref details) = ctx.details {
        parts.push(format!("details: {}", details));
    }
    if let Some(ref source) = ctx.source {
        parts.push(format!("source: {}", source));
    }
    if parts.is_empty() {
        String::new()
    } else {
        format!(" ({})", parts.join(", "))
    }
}

fn format_errors(errors: &[ValidationError]) -> String {
    if errors.is_empty() {
        return "validation failed".to_string();
    }
    errors
        .iter()
        .map(|e| e.to_string())
        .collect::<Vec<_>>()
        .join("; ")
}

impl Error {
    /// Construction error naming the offending spec field.
    pub fn construction(field: impl Into<String>, msg: impl Into<String>) -> Self {
        Error::Construction {
            message: msg.into(),
            context: ErrorContext::new()
                .with_field_path(field)
                .with_source("create_ai_function"),
        }
    }

    pub fn construction_with_context(msg: impl Into<String>, context: ErrorContext) -> Self {
        Error::Construction {
            message: msg.into(),
            context,
        }
    }

    pub fn materialization_with_context(msg: impl Into<String>, context: ErrorContext) -> Self {
        Error::Materialization {
            message: msg.into(),
            context,
        }
    }

    /// Wrap an implementation failure without translating it.
    pub fn implementation(err: impl Into<BoxError>) -> Self {
        Error::Implementation(err.into())
    }

    /// Extract error context if available
    pub fn context(&self) -> Option<&ErrorContext> {
        match self {
            Error::Construction { context, .. } | Error::Materialization { context, .. } => {
                Some(context)
            }
            _ => None,
        }
    }

    /// Name of the function a per-call error refers to.
    pub fn function_name(&self) -> Option<&str> {
        match self {
            Error::Validation { function, .. }
            | Error::MissingArguments { function }
            | Error::TypeMismatch { function, .. } => Some(function),
            Error::UnknownFunction { name } => Some(name),
            _ => None,
        }
    }

    /// True for per-call input failures that should be reported back to the
    /// model rather than propagated.
    pub fn is_input_error(&self) -> bool {
        matches!(
            self,
            Error::Validation { .. }
                | Error::MissingArguments { .. }
                | Error::TypeMismatch { .. }
                | Error::UnknownFunction { .. }
        )
    }

    /// Borrow the implementation's own error, if this is one.
    pub fn implementation_error(&self) -> Option<&(dyn std::error::Error + Send + Sync + 'static)> {
        match self {
            Error::Implementation(err) => Some(err.as_ref()),
            _ => None,
        }
    }

    /// Recover the implementation's own error, if this is one.
    pub fn into_implementation_error(self) -> Option<BoxError> {
        match self {
            Error::Implementation(err) => Some(err),
            _ => None,
        }
    }
}
