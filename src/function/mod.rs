//! Structured-input functions.
//!
//! A function is a name, a description, an [`InputSchema`] and an
//! implementation. [`create_ai_function`] validates the spec, converts the
//! input shape to its wire schema once, and returns an [`AiFunction`] that
//! parses a payload (raw string or [`Msg`](crate::types::Msg)) before calling
//! the implementation. [`AiFunctionSet`] groups functions by unique name for
//! adapters.

mod descriptor;
mod input;
mod payload;
mod set;
mod spec;

pub use descriptor::{create_ai_function, create_ai_function_sync, AiFunction};
pub(crate) use descriptor::{complete, mismatch, ErasedImplementation};
pub use input::{DynInputSchema, InputSchema, JsonSchemaInput, ParsedInput, TypedInput};
pub use payload::FunctionInput;
pub use set::{AiFunctionLike, AiFunctionSet};
pub use spec::{AiFunctionSpec, FunctionSpec};
