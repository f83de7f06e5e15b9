//! Shared helpers for integration tests.

#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};

use ai_fn_rust::structured::ValidationError;
use ai_fn_rust::{InputSchema, JsonSchemaInput};
use serde_json::Value;

pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("ai_fn_rust=debug")),
        )
        .with_test_writer()
        .try_init();
}

/// JSON-schema input shape that counts wire-schema conversions.
pub struct CountingSchema {
    inner: JsonSchemaInput,
    conversions: AtomicUsize,
}

impl CountingSchema {
    pub fn new(schema: Value) -> Self {
        Self {
            inner: JsonSchemaInput::new(schema).expect("valid schema"),
            conversions: AtomicUsize::new(0),
        }
    }

    pub fn conversions(&self) -> usize {
        self.conversions.load(Ordering::SeqCst)
    }
}

impl InputSchema for CountingSchema {
    type Output = Value;

    fn validate(&self, raw: &str) -> Result<Value, Vec<ValidationError>> {
        self.inner.validate(raw)
    }

    fn to_wire_schema(&self) -> Value {
        self.conversions.fetch_add(1, Ordering::SeqCst);
        self.inner.to_wire_schema()
    }
}
