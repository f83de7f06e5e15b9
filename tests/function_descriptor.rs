//! Integration tests for building and invoking AI functions

mod common;

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use ai_fn_rust::structured::SchemaGenerator;
use ai_fn_rust::{
    create_ai_function, create_ai_function_sync, AiFunctionSpec, Error, FunctionInput,
    JsonSchemaInput, Msg, ParseConfig, TypedInput,
};
use common::{init_tracing, CountingSchema};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, schemars::JsonSchema)]
struct SearchArgs {
    /// Search query
    query: String,
    #[serde(default)]
    limit: Option<u32>,
}

#[derive(Debug, thiserror::Error)]
#[error("backend unavailable: {0}")]
struct BackendError(String);

fn search_impl(args: SearchArgs) -> Vec<String> {
    let n = args.limit.unwrap_or(2) as usize;
    (0..n).map(|i| format!("{}#{}", args.query, i)).collect()
}

#[test]
fn test_spec_is_reflected_and_trimmed() {
    let f = create_ai_function_sync(
        AiFunctionSpec::new("search", TypedInput::<SearchArgs>::new().unwrap())
            .description("\n  Search the index.\t"),
        |args: SearchArgs| Ok::<_, BackendError>(search_impl(args)),
    )
    .unwrap();

    assert_eq!(f.name(), "search");
    assert_eq!(f.description(), "Search the index.");
    let schema = f.wire_schema();
    assert_eq!(schema["type"], "object");
    assert_eq!(schema["properties"]["query"]["description"], "Search query");
    assert_eq!(schema["required"], json!(["query"]));

    let spec = serde_json::to_value(f.spec()).unwrap();
    assert_eq!(spec["name"], "search");
    assert_eq!(spec["parameters"], *schema);
}

#[test]
fn test_missing_description_defaults_to_empty() {
    let f = create_ai_function_sync(
        AiFunctionSpec::new("noop", JsonSchemaInput::new(json!({"type": "object"})).unwrap()),
        |_: Value| Ok::<_, BackendError>(()),
    )
    .unwrap();
    assert_eq!(f.description(), "");
    assert!(f.to_tool_definition().function.description.is_none());
    // Object schemas always carry `properties` on the wire.
    assert_eq!(f.wire_schema()["properties"], json!({}));
}

#[test]
fn test_wire_schema_converted_once() {
    let schema = Arc::new(CountingSchema::new(json!({
        "type": "object",
        "properties": {"x": {"type": "number"}}
    })));
    let f = create_ai_function_sync(
        AiFunctionSpec::new("square", Arc::clone(&schema)),
        |v: Value| Ok::<_, BackendError>(v["x"].as_f64().unwrap_or_default().powi(2)),
    )
    .unwrap();

    let first = f.wire_schema().clone();
    for _ in 0..3 {
        assert_eq!(*f.wire_schema(), first);
        assert_eq!(f.spec().parameters, first);
    }
    assert_eq!(schema.conversions(), 1);
}

#[test]
fn test_construction_errors_name_the_field() {
    let blank = create_ai_function_sync(
        AiFunctionSpec::new("", TypedInput::<SearchArgs>::new().unwrap()),
        |args: SearchArgs| Ok::<_, BackendError>(search_impl(args)),
    )
    .unwrap_err();
    assert_eq!(
        blank.context().and_then(|c| c.field_path.as_deref()),
        Some("spec.name")
    );

    let not_object = create_ai_function_sync(
        AiFunctionSpec::new(
            "list",
            JsonSchemaInput::new(json!({"type": "array", "items": {"type": "string"}})).unwrap(),
        ),
        |v: Value| Ok::<_, BackendError>(v),
    )
    .unwrap_err();
    assert!(matches!(not_object, Error::Construction { .. }));
    assert!(not_object.to_string().contains("spec.input_schema"));
}

#[tokio::test]
async fn test_parse_then_call_matches_direct_call() {
    init_tracing();
    let f = create_ai_function(
        AiFunctionSpec::new("search", TypedInput::<SearchArgs>::new().unwrap()),
        |args: SearchArgs| async move {
            tokio::time::sleep(Duration::from_millis(1)).await;
            Ok::<_, BackendError>(search_impl(args))
        },
    )
    .unwrap();

    let payloads = [
        r#"{"query": "rust"}"#,
        r#"{"query": "tokio", "limit": 3}"#,
        r#"{"query": "", "limit": 0}"#,
    ];
    for payload in payloads {
        let parsed: SearchArgs = f.parse_input_as(&payload.into()).unwrap();
        let direct = serde_json::to_value(search_impl(parsed.clone())).unwrap();
        assert_eq!(f.call(payload).await.unwrap(), direct);
        assert_eq!(
            f.call(Msg::function_call("search", payload)).await.unwrap(),
            direct
        );
    }
}

#[tokio::test]
async fn test_missing_arguments_names_the_function() {
    for name in ["alpha", "beta_fn", "gamma-3"] {
        let f = create_ai_function_sync(
            AiFunctionSpec::new(name, JsonSchemaInput::new(json!({"type": "object"})).unwrap()),
            |v: Value| Ok::<_, BackendError>(v),
        )
        .unwrap();

        let mut empty = Msg::function_call(name, "");
        let err = f.call(empty.clone()).await.unwrap_err();
        assert!(matches!(err, Error::MissingArguments { .. }));
        assert_eq!(err.function_name(), Some(name));
        assert!(err.to_string().contains(name));

        empty.function_call = None;
        let err = f.call(&empty).await.unwrap_err();
        assert_eq!(err.function_name(), Some(name));
    }
}

#[tokio::test]
async fn test_validation_errors_are_reported_not_raised() {
    let calls = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&calls);
    let f = create_ai_function_sync(
        AiFunctionSpec::new("search", TypedInput::<SearchArgs>::new().unwrap()),
        move |args: SearchArgs| {
            counter.fetch_add(1, Ordering::SeqCst);
            Ok::<_, BackendError>(search_impl(args))
        },
    )
    .unwrap();

    let err = f.call(r#"{"limit": 1}"#).await.unwrap_err();
    assert!(err.is_input_error());
    match err {
        Error::Validation { function, errors } => {
            assert_eq!(function, "search");
            assert!(!errors.is_empty());
        }
        other => panic!("unexpected error: {other}"),
    }

    assert!(f.call("not json").await.is_err());
    assert_eq!(calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_implementation_errors_propagate_unchanged() {
    let f = create_ai_function(
        AiFunctionSpec::new("search", TypedInput::<SearchArgs>::new().unwrap()),
        |args: SearchArgs| async move { Err::<Vec<String>, _>(BackendError(args.query)) },
    )
    .unwrap();

    let err = f.call(r#"{"query": "down"}"#).await.unwrap_err();
    assert!(!err.is_input_error());
    assert_eq!(err.to_string(), "backend unavailable: down");
    let inner = err.into_implementation_error().unwrap();
    assert_eq!(inner.downcast_ref::<BackendError>().unwrap().0, "down");
}

#[tokio::test]
async fn test_fenced_payload_accepted() {
    let schema = SchemaGenerator::new()
        .required_property("city", json!({"type": "string"}))
        .build();
    let f = create_ai_function_sync(
        AiFunctionSpec::new("weather", JsonSchemaInput::new(schema.clone()).unwrap()),
        |v: Value| Ok::<_, BackendError>(format!("sunny in {}", v["city"].as_str().unwrap_or("?"))),
    )
    .unwrap();

    let fenced = "Sure:\n```json\n{\"city\": \"Lima\"}\n```";
    assert_eq!(f.call(fenced).await.unwrap(), json!("sunny in Lima"));

    let bare_only = create_ai_function_sync(
        AiFunctionSpec::new(
            "weather",
            JsonSchemaInput::with_config(schema, ParseConfig::new().extract_fenced_json(false))
                .unwrap(),
        ),
        |v: Value| Ok::<_, BackendError>(v),
    )
    .unwrap();
    assert!(bare_only.call(FunctionInput::raw(fenced)).await.is_err());
}
