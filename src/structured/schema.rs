//! Input schema generation and wire-schema conversion.

use serde_json::{json, Map, Value};

/// Builder for object-shaped input schemas written by hand.
#[derive(Debug, Clone, Default)]
pub struct SchemaGenerator {
    description: Option<String>,
    properties: Vec<(String, Value)>,
    required: Vec<String>,
    additional_properties: Option<bool>,
}

impl SchemaGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Add an optional property.
    pub fn property(mut self, name: impl Into<String>, schema: Value) -> Self {
        self.properties.push((name.into(), schema));
        self
    }

    /// Add a property the caller must supply.
    pub fn required_property(mut self, name: impl Into<String>, schema: Value) -> Self {
        let name = name.into();
        if !self.required.contains(&name) {
            self.required.push(name.clone());
        }
        self.properties.push((name, schema));
        self
    }

    pub fn additional_properties(mut self, allowed: bool) -> Self {
        self.additional_properties = Some(allowed);
        self
    }

    pub fn build(self) -> Value {
        let mut map = Map::new();
        map.insert("type".into(), json!("object"));

        let properties: Map<String, Value> = self.properties.into_iter().collect();
        map.insert("properties".into(), properties.into());

        if !self.required.is_empty() {
            map.insert("required".into(), self.required.into());
        }
        if let Some(allowed) = self.additional_properties {
            map.insert("additionalProperties".into(), allowed.into());
        }
        if let Some(desc) = self.description {
            map.insert("description".into(), desc.into());
        }

        map.into()
    }
}

/// JSON Schema for a Rust type, generated by `schemars`.
pub fn json_schema_from_type<T: schemars::JsonSchema>() -> Value {
    let schema = schemars::schema_for!(T);
    serde_json::to_value(&schema).unwrap_or_else(|_| json!({}))
}

/// Convert an input schema into the form presented to a model.
///
/// Drops the `$schema` and `title` annotations generators add, and gives
/// object schemas an explicit (possibly empty) `properties` map, which
/// several providers require.
pub fn to_wire_schema(schema: &Value) -> Value {
    let mut wire = schema.clone();
    if let Some(map) = wire.as_object_mut() {
        map.remove("$schema");
        map.remove("title");
        if map.get("type").and_then(Value::as_str) == Some("object")
            && !map.contains_key("properties")
        {
            map.insert("properties".into(), json!({}));
        }
    }
    wire
}

/// Whether a schema describes a JSON object at its root.
pub fn is_object_schema(schema: &Value) -> bool {
    match schema.get("type") {
        Some(Value::String(t)) => t == "object",
        Some(Value::Array(types)) => types.len() == 1 && types[0] == "object",
        _ => false,
    }
}
