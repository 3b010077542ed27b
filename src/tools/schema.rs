//! Converts Arcade parameter descriptions into JSON Schema.

use serde_json::{json, Map, Value};

use crate::arcade::{ToolParameter, ValueSchema};

/// JSON Schema type for an Arcade `val_type`.
fn json_type(val_type: &str) -> &'static str {
    match val_type {
        "integer" => "integer",
        "number" => "number",
        "boolean" => "boolean",
        "json" => "object",
        "array" => "array",
        _ => "string",
    }
}

fn value_schema(schema: &ValueSchema, description: Option<&str>) -> Value {
    let mut out = Map::new();
    out.insert("type".into(), json!(json_type(&schema.val_type)));
    if schema.val_type == "array" {
        let inner = schema.inner_val_type.as_deref().unwrap_or("string");
        out.insert("items".into(), json!({ "type": json_type(inner) }));
    }
    if let Some(values) = schema.enum_values.as_ref().filter(|v| !v.is_empty()) {
        out.insert("enum".into(), json!(values));
    }
    if let Some(description) = description {
        out.insert("description".into(), json!(description));
    }
    Value::Object(out)
}

/// Builds the `object` schema for a tool's input parameters.
pub fn parameters_schema(parameters: &[ToolParameter]) -> Value {
    let mut properties = Map::new();
    let mut required = Vec::new();
    for param in parameters {
        properties.insert(
            param.name.clone(),
            value_schema(&param.value_schema, param.description.as_deref()),
        );
        if param.required {
            required.push(param.name.clone());
        }
    }
    json!({
        "type": "object",
        "properties": properties,
        "required": required,
    })
}
