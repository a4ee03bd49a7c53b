//! Reduce tool parameter schemas to the JSON-Schema subset Gemini accepts.
//!
//! Gemini function declarations reject `$schema`, `additionalProperties` and
//! the numeric/length bound keywords. Bounds are not thrown away: they are
//! folded into the node's `description` so the model still sees them.

use serde_json::{Map, Value};

const REMOVED_KEYWORDS: &[&str] = &["$schema", "additionalProperties"];

/// Bound keywords in the order they are reported in descriptions.
const BOUND_KEYWORDS: &[&str] = &[
    "minLength",
    "maxLength",
    "minimum",
    "maximum",
    "minItems",
    "maxItems",
];

/// Recursively strip unsupported keywords. Non-object input is returned as is.
pub fn sanitize_schema(schema: &Value) -> Value {
    match schema {
        Value::Object(node) => Value::Object(sanitize_node(node)),
        other => other.clone(),
    }
}

fn sanitize_node(node: &Map<String, Value>) -> Map<String, Value> {
    let bounds: Vec<String> = BOUND_KEYWORDS
        .iter()
        .filter_map(|&key| node.get(key).map(|v| format!("{key}: {}", scalar_text(v))))
        .collect();

    let mut cleaned = Map::new();
    for (key, value) in node {
        let key_str = key.as_str();
        if REMOVED_KEYWORDS.contains(&key_str) || BOUND_KEYWORDS.contains(&key_str) {
            continue;
        }

        let value = if key_str == "description" && !bounds.is_empty() {
            Value::String(format!("{} ({})", scalar_text(value), bounds.join(", ")))
        } else {
            match value {
                Value::Object(child) => Value::Object(sanitize_node(child)),
                Value::Array(items) => Value::Array(
                    items
                        .iter()
                        .map(|item| match item {
                            Value::Object(child) => Value::Object(sanitize_node(child)),
                            other => other.clone(),
                        })
                        .collect(),
                ),
                other => other.clone(),
            }
        };
        cleaned.insert(key.clone(), value);
    }

    if !bounds.is_empty() && !cleaned.contains_key("description") {
        cleaned.insert(
            "description".to_string(),
            Value::String(format!("Validation: {}", bounds.join(", "))),
        );
    }

    cleaned
}

/// Strings render bare, everything else as compact JSON.
fn scalar_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
