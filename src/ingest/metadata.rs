//! Metadata sanitization for the vector index. The index treats a literal
//! period in a payload key as a nested-path delimiter, so keys are rewritten
//! with underscores; values must be primitives (string/number/bool) or lists
//! of primitives, anything else is stringified. The rewrite is idempotent.

use serde_json::{Map, Value};

pub fn sanitize_metadata(metadata: &Map<String, Value>) -> Map<String, Value> {
    let mut out = Map::new();
    for (key, value) in metadata {
        out.insert(key.replace('.', "_"), sanitize_value(value));
    }
    out
}

fn sanitize_value(value: &Value) -> Value {
    match value {
        Value::String(_) | Value::Number(_) | Value::Bool(_) => value.clone(),
        Value::Array(items) if items.iter().all(is_primitive) => value.clone(),
        other => Value::String(other.to_string()),
    }
}

fn is_primitive(value: &Value) -> bool {
    matches!(value, Value::String(_) | Value::Number(_) | Value::Bool(_))
}
