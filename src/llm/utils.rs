use schemars::gen::SchemaSettings;
use schemars::JsonSchema;
use serde_json::Value;

/// Generates a Gemini-compatible response schema for `T`.
///
/// Gemini accepts an OpenAPI subset: no `$ref`, `$schema`, `definitions` or
/// `title`, and upper-case type names.
pub fn gemini_response_schema<T: JsonSchema>() -> serde_json::Result<Value> {
    let settings = SchemaSettings::openapi3().with(|s| {
        s.inline_subschemas = true;
        s.meta_schema = None;
    });
    let root = settings.into_generator().into_root_schema_for::<T>();
    let mut value = serde_json::to_value(root)?;
    clean_schema(&mut value);
    Ok(value)
}

fn clean_schema(value: &mut Value) {
    match value {
        Value::Object(map) => {
            for key in ["$schema", "title", "definitions", "components"] {
                map.remove(key);
            }
            if let Some(Value::String(kind)) = map.get_mut("type") {
                *kind = kind.to_uppercase();
            }
            for child in map.values_mut() {
                clean_schema(child);
            }
        }
        Value::Array(items) => {
            for child in items {
                clean_schema(child);
            }
        }
        _ => {}
    }
}

/// Pulls the JSON object out of a model reply that may carry code fences or
/// surrounding prose.
pub fn clean_json_output(raw: &str) -> &str {
    if let (Some(start), Some(end)) = (raw.find('{'), raw.rfind('}')) {
        if start < end {
            return &raw[start..=end];
        }
    }
    raw.trim()
}
