//! Tool schema conversion.
//!
//! Remote providers describe their parameters with free-form JSON Schema.
//! [`schema_from_json`] maps that into the domain [`ParameterSchema`]
//! leniently: unknown keywords are carried along, malformed pieces dropped.
//! [`tool_to_api_schema`] produces the provider-neutral shape sent to models.

use serde_json::{Map, Value, json};
use zia_domain::{ParameterSchema, PropertySchema, ToolDefinition};

/// Translate a remote `inputSchema` into a [`ParameterSchema`].
///
/// A non-object schema yields an empty object schema. Properties that are
/// not objects are skipped; non-string `required` entries are ignored.
pub fn schema_from_json(schema: &Value) -> ParameterSchema {
    let Some(obj) = schema.as_object() else {
        return ParameterSchema::default();
    };

    let mut parsed = ParameterSchema::default();
    if let Some(t) = obj.get("type").and_then(Value::as_str) {
        parsed.schema_type = t.to_string();
    }

    if let Some(properties) = obj.get("properties").and_then(Value::as_object) {
        for (name, property) in properties {
            if let Some(property) = property.as_object() {
                parsed
                    .properties
                    .insert(name.clone(), property_from_json(property));
            }
        }
    }

    if let Some(required) = obj.get("required").and_then(Value::as_array) {
        for name in required.iter().filter_map(Value::as_str) {
            if !parsed.required.iter().any(|r| r == name) {
                parsed.required.push(name.to_string());
            }
        }
    }

    parsed
}

fn property_from_json(property: &Map<String, Value>) -> PropertySchema {
    let mut extra = Map::new();
    let mut property_type = None;
    let mut description = None;
    let mut enum_values = None;

    for (key, value) in property {
        match (key.as_str(), value) {
            ("type", Value::String(t)) => property_type = Some(t.clone()),
            // ["string", "null"] style unions: keep the first concrete type
            ("type", Value::Array(types)) => {
                property_type = types
                    .iter()
                    .filter_map(Value::as_str)
                    .find(|t| *t != "null")
                    .map(str::to_string);
            }
            ("description", Value::String(d)) => description = Some(d.clone()),
            ("enum", Value::Array(values)) => enum_values = Some(values.clone()),
            ("type" | "description" | "enum", _) => {}
            _ => {
                extra.insert(key.clone(), value.clone());
            }
        }
    }

    PropertySchema {
        property_type,
        description,
        enum_values,
        extra,
    }
}

/// Provider-neutral tool schema: `{name, description, input_schema}`.
pub fn tool_to_api_schema(tool: &ToolDefinition) -> Value {
    let input_schema = serde_json::to_value(&tool.input_schema)
        .unwrap_or_else(|_| json!({ "type": "object", "properties": {} }));
    json!({
        "name": tool.name,
        "description": tool.description,
        "input_schema": input_schema,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_schema_from_json_full() {
        let schema = schema_from_json(&json!({
            "type": "object",
            "properties": {
                "query": {"type": "string", "description": "Search query"},
                "limit": {"type": "integer", "minimum": 1, "default": 10},
                "mode": {"type": "string", "enum": ["fast", "exact"]}
            },
            "required": ["query"]
        }));

        assert_eq!(schema.schema_type, "object");
        assert_eq!(schema.required, vec!["query"]);
        let query = &schema.properties["query"];
        assert_eq!(query.property_type.as_deref(), Some("string"));
        assert_eq!(query.description.as_deref(), Some("Search query"));

        let limit = &schema.properties["limit"];
        assert_eq!(limit.extra["minimum"], json!(1));
        assert_eq!(limit.extra["default"], json!(10));

        let mode = &schema.properties["mode"];
        assert_eq!(mode.enum_values.as_ref().unwrap().len(), 2);
    }

    #[test]
    fn test_schema_from_json_is_lenient() {
        let schema = schema_from_json(&json!({
            "properties": {
                "name": {"type": ["string", "null"]},
                "broken": "not an object"
            },
            "required": ["name", 3, "name"]
        }));

        assert_eq!(schema.schema_type, "object");
        assert_eq!(schema.properties.len(), 1);
        assert_eq!(
            schema.properties["name"].property_type.as_deref(),
            Some("string")
        );
        assert_eq!(schema.required, vec!["name"]);

        assert_eq!(schema_from_json(&Value::Null), ParameterSchema::default());
    }

    #[test]
    fn test_tool_to_api_schema() {
        let tool = ToolDefinition::new("read_file", "Read file contents")
            .with_required_property(
                "path",
                PropertySchema::string().with_description("File path"),
            );

        let value = tool_to_api_schema(&tool);
        assert_eq!(value["name"], "read_file");
        assert_eq!(value["description"], "Read file contents");
        assert_eq!(value["input_schema"]["type"], "object");
        assert_eq!(value["input_schema"]["properties"]["path"]["type"], "string");
        assert_eq!(value["input_schema"]["required"], json!(["path"]));
    }

    #[test]
    fn test_round_trips_extra_keywords() {
        let raw = json!({
            "type": "object",
            "properties": {"tags": {"type": "array", "items": {"type": "string"}}}
        });
        let value = serde_json::to_value(schema_from_json(&raw)).unwrap();
        assert_eq!(value["properties"]["tags"]["items"]["type"], "string");
    }
}
