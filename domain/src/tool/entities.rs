//! Tool domain entities

use super::input::ToolInput;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Definition of a tool the model may call.
///
/// Built once when the tool is constructed and never mutated afterwards.
/// The `input_schema` is sent to the model verbatim (after wire translation)
/// so it can decide when and how to call the tool.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolDefinition {
    /// Unique name of the tool (e.g., "read_file")
    pub name: String,
    /// Human-readable description consumed by the model
    pub description: String,
    /// Parameter schema
    pub input_schema: ParameterSchema,
}

impl ToolDefinition {
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            input_schema: ParameterSchema::default(),
        }
    }

    /// Add an optional property to the schema
    pub fn with_property(mut self, name: impl Into<String>, property: PropertySchema) -> Self {
        self.input_schema.properties.insert(name.into(), property);
        self
    }

    /// Add a required property to the schema
    pub fn with_required_property(
        mut self,
        name: impl Into<String>,
        property: PropertySchema,
    ) -> Self {
        let name = name.into();
        if !self.input_schema.required.contains(&name) {
            self.input_schema.required.push(name.clone());
        }
        self.input_schema.properties.insert(name, property);
        self
    }

    pub fn with_schema(mut self, schema: ParameterSchema) -> Self {
        self.input_schema = schema;
        self
    }

    pub fn is_required(&self, property: &str) -> bool {
        self.input_schema.required.iter().any(|r| r == property)
    }
}

/// Object-shaped parameter schema (a JSON Schema subset).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParameterSchema {
    /// Schema type name, always "object" for tool inputs
    #[serde(rename = "type", default = "default_schema_type")]
    pub schema_type: String,
    #[serde(default)]
    pub properties: BTreeMap<String, PropertySchema>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub required: Vec<String>,
}

fn default_schema_type() -> String {
    "object".to_string()
}

impl Default for ParameterSchema {
    fn default() -> Self {
        Self {
            schema_type: default_schema_type(),
            properties: BTreeMap::new(),
            required: Vec::new(),
        }
    }
}

/// Schema of a single property.
///
/// Keywords beyond type/description/enum (e.g. `items`, `default`,
/// nested `properties`) are kept in `extra` so schemas discovered from
/// external processes survive translation unchanged.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PropertySchema {
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub property_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(rename = "enum", default, skip_serializing_if = "Option::is_none")]
    pub enum_values: Option<Vec<serde_json::Value>>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl PropertySchema {
    pub fn new(property_type: impl Into<String>) -> Self {
        Self {
            property_type: Some(property_type.into()),
            description: None,
            enum_values: None,
            extra: serde_json::Map::new(),
        }
    }

    pub fn string() -> Self {
        Self::new("string")
    }

    pub fn integer() -> Self {
        Self::new("integer")
    }

    pub fn number() -> Self {
        Self::new("number")
    }

    pub fn boolean() -> Self {
        Self::new("boolean")
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_enum<I, V>(mut self, values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<serde_json::Value>,
    {
        self.enum_values = Some(values.into_iter().map(Into::into).collect());
        self
    }
}

/// A model-issued request to invoke a tool.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolUse {
    /// Provider-assigned id (e.g. "toolu_abc123"), echoed by the result
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub input: ToolInput,
}

impl ToolUse {
    pub fn new(id: impl Into<String>, name: impl Into<String>, input: ToolInput) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            input,
        }
    }
}
