//! Dynamically typed tool arguments.
//!
//! Tool-call arguments arrive as an arbitrary JSON object. [`ToolInput`]
//! wraps that object and offers typed accessors which fail with an
//! `INVALID_ARGUMENT` [`ToolError`] instead of a decode panic.

use super::value_objects::ToolError;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Key/value arguments of a single tool call.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ToolInput(Map<String, Value>);

impl ToolInput {
    pub fn new() -> Self {
        Self(Map::new())
    }

    /// Build from any JSON value. `null` becomes an empty input; any other
    /// non-object is rejected.
    pub fn from_value(value: Value) -> Result<Self, ToolError> {
        match value {
            Value::Object(map) => Ok(Self(map)),
            Value::Null => Ok(Self::new()),
            other => Err(ToolError::invalid_argument(format!(
                "tool input must be an object, got {}",
                json_type_name(&other)
            ))),
        }
    }

    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.0.insert(key.into(), value.into());
        self
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        self.0.insert(key.into(), value.into());
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    /// `true` when the key is present and not `null`.
    pub fn contains(&self, key: &str) -> bool {
        self.0.get(key).is_some_and(|v| !v.is_null())
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(|k| k.as_str())
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn as_map(&self) -> &Map<String, Value> {
        &self.0
    }

    pub fn into_value(self) -> Value {
        Value::Object(self.0)
    }

    pub fn required_string(&self, key: &str) -> Result<&str, ToolError> {
        match self.0.get(key) {
            Some(Value::String(s)) => Ok(s),
            Some(Value::Null) | None => Err(missing(key)),
            Some(other) => Err(wrong_type(key, "string", other)),
        }
    }

    pub fn optional_string(&self, key: &str) -> Result<Option<&str>, ToolError> {
        match self.0.get(key) {
            Some(Value::String(s)) => Ok(Some(s)),
            Some(Value::Null) | None => Ok(None),
            Some(other) => Err(wrong_type(key, "string", other)),
        }
    }

    pub fn required_int(&self, key: &str) -> Result<i64, ToolError> {
        self.optional_int(key)?.ok_or_else(|| missing(key))
    }

    /// Integers are also accepted when sent as whole floats (`3.0`), which
    /// some models emit.
    pub fn optional_int(&self, key: &str) -> Result<Option<i64>, ToolError> {
        match self.0.get(key) {
            Some(Value::Number(n)) => {
                if let Some(i) = n.as_i64() {
                    return Ok(Some(i));
                }
                match n.as_f64() {
                    Some(f) if f.fract() == 0.0 && f.abs() < i64::MAX as f64 => {
                        Ok(Some(f as i64))
                    }
                    _ => Err(ToolError::invalid_argument(format!(
                        "parameter '{}' must be an integer, got {}",
                        key, n
                    ))),
                }
            }
            Some(Value::Null) | None => Ok(None),
            Some(other) => Err(wrong_type(key, "integer", other)),
        }
    }

    pub fn optional_f64(&self, key: &str) -> Result<Option<f64>, ToolError> {
        match self.0.get(key) {
            Some(Value::Number(n)) => Ok(n.as_f64()),
            Some(Value::Null) | None => Ok(None),
            Some(other) => Err(wrong_type(key, "number", other)),
        }
    }

    pub fn required_bool(&self, key: &str) -> Result<bool, ToolError> {
        self.optional_bool(key)?.ok_or_else(|| missing(key))
    }

    pub fn optional_bool(&self, key: &str) -> Result<Option<bool>, ToolError> {
        match self.0.get(key) {
            Some(Value::Bool(b)) => Ok(Some(*b)),
            Some(Value::Null) | None => Ok(None),
            Some(other) => Err(wrong_type(key, "boolean", other)),
        }
    }

    pub fn optional_array(&self, key: &str) -> Result<Option<&[Value]>, ToolError> {
        match self.0.get(key) {
            Some(Value::Array(items)) => Ok(Some(items)),
            Some(Value::Null) | None => Ok(None),
            Some(other) => Err(wrong_type(key, "array", other)),
        }
    }

    pub fn optional_object(&self, key: &str) -> Result<Option<&Map<String, Value>>, ToolError> {
        match self.0.get(key) {
            Some(Value::Object(map)) => Ok(Some(map)),
            Some(Value::Null) | None => Ok(None),
            Some(other) => Err(wrong_type(key, "object", other)),
        }
    }
}

impl From<Map<String, Value>> for ToolInput {
    fn from(map: Map<String, Value>) -> Self {
        Self(map)
    }
}

impl FromIterator<(String, Value)> for ToolInput {
    fn from_iter<T: IntoIterator<Item = (String, Value)>>(iter: T) -> Self {
        Self(iter.into_iter().collect())
    }
}

pub(crate) fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

fn missing(key: &str) -> ToolError {
    ToolError::invalid_argument(format!("missing required parameter '{}'", key))
}

fn wrong_type(key: &str, expected: &str, got: &Value) -> ToolError {
    ToolError::invalid_argument(format!(
        "parameter '{}' must be of type {}, got {}",
        key,
        expected,
        json_type_name(got)
    ))
}
