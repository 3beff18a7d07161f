//! Tool domain traits
//!
//! [`Tool`] is the capability contract every local or bridged tool
//! implements. [`ToolValidator`] is a pure check of arguments against a
//! definition, run before execution.

use async_trait::async_trait;

use super::entities::ToolDefinition;
use super::input::{ToolInput, json_type_name};
use super::value_objects::ToolError;

/// A named, schema-described capability the model may invoke.
///
/// Implementations return `Err` for any failure; the executor turns that
/// into an error result, so a tool never has to build one itself.
#[async_trait]
pub trait Tool: Send + Sync {
    fn definition(&self) -> &ToolDefinition;

    fn name(&self) -> &str {
        &self.definition().name
    }

    async fn execute(&self, input: &ToolInput) -> Result<String, ToolError>;
}

/// Validator for tool inputs
///
/// This is a pure domain trait that validates tool inputs
/// against their definitions without any I/O operations.
pub trait ToolValidator {
    fn validate(&self, input: &ToolInput, definition: &ToolDefinition) -> Result<(), ToolError>;
}

/// Checks required properties and enumerated values.
///
/// Unknown keys are allowed: remote schemas often leave
/// `additionalProperties` open.
#[derive(Debug, Clone, Default)]
pub struct DefaultToolValidator;

impl ToolValidator for DefaultToolValidator {
    fn validate(&self, input: &ToolInput, definition: &ToolDefinition) -> Result<(), ToolError> {
        for name in &definition.input_schema.required {
            if !input.contains(name) {
                return Err(ToolError::invalid_argument(format!(
                    "Missing required parameter '{}' for tool '{}'",
                    name, definition.name
                )));
            }
        }

        for (name, property) in &definition.input_schema.properties {
            let Some(value) = input.get(name).filter(|v| !v.is_null()) else {
                continue;
            };
            if let Some(allowed) = &property.enum_values {
                if !allowed.contains(value) {
                    return Err(ToolError::invalid_argument(format!(
                        "Parameter '{}' for tool '{}' must be one of {}",
                        name,
                        definition.name,
                        serde_json::Value::Array(allowed.clone())
                    )));
                }
            }
            if let Some(expected) = property.property_type.as_deref() {
                if !type_matches(expected, value) {
                    return Err(ToolError::invalid_argument(format!(
                        "Parameter '{}' for tool '{}' must be of type {}, got {}",
                        name,
                        definition.name,
                        expected,
                        json_type_name(value)
                    )));
                }
            }
        }

        Ok(())
    }
}

fn type_matches(expected: &str, value: &serde_json::Value) -> bool {
    use serde_json::Value;
    match (expected, value) {
        ("string", Value::String(_)) => true,
        ("boolean", Value::Bool(_)) => true,
        ("number", Value::Number(_)) => true,
        ("integer", Value::Number(n)) => {
            n.is_i64() || n.is_u64() || n.as_f64().is_some_and(|f| f.fract() == 0.0)
        }
        ("array", Value::Array(_)) => true,
        ("object", Value::Object(_)) => true,
        ("string" | "boolean" | "number" | "integer" | "array" | "object", _) => false,
        // "null", unions and custom types are not checked
        _ => true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tool::entities::PropertySchema;

    fn definition() -> ToolDefinition {
        ToolDefinition::new("test", "test tool")
            .with_required_property("param1", PropertySchema::string())
            .with_property("count", PropertySchema::integer())
            .with_property("mode", PropertySchema::string().with_enum(["fast", "slow"]))
    }

    #[test]
    fn test_validator_missing_required() {
        let result = DefaultToolValidator.validate(&ToolInput::new(), &definition());
        let err = result.unwrap_err();
        assert_eq!(err.code, ToolError::INVALID_ARGUMENT);
        assert!(err.message.contains("Missing required parameter 'param1'"));
    }

    #[test]
    fn test_validator_enum_mismatch() {
        let input = ToolInput::new().with("param1", "x").with("mode", "medium");
        let err = DefaultToolValidator.validate(&input, &definition()).unwrap_err();
        assert!(err.message.contains("must be one of"));
    }

    #[test]
    fn test_validator_type_mismatch() {
        let input = ToolInput::new().with("param1", "x").with("count", "three");
        let err = DefaultToolValidator.validate(&input, &definition()).unwrap_err();
        assert!(err.message.contains("must be of type integer"));
    }

    #[test]
    fn test_validator_valid_call() {
        let input = ToolInput::new()
            .with("param1", "value1")
            .with("count", 2)
            .with("mode", "fast")
            .with("extra", true);
        assert!(DefaultToolValidator.validate(&input, &definition()).is_ok());
    }

    struct Echo {
        definition: ToolDefinition,
    }

    #[async_trait]
    impl Tool for Echo {
        fn definition(&self) -> &ToolDefinition {
            &self.definition
        }

        async fn execute(&self, input: &ToolInput) -> Result<String, ToolError> {
            Ok(input.required_string("text")?.to_string())
        }
    }

    #[tokio::test]
    async fn test_tool_name_comes_from_definition() {
        let echo = Echo {
            definition: ToolDefinition::new("echo", "Echo text")
                .with_required_property("text", PropertySchema::string()),
        };
        assert_eq!(echo.name(), "echo");
        assert_eq!(echo.execute(&ToolInput::new().with("text", "hi")).await.unwrap(), "hi");
        assert!(echo.execute(&ToolInput::new()).await.is_err());
    }
}
