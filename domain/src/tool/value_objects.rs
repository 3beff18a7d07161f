//! Tool domain value objects: immutable result and error types
//!
//! Every tool call ends in exactly one [`ToolResult`]. Failures are carried
//! as data (`is_error = true`) so the model sees them as ordinary tool output
//! and can explain or retry.

use serde::{Deserialize, Serialize};

/// Error that occurred during tool execution.
///
/// | Code | Description |
/// |------|-------------|
/// | `NOT_FOUND` | Unknown tool or resource |
/// | `INVALID_ARGUMENT` | Missing or wrongly typed parameter |
/// | `EXECUTION_FAILED` | Runtime failure (I/O, subprocess, panic) |
/// | `PERMISSION_DENIED` | Access denied |
/// | `UNAVAILABLE` | Capability is gone (e.g. provider process died) |
/// | `TIMEOUT` | Operation timed out |
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolError {
    /// Error code (e.g., "NOT_FOUND", "PERMISSION_DENIED")
    pub code: String,
    /// Human-readable error message
    pub message: String,
    /// Additional details
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl ToolError {
    pub const NOT_FOUND: &'static str = "NOT_FOUND";
    pub const INVALID_ARGUMENT: &'static str = "INVALID_ARGUMENT";
    pub const EXECUTION_FAILED: &'static str = "EXECUTION_FAILED";
    pub const PERMISSION_DENIED: &'static str = "PERMISSION_DENIED";
    pub const UNAVAILABLE: &'static str = "UNAVAILABLE";
    pub const TIMEOUT: &'static str = "TIMEOUT";

    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            details: None,
        }
    }

    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }

    // Common error constructors
    pub fn not_found(resource: impl Into<String>) -> Self {
        Self::new(
            Self::NOT_FOUND,
            format!("Resource not found: {}", resource.into()),
        )
    }

    pub fn unknown_tool(name: &str) -> Self {
        Self::new(Self::NOT_FOUND, format!("Unknown tool: {}", name))
    }

    pub fn permission_denied(resource: impl Into<String>) -> Self {
        Self::new(
            Self::PERMISSION_DENIED,
            format!("Permission denied: {}", resource.into()),
        )
    }

    pub fn invalid_argument(message: impl Into<String>) -> Self {
        Self::new(Self::INVALID_ARGUMENT, message)
    }

    pub fn execution_failed(message: impl Into<String>) -> Self {
        Self::new(Self::EXECUTION_FAILED, message)
    }

    pub fn unavailable(message: impl Into<String>) -> Self {
        Self::new(Self::UNAVAILABLE, message)
    }

    pub fn timeout(operation: impl Into<String>) -> Self {
        Self::new(
            Self::TIMEOUT,
            format!("Operation timed out: {}", operation.into()),
        )
    }
}

impl std::fmt::Display for ToolError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}] {}", self.code, self.message)?;
        if let Some(details) = &self.details {
            write!(f, " ({})", details)?;
        }
        Ok(())
    }
}

impl std::error::Error for ToolError {}

/// Answer to one [`ToolUse`](super::entities::ToolUse).
///
/// `tool_use_id` echoes the id of the request so the model backend can
/// correlate the pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolResult {
    pub tool_use_id: String,
    pub content: String,
    #[serde(default)]
    pub is_error: bool,
}

impl ToolResult {
    /// Create a successful result
    pub fn success(tool_use_id: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            tool_use_id: tool_use_id.into(),
            content: content.into(),
            is_error: false,
        }
    }

    /// Create a failed result with a plain message
    pub fn error(tool_use_id: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            tool_use_id: tool_use_id.into(),
            content: message.into(),
            is_error: true,
        }
    }

    /// Create a failed result from a [`ToolError`]
    pub fn failure(tool_use_id: impl Into<String>, error: &ToolError) -> Self {
        Self::error(tool_use_id, error.to_string())
    }

    pub fn is_success(&self) -> bool {
        !self.is_error
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tool_error() {
        let err = ToolError::not_found("/path/to/file").with_details("File does not exist");

        assert_eq!(err.code, "NOT_FOUND");
        assert!(err.message.contains("/path/to/file"));
        assert_eq!(
            err.to_string(),
            "[NOT_FOUND] Resource not found: /path/to/file (File does not exist)"
        );
    }

    #[test]
    fn test_tool_result_success() {
        let result = ToolResult::success("toolu_1", "file contents");

        assert!(result.is_success());
        assert_eq!(result.content, "file contents");
        assert_eq!(result.tool_use_id, "toolu_1");
    }

    #[test]
    fn test_tool_result_failure_carries_message() {
        let result = ToolResult::failure("toolu_2", &ToolError::unknown_tool("calendar"));

        assert!(!result.is_success());
        assert!(result.is_error);
        assert!(result.content.contains("calendar"));
        assert!(result.content.contains("NOT_FOUND"));
    }

    #[test]
    fn test_is_error_defaults_to_false() {
        let result: ToolResult =
            serde_json::from_str(r#"{"tool_use_id":"a","content":"ok"}"#).unwrap();
        assert!(!result.is_error);
    }
}
