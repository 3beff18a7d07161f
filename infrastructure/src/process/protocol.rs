//! JSON-RPC protocol types for tool-provider processes.
//!
//! Messages are JSON-RPC 2.0 objects, one per line, over the child's
//! stdin/stdout.
//!
//! # Protocol Overview
//!
//! - **Requests**: client → provider (`initialize`, `tools/list`, `tools/call`)
//! - **Notifications**: client → provider (`notifications/initialized`)
//! - **Responses**: provider → client (result or error, echoing the id)
//! - **Server requests**: provider → client (`ping`), answered by the reader task

use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

/// Protocol revision sent in `initialize`.
pub const PROTOCOL_VERSION: &str = "2024-11-05";

/// JSON-RPC "method not found" error code.
pub const METHOD_NOT_FOUND: i64 = -32601;

/// JSON-RPC request
#[derive(Debug, Clone, Serialize)]
pub struct JsonRpcRequest {
    pub jsonrpc: &'static str,
    pub id: u64,
    pub method: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub params: Option<Value>,
}

impl JsonRpcRequest {
    /// Ids are assigned by the connection's pending table.
    pub fn new(id: u64, method: impl Into<String>, params: Option<Value>) -> Self {
        Self {
            jsonrpc: "2.0",
            id,
            method: method.into(),
            params,
        }
    }
}

/// JSON-RPC notification (no id, no response expected)
#[derive(Debug, Clone, Serialize)]
pub struct JsonRpcNotification {
    pub jsonrpc: &'static str,
    pub method: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub params: Option<Value>,
}

impl JsonRpcNotification {
    pub fn new(method: impl Into<String>, params: Option<Value>) -> Self {
        Self {
            jsonrpc: "2.0",
            method: method.into(),
            params,
        }
    }
}

/// JSON-RPC response received from the provider
#[derive(Debug, Clone, Deserialize)]
pub struct JsonRpcResponse {
    #[serde(default)]
    pub id: Option<Value>,
    #[serde(default)]
    pub result: Option<Value>,
    #[serde(default)]
    pub error: Option<RpcError>,
}

/// JSON-RPC error object
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RpcError {
    pub code: i64,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

/// JSON-RPC response sent back to the provider for a server-initiated request
#[derive(Debug, Clone, Serialize)]
pub struct JsonRpcResponseOut {
    pub jsonrpc: &'static str,
    /// Echoes the provider's id verbatim (number or string)
    pub id: Value,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<RpcError>,
}

impl JsonRpcResponseOut {
    pub fn result(id: Value, result: Value) -> Self {
        Self {
            jsonrpc: "2.0",
            id,
            result: Some(result),
            error: None,
        }
    }

    pub fn error(id: Value, code: i64, message: impl Into<String>) -> Self {
        Self {
            jsonrpc: "2.0",
            id,
            result: None,
            error: Some(RpcError {
                code,
                message: message.into(),
                data: None,
            }),
        }
    }
}

/// Client identity sent in `initialize`
#[derive(Debug, Clone, Serialize)]
pub struct ClientInfo {
    pub name: String,
    pub version: String,
}

/// `initialize` request parameters
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InitializeParams {
    pub protocol_version: String,
    pub capabilities: Value,
    pub client_info: ClientInfo,
}

impl InitializeParams {
    pub fn new(client_name: impl Into<String>, client_version: impl Into<String>) -> Self {
        Self {
            protocol_version: PROTOCOL_VERSION.to_string(),
            capabilities: json!({}),
            client_info: ClientInfo {
                name: client_name.into(),
                version: client_version.into(),
            },
        }
    }
}

/// A tool advertised by a provider in `tools/list`
#[derive(Debug, Clone, PartialEq)]
pub struct RemoteTool {
    pub name: String,
    pub description: Option<String>,
    /// JSON-Schema-like parameter shape, kept raw
    pub input_schema: Option<Value>,
}

/// Parsed page of a `tools/list` result.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ToolsPage {
    pub tools: Vec<RemoteTool>,
    pub next_cursor: Option<String>,
}

/// Parse a `tools/list` result.
///
/// A missing or non-array `tools` field yields an empty page; entries
/// without a string `name` are skipped.
pub fn parse_tools_list(result: &Value) -> ToolsPage {
    let tools = result
        .get("tools")
        .and_then(Value::as_array)
        .map(|entries| {
            entries
                .iter()
                .filter_map(|entry| {
                    let name = entry.get("name").and_then(Value::as_str)?;
                    Some(RemoteTool {
                        name: name.to_string(),
                        description: entry
                            .get("description")
                            .and_then(Value::as_str)
                            .map(str::to_string),
                        input_schema: entry.get("inputSchema").filter(|s| s.is_object()).cloned(),
                    })
                })
                .collect()
        })
        .unwrap_or_default();

    let next_cursor = result
        .get("nextCursor")
        .and_then(Value::as_str)
        .filter(|c| !c.is_empty())
        .map(str::to_string);

    ToolsPage { tools, next_cursor }
}

/// `tools/call` request parameters
pub fn tools_call_params(name: &str, arguments: Value) -> Value {
    let arguments = match arguments {
        Value::Null => Value::Object(Default::default()),
        other => other,
    };
    json!({ "name": name, "arguments": arguments })
}

/// Outcome of a `tools/call`, already flattened for the model.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolCallOutput {
    pub content: String,
    pub is_error: bool,
}

impl ToolCallOutput {
    /// Map a `tools/call` result.
    ///
    /// Text blocks are joined with newlines and trimmed; `isError` defaults
    /// to false, and a `content` array with no text blocks yields empty text.
    /// A result without a `content` array is re-serialized verbatim as
    /// best-effort degradation.
    pub fn from_result(result: &Value) -> Self {
        let is_error = result
            .get("isError")
            .and_then(Value::as_bool)
            .unwrap_or(false);

        let texts: Option<Vec<&str>> = result
            .get("content")
            .and_then(Value::as_array)
            .map(|blocks| {
                blocks
                    .iter()
                    .filter(|b| b.get("type").and_then(Value::as_str).unwrap_or("text") == "text")
                    .filter_map(|b| b.get("text").and_then(Value::as_str))
                    .collect()
            });

        match texts {
            Some(texts) => Self {
                content: texts.join("\n").trim().to_string(),
                is_error,
            },
            None => Self {
                content: serde_json::to_string(result).unwrap_or_else(|_| result.to_string()),
                is_error,
            },
        }
    }

    /// An RPC-level error becomes an error result.
    pub fn from_rpc_error(code: i64, message: &str) -> Self {
        Self {
            content: format!("JSON-RPC error (code {}): {}", code, message),
            is_error: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_serializes_with_id_and_params() {
        let req = JsonRpcRequest::new(7, "tools/list", None);
        assert_eq!(
            serde_json::to_value(&req).unwrap(),
            json!({"jsonrpc": "2.0", "id": 7, "method": "tools/list"})
        );
    }

    #[test]
    fn notification_has_no_id() {
        let n = JsonRpcNotification::new("notifications/initialized", None);
        let value = serde_json::to_value(&n).unwrap();
        assert!(value.get("id").is_none());
        assert_eq!(value["method"], "notifications/initialized");
    }

    #[test]
    fn initialize_params_are_camel_case() {
        let value = serde_json::to_value(InitializeParams::new("zia", "0.4.0")).unwrap();
        assert_eq!(value["protocolVersion"], PROTOCOL_VERSION);
        assert_eq!(value["clientInfo"]["name"], "zia");
        assert!(value["capabilities"].is_object());
    }

    #[test]
    fn parse_tools_list_full_and_partial_entries() {
        let page = parse_tools_list(&json!({
            "tools": [
                {"name": "echo", "description": "Echo", "inputSchema": {"type": "object"}},
                {"name": "bare"},
                {"description": "no name"}
            ],
            "nextCursor": "page2"
        }));
        assert_eq!(page.tools.len(), 2);
        assert_eq!(page.tools[0].description.as_deref(), Some("Echo"));
        assert!(page.tools[1].input_schema.is_none());
        assert_eq!(page.next_cursor.as_deref(), Some("page2"));
    }

    #[test]
    fn parse_tools_list_missing_field_is_empty() {
        assert_eq!(parse_tools_list(&json!({})), ToolsPage::default());
        assert_eq!(parse_tools_list(&Value::Null), ToolsPage::default());
    }

    #[test]
    fn call_output_joins_text_blocks() {
        let out = ToolCallOutput::from_result(&json!({
            "content": [
                {"type": "text", "text": "  line one"},
                {"type": "image", "data": "..."},
                {"type": "text", "text": "line two \n"}
            ]
        }));
        assert_eq!(out.content, "line one\nline two");
        assert!(!out.is_error);
    }

    #[test]
    fn call_output_honours_is_error() {
        let out = ToolCallOutput::from_result(&json!({
            "content": [{"type": "text", "text": "no such file"}],
            "isError": true
        }));
        assert!(out.is_error);
        assert_eq!(out.content, "no such file");
    }

    #[test]
    fn call_output_empty_content_is_empty_text() {
        let out = ToolCallOutput::from_result(&json!({"content": []}));
        assert_eq!(out.content, "");
        assert!(!out.is_error);

        let out = ToolCallOutput::from_result(&json!({"content": [], "isError": true}));
        assert_eq!(out.content, "");
        assert!(out.is_error);
    }

    #[test]
    fn call_output_without_text_blocks_is_empty_text() {
        let out = ToolCallOutput::from_result(&json!({
            "content": [{"type": "image", "data": "AAAA"}]
        }));
        assert_eq!(out.content, "");
    }

    #[test]
    fn call_output_content_not_an_array_keeps_raw_json() {
        let raw = json!({"content": "plain"});
        let out = ToolCallOutput::from_result(&raw);
        assert_eq!(out.content, r#"{"content":"plain"}"#);
    }

    #[test]
    fn call_output_falls_back_to_raw_json() {
        let raw = json!({"value": 42});
        let out = ToolCallOutput::from_result(&raw);
        assert_eq!(out.content, r#"{"value":42}"#);
        assert!(!out.is_error);
    }

    #[test]
    fn tools_call_params_default_arguments() {
        assert_eq!(
            tools_call_params("echo", Value::Null),
            json!({"name": "echo", "arguments": {}})
        );
    }

    #[test]
    fn error_response_out_shape() {
        let out = JsonRpcResponseOut::error(json!("abc"), METHOD_NOT_FOUND, "nope");
        assert_eq!(
            serde_json::to_value(&out).unwrap(),
            json!({"jsonrpc": "2.0", "id": "abc", "error": {"code": -32601, "message": "nope"}})
        );
    }
}
