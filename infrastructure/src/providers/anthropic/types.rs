//! Wire types of the Anthropic Messages API and their domain conversions
//!
//! The credential proxy forwards the same shapes, so both backends share
//! these types.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use zia_application::ProviderError;
use zia_domain::{
    ContentBlock, Message, ModelResponse, StopReason, ToolDefinition, ToolInput, Usage,
};

use crate::tools::tool_to_api_schema;

// ─── Request ─────────────────────────────────────────────────────

/// Body of a Messages API request.
///
/// `model` and `max_tokens` are omitted for the proxy, which fills them in
/// server side.
#[derive(Debug, Serialize)]
pub struct MessagesRequest<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,
    pub messages: Vec<WireMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub system: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tools: Option<Vec<Value>>,
}

impl<'a> MessagesRequest<'a> {
    pub fn new(
        messages: &[Message],
        system: Option<&'a str>,
        tools: Option<&[ToolDefinition]>,
    ) -> Self {
        Self {
            model: None,
            max_tokens: None,
            messages: messages.iter().map(WireMessage::from).collect(),
            system: system.filter(|s| !s.is_empty()),
            // Some backends reject an empty tool list.
            tools: tools
                .filter(|t| !t.is_empty())
                .map(|t| t.iter().map(tool_to_api_schema).collect()),
        }
    }

    pub fn with_model(mut self, model: &'a str, max_tokens: u32) -> Self {
        self.model = Some(model);
        self.max_tokens = Some(max_tokens);
        self
    }
}

#[derive(Debug, Serialize)]
pub struct WireMessage {
    pub role: &'static str,
    pub content: Vec<WireBlock>,
}

impl From<&Message> for WireMessage {
    fn from(message: &Message) -> Self {
        Self {
            role: message.role().as_str(),
            content: message.content().iter().map(WireBlock::from).collect(),
        }
    }
}

/// A content block as the API encodes it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum WireBlock {
    Text {
        text: String,
    },
    ToolUse {
        id: String,
        name: String,
        #[serde(default)]
        input: Value,
    },
    ToolResult {
        tool_use_id: String,
        content: String,
        #[serde(default, skip_serializing_if = "std::ops::Not::not")]
        is_error: bool,
    },
    Image {
        source: ImageSource,
    },
    /// Block types we do not model (e.g. `thinking`)
    #[serde(other)]
    Unsupported,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImageSource {
    #[serde(rename = "type")]
    pub source_type: String,
    pub media_type: String,
    pub data: String,
}

impl From<&ContentBlock> for WireBlock {
    fn from(block: &ContentBlock) -> Self {
        match block {
            ContentBlock::Text { text } => WireBlock::Text { text: text.clone() },
            ContentBlock::ToolUse { id, name, input } => WireBlock::ToolUse {
                id: id.clone(),
                name: name.clone(),
                input: input.clone().into_value(),
            },
            ContentBlock::ToolResult {
                tool_use_id,
                content,
                is_error,
            } => WireBlock::ToolResult {
                tool_use_id: tool_use_id.clone(),
                content: content.clone(),
                is_error: *is_error,
            },
            ContentBlock::Image { media_type, data } => WireBlock::Image {
                source: ImageSource {
                    source_type: "base64".to_string(),
                    media_type: media_type.clone(),
                    data: data.clone(),
                },
            },
        }
    }
}

impl WireBlock {
    fn into_domain(self) -> Option<ContentBlock> {
        match self {
            WireBlock::Text { text } => Some(ContentBlock::Text { text }),
            WireBlock::ToolUse { id, name, input } => {
                let input = ToolInput::from_value(input).unwrap_or_else(|e| {
                    tracing::warn!(tool = %name, error = %e, "Tool input is not an object");
                    ToolInput::new()
                });
                Some(ContentBlock::ToolUse { id, name, input })
            }
            WireBlock::ToolResult {
                tool_use_id,
                content,
                is_error,
            } => Some(ContentBlock::ToolResult {
                tool_use_id,
                content,
                is_error,
            }),
            WireBlock::Image { source } => Some(ContentBlock::Image {
                media_type: source.media_type,
                data: source.data,
            }),
            WireBlock::Unsupported => None,
        }
    }
}

// ─── Response ────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct MessagesResponse {
    #[serde(default)]
    pub model: Option<String>,
    #[serde(default)]
    pub content: Vec<WireBlock>,
    #[serde(default)]
    pub stop_reason: Option<String>,
    #[serde(default)]
    pub usage: Option<WireUsage>,
}

#[derive(Debug, Default, Deserialize)]
pub struct WireUsage {
    #[serde(default)]
    pub input_tokens: u64,
    #[serde(default)]
    pub output_tokens: u64,
}

impl MessagesResponse {
    pub fn into_domain(self) -> ModelResponse {
        let usage = self.usage.unwrap_or_default();
        ModelResponse {
            content: self
                .content
                .into_iter()
                .filter_map(WireBlock::into_domain)
                .collect(),
            stop_reason: self.stop_reason.as_deref().map(StopReason::parse),
            usage: Usage {
                input_tokens: usage.input_tokens,
                output_tokens: usage.output_tokens,
            },
            model: self.model,
        }
    }
}

/// Decode a successful response body.
pub fn parse_response(body: &str) -> Result<ModelResponse, ProviderError> {
    serde_json::from_str::<MessagesResponse>(body)
        .map(MessagesResponse::into_domain)
        .map_err(|e| ProviderError::Decode(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use zia_domain::{PropertySchema, ToolResult, ToolUse};

    #[test]
    fn test_request_shape() {
        let messages = vec![
            Message::user("play jazz"),
            Message::assistant(vec![
                ContentBlock::text("On it."),
                ToolUse::new("toolu_1", "play", ToolInput::new().with("genre", "jazz")).into(),
            ]),
            Message::tool_results(vec![ToolResult::error("toolu_1", "no speakers")]),
        ];
        let tools = vec![
            ToolDefinition::new("play", "Play music")
                .with_required_property("genre", PropertySchema::string()),
        ];

        let request = MessagesRequest::new(&messages, Some("Be brief."), Some(tools.as_slice()))
            .with_model("claude-sonnet-4-20250514", 4096);
        let value = serde_json::to_value(&request).unwrap();

        assert_eq!(value["model"], "claude-sonnet-4-20250514");
        assert_eq!(value["max_tokens"], 4096);
        assert_eq!(value["system"], "Be brief.");
        assert_eq!(value["messages"][0]["role"], "user");
        assert_eq!(
            value["messages"][0]["content"][0],
            json!({"type": "text", "text": "play jazz"})
        );
        assert_eq!(
            value["messages"][1]["content"][1],
            json!({"type": "tool_use", "id": "toolu_1", "name": "play", "input": {"genre": "jazz"}})
        );
        assert_eq!(
            value["messages"][2]["content"][0],
            json!({"type": "tool_result", "tool_use_id": "toolu_1", "content": "no speakers", "is_error": true})
        );
        assert_eq!(value["tools"][0]["input_schema"]["required"], json!(["genre"]));
    }

    #[test]
    fn test_empty_tools_and_system_are_omitted() {
        let messages = vec![Message::user("hi")];
        let no_tools: Vec<ToolDefinition> = Vec::new();
        let request = MessagesRequest::new(&messages, Some(""), Some(no_tools.as_slice()));
        let value = serde_json::to_value(&request).unwrap();
        assert!(value.get("tools").is_none());
        assert!(value.get("system").is_none());
        assert!(value.get("model").is_none());
    }

    #[test]
    fn test_image_block_uses_base64_source() {
        let message = Message::user_with_image("what is this?", "image/png", "aGVsbG8=");
        let wire = WireMessage::from(&message);
        let value = serde_json::to_value(&wire).unwrap();
        assert_eq!(
            value["content"][0],
            json!({"type": "image", "source": {"type": "base64", "media_type": "image/png", "data": "aGVsbG8="}})
        );
    }

    #[test]
    fn test_parse_response() {
        let body = json!({
            "id": "msg_1",
            "type": "message",
            "role": "assistant",
            "model": "claude-sonnet-4-20250514",
            "content": [
                {"type": "thinking", "thinking": "hmm"},
                {"type": "text", "text": "Checking."},
                {"type": "tool_use", "id": "toolu_9", "name": "weather", "input": {"city": "Oslo"}}
            ],
            "stop_reason": "tool_use",
            "usage": {"input_tokens": 12, "output_tokens": 34}
        })
        .to_string();

        let response = parse_response(&body).unwrap();
        assert_eq!(response.content.len(), 2);
        assert_eq!(response.text(), "Checking.");
        assert!(response.has_tool_calls());
        assert_eq!(response.tool_uses()[0].input.get("city"), Some(&json!("Oslo")));
        assert_eq!(response.stop_reason, Some(StopReason::ToolUse));
        assert_eq!(response.usage.total(), 46);
        assert_eq!(response.model.as_deref(), Some("claude-sonnet-4-20250514"));
    }

    #[test]
    fn test_parse_response_rejects_garbage() {
        let err = parse_response("<html>").unwrap_err();
        assert!(matches!(err, ProviderError::Decode(_)));
    }
}
