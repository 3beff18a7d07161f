//! Content blocks and the normalized model response.
//!
//! Every backend translates its wire format into these types, so the agent
//! loop never sees provider-specific shapes.
//!
//! ```text
//! ModelProvider::send() → ModelResponse { content: [Text | ToolUse ...] }
//!                                  │
//!                                  └─ has_tool_calls() → execute → ToolResult blocks
//! ```

use crate::tool::entities::ToolUse;
use crate::tool::input::ToolInput;
use crate::tool::value_objects::ToolResult;
use serde::{Deserialize, Serialize};

/// A single block of message content.
///
/// # Examples
///
/// ```
/// use zia_domain::session::response::ContentBlock;
/// use zia_domain::tool::ToolInput;
///
/// let text = ContentBlock::text("Let me check your calendar.");
/// assert_eq!(text.as_text(), Some("Let me check your calendar."));
///
/// let tool = ContentBlock::ToolUse {
///     id: "toolu_abc123".to_string(),
///     name: "list_events".to_string(),
///     input: ToolInput::new().with("day", "today"),
/// };
/// assert!(tool.as_tool_use().is_some());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ContentBlock {
    Text {
        text: String,
    },

    /// A tool call requested by the model. `id` is assigned by the backend
    /// and must be echoed by the matching `ToolResult`.
    ToolUse {
        id: String,
        name: String,
        #[serde(default)]
        input: ToolInput,
    },

    ToolResult {
        tool_use_id: String,
        content: String,
        #[serde(default, skip_serializing_if = "std::ops::Not::not")]
        is_error: bool,
    },

    /// Base64-encoded image (e.g. `image/png`)
    Image {
        media_type: String,
        data: String,
    },
}

impl ContentBlock {
    pub fn text(text: impl Into<String>) -> Self {
        ContentBlock::Text { text: text.into() }
    }

    pub fn image(media_type: impl Into<String>, data: impl Into<String>) -> Self {
        ContentBlock::Image {
            media_type: media_type.into(),
            data: data.into(),
        }
    }

    /// Returns the text content if this is a `Text` block.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            ContentBlock::Text { text } => Some(text),
            _ => None,
        }
    }

    /// Returns the call if this is a `ToolUse` block.
    pub fn as_tool_use(&self) -> Option<ToolUse> {
        match self {
            ContentBlock::ToolUse { id, name, input } => {
                Some(ToolUse::new(id.clone(), name.clone(), input.clone()))
            }
            _ => None,
        }
    }

    pub fn is_tool_use(&self) -> bool {
        matches!(self, ContentBlock::ToolUse { .. })
    }
}

impl From<ToolUse> for ContentBlock {
    fn from(call: ToolUse) -> Self {
        ContentBlock::ToolUse {
            id: call.id,
            name: call.name,
            input: call.input,
        }
    }
}

impl From<ToolResult> for ContentBlock {
    fn from(result: ToolResult) -> Self {
        ContentBlock::ToolResult {
            tool_use_id: result.tool_use_id,
            content: result.content,
            is_error: result.is_error,
        }
    }
}

/// Reason the model stopped generating.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StopReason {
    /// Natural end of response; the model is done.
    EndTurn,
    /// The model wants to call tools.
    ToolUse,
    /// Hit the token limit; the response may be truncated.
    MaxTokens,
    StopSequence,
    /// Provider-specific stop reason.
    Other(String),
}

impl StopReason {
    pub fn parse(raw: &str) -> Self {
        match raw {
            "end_turn" => StopReason::EndTurn,
            "tool_use" => StopReason::ToolUse,
            "max_tokens" => StopReason::MaxTokens,
            "stop_sequence" => StopReason::StopSequence,
            other => StopReason::Other(other.to_string()),
        }
    }
}

/// Token accounting reported by the backend.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Usage {
    pub input_tokens: u64,
    pub output_tokens: u64,
}

impl Usage {
    pub fn total(&self) -> u64 {
        self.input_tokens + self.output_tokens
    }
}

impl std::ops::AddAssign for Usage {
    fn add_assign(&mut self, other: Self) {
        self.input_tokens += other.input_tokens;
        self.output_tokens += other.output_tokens;
    }
}

/// A normalized response from a model backend.
///
/// # Examples
///
/// ```
/// use zia_domain::session::response::{ContentBlock, ModelResponse, StopReason};
/// use zia_domain::tool::ToolInput;
///
/// let response = ModelResponse::from_text("Hello!");
/// assert_eq!(response.text(), "Hello!");
/// assert!(!response.has_tool_calls());
///
/// let response = ModelResponse::new(vec![
///     ContentBlock::text("Playing now."),
///     ContentBlock::ToolUse {
///         id: "toolu_1".to_string(),
///         name: "play_music".to_string(),
///         input: ToolInput::new().with("query", "jazz"),
///     },
/// ])
/// .with_stop_reason(StopReason::ToolUse);
/// assert!(response.has_tool_calls());
/// assert_eq!(response.tool_uses().len(), 1);
/// ```
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ModelResponse {
    pub content: Vec<ContentBlock>,
    pub stop_reason: Option<StopReason>,
    pub usage: Usage,
    /// Model identifier (if returned by the API).
    pub model: Option<String>,
}

impl ModelResponse {
    pub fn new(content: Vec<ContentBlock>) -> Self {
        Self {
            content,
            ..Default::default()
        }
    }

    /// Create a text-only response.
    pub fn from_text(text: impl Into<String>) -> Self {
        Self::new(vec![ContentBlock::text(text)]).with_stop_reason(StopReason::EndTurn)
    }

    pub fn with_stop_reason(mut self, stop_reason: StopReason) -> Self {
        self.stop_reason = Some(stop_reason);
        self
    }

    pub fn with_usage(mut self, usage: Usage) -> Self {
        self.usage = usage;
        self
    }

    /// Concatenate all `Text` content blocks into a single string.
    pub fn text(&self) -> String {
        self.content
            .iter()
            .filter_map(|b| b.as_text())
            .collect::<Vec<_>>()
            .join("")
    }

    /// Extract all tool calls, in the order the model emitted them.
    pub fn tool_uses(&self) -> Vec<ToolUse> {
        self.content.iter().filter_map(|b| b.as_tool_use()).collect()
    }

    /// Returns `true` if the response contains any tool use requests.
    pub fn has_tool_calls(&self) -> bool {
        self.content.iter().any(|b| b.is_tool_use())
    }
}
