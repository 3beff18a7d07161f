//! Session domain entities

use super::response::ContentBlock;
use crate::core::error::DomainError;
use crate::tool::entities::ToolUse;
use crate::tool::value_objects::ToolResult;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use uuid::Uuid;

/// Role of a message in a conversation
///
/// The system instruction is passed to the backend separately and is never
/// stored as a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Assistant => "assistant",
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A message in a conversation (Entity)
///
/// Immutable once created; follow-up content is a new message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    id: Uuid,
    role: Role,
    content: Vec<ContentBlock>,
    created_at: DateTime<Utc>,
}

impl Message {
    pub fn new(role: Role, content: Vec<ContentBlock>) -> Self {
        Self {
            id: Uuid::new_v4(),
            role,
            content,
            created_at: Utc::now(),
        }
    }

    pub fn user(text: impl Into<String>) -> Self {
        Self::new(Role::User, vec![ContentBlock::text(text)])
    }

    /// User message with an image placed before the text, the order
    /// vision-capable backends expect.
    pub fn user_with_image(
        text: impl Into<String>,
        media_type: impl Into<String>,
        data: impl Into<String>,
    ) -> Self {
        Self::new(
            Role::User,
            vec![ContentBlock::image(media_type, data), ContentBlock::text(text)],
        )
    }

    pub fn assistant(content: Vec<ContentBlock>) -> Self {
        Self::new(Role::Assistant, content)
    }

    /// All results answering one assistant turn, in one user message.
    pub fn tool_results(results: Vec<ToolResult>) -> Self {
        Self::new(
            Role::User,
            results.into_iter().map(ContentBlock::from).collect(),
        )
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn role(&self) -> Role {
        self.role
    }

    pub fn content(&self) -> &[ContentBlock] {
        &self.content
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Concatenated text blocks.
    pub fn text(&self) -> String {
        self.content
            .iter()
            .filter_map(|b| b.as_text())
            .collect::<Vec<_>>()
            .join("")
    }

    pub fn tool_uses(&self) -> Vec<ToolUse> {
        self.content.iter().filter_map(|b| b.as_tool_use()).collect()
    }

    pub fn tool_result_count(&self) -> usize {
        self.content
            .iter()
            .filter(|b| matches!(b, ContentBlock::ToolResult { .. }))
            .count()
    }
}

/// Ordered message history of one conversation (Entity)
///
/// Owned by the caller of the agent loop and only appended to.
#[derive(Debug, Clone, Default)]
pub struct Conversation {
    messages: Vec<Message>,
    tool_use_ids: HashSet<String>,
}

impl Conversation {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a message after checking the history invariants:
    ///
    /// - user messages are not empty
    /// - `tool_result` blocks appear only in user messages
    /// - every `tool_result` answers a `tool_use` seen earlier
    pub fn push(&mut self, message: Message) -> Result<(), DomainError> {
        if message.role == Role::User && message.content.is_empty() {
            return Err(DomainError::EmptyMessage);
        }
        for block in &message.content {
            if let ContentBlock::ToolResult { tool_use_id, .. } = block {
                if message.role != Role::User {
                    return Err(DomainError::ToolResultOutsideUserMessage);
                }
                if !self.tool_use_ids.contains(tool_use_id) {
                    return Err(DomainError::UnknownToolUse(tool_use_id.clone()));
                }
            }
        }
        for block in &message.content {
            if let ContentBlock::ToolUse { id, .. } = block {
                self.tool_use_ids.insert(id.clone());
            }
        }
        self.messages.push(message);
        Ok(())
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn last(&self) -> Option<&Message> {
        self.messages.last()
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn clear(&mut self) {
        self.messages.clear();
        self.tool_use_ids.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tool::input::ToolInput;

    fn tool_call(id: &str) -> ContentBlock {
        ContentBlock::ToolUse {
            id: id.to_string(),
            name: "echo".to_string(),
            input: ToolInput::new(),
        }
    }

    #[test]
    fn test_message_ids_are_unique() {
        let a = Message::user("hi");
        let b = Message::user("hi");
        assert_ne!(a.id(), b.id());
        assert_eq!(a.role(), Role::User);
        assert_eq!(a.text(), "hi");
    }

    #[test]
    fn test_user_with_image_puts_image_first() {
        let msg = Message::user_with_image("what is this?", "image/png", "aGVsbG8=");
        assert!(matches!(msg.content()[0], ContentBlock::Image { .. }));
        assert_eq!(msg.text(), "what is this?");
    }

    #[test]
    fn test_push_accepts_answered_tool_use() {
        let mut conversation = Conversation::new();
        conversation.push(Message::user("run it")).unwrap();
        conversation
            .push(Message::assistant(vec![tool_call("t1"), tool_call("t2")]))
            .unwrap();
        conversation
            .push(Message::tool_results(vec![
                ToolResult::success("t1", "a"),
                ToolResult::error("t2", "b"),
            ]))
            .unwrap();

        assert_eq!(conversation.len(), 3);
        assert_eq!(conversation.last().unwrap().tool_result_count(), 2);
    }

    #[test]
    fn test_push_rejects_unknown_tool_use_id() {
        let mut conversation = Conversation::new();
        let err = conversation
            .push(Message::tool_results(vec![ToolResult::success("nope", "x")]))
            .unwrap_err();
        assert_eq!(err, DomainError::UnknownToolUse("nope".to_string()));
        assert!(conversation.is_empty());
    }

    #[test]
    fn test_push_rejects_tool_result_from_assistant() {
        let mut conversation = Conversation::new();
        conversation.push(Message::assistant(vec![tool_call("t1")])).unwrap();
        let err = conversation
            .push(Message::assistant(vec![ToolResult::success("t1", "x").into()]))
            .unwrap_err();
        assert_eq!(err, DomainError::ToolResultOutsideUserMessage);
    }

    #[test]
    fn test_push_rejects_empty_user_message() {
        let mut conversation = Conversation::new();
        assert_eq!(
            conversation.push(Message::new(Role::User, vec![])),
            Err(DomainError::EmptyMessage)
        );
        conversation.push(Message::assistant(vec![])).unwrap();
    }

    #[test]
    fn test_clear_forgets_tool_uses() {
        let mut conversation = Conversation::new();
        conversation.push(Message::assistant(vec![tool_call("t1")])).unwrap();
        conversation.clear();
        assert!(
            conversation
                .push(Message::tool_results(vec![ToolResult::success("t1", "x")]))
                .is_err()
        );
    }
}
