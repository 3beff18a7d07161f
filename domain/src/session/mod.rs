//! Session domain module
//!
//! Conversation state: [`Message`]s made of [`ContentBlock`]s, the
//! [`Conversation`] that orders them, and the normalized [`ModelResponse`]
//! every model backend produces.

pub mod entities;
pub mod response;

pub use entities::{Conversation, Message, Role};
pub use response::{ContentBlock, ModelResponse, StopReason, Usage};
