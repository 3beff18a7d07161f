//! Anthropic Messages API backend
//!
//! [`types`] holds the wire format shared with the credential proxy;
//! [`AnthropicProvider`] calls the API directly with an API key.

mod client;
pub mod types;

pub use client::{AnthropicConfig, AnthropicProvider};
