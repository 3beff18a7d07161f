//! Tool-provider processes over JSON-RPC stdio.
//!
//! A provider is an external program that advertises tools and executes
//! them on request. Each one runs as a child process speaking
//! newline-delimited JSON-RPC 2.0 on stdin/stdout.
//!
//! # Module Structure
//!
//! - [`protocol`]: message types and result mapping
//! - [`transport`]: frame splitting and message classification
//! - [`connection`]: one child process, its handshake and request correlation
//! - [`pool`]: supervision of all configured providers
//! - [`bridge`]: remote tools exposed through the `Tool` contract

pub mod bridge;
pub mod connection;
pub mod error;
pub mod pool;
pub mod protocol;
pub mod transport;

#[cfg(test)]
pub(crate) mod test_support;

pub use bridge::BridgedTool;
pub use connection::{ConnectionState, ProcessConnection};
pub use error::ProcessError;
pub use pool::{ProcessPool, ProviderStatus};
pub use protocol::{RemoteTool, ToolCallOutput};
