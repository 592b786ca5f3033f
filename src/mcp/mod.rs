//! Tool-server client seam.
//!
//! [`ServerLauncher`] turns a [`ServerDescriptor`] into a live
//! [`ToolServer`]. The production implementation, [`stdio::McpLauncher`],
//! spawns the server as a child process and speaks MCP over its stdio.
//! Tests substitute in-memory launchers.

pub mod stdio;

use std::sync::Arc;

use async_trait::async_trait;

use crate::agent::types::ToolHandle;
use crate::discovery::ServerDescriptor;
use crate::error::RegistrationError;

pub use stdio::McpLauncher;

/// A running tool server with a fixed set of advertised tools.
///
/// Shared read-mostly across every orchestrator invocation, so calls take
/// `&self`.
#[async_trait]
pub trait ToolServer: Send + Sync {
    /// Tools advertised at connection time.
    fn tools(&self) -> &[ToolHandle];

    /// Call a tool by name. Failures come back as text the model can read,
    /// never as `Err`.
    async fn call_tool(&self, name: &str, arguments: serde_json::Value) -> String;

    /// Stop the server. Safe to call more than once.
    async fn shutdown(&self);
}

/// Starts tool servers for the agent factory.
#[async_trait]
pub trait ServerLauncher: Send + Sync {
    async fn launch(
        &self,
        server: &ServerDescriptor,
    ) -> Result<Arc<dyn ToolServer>, RegistrationError>;
}
