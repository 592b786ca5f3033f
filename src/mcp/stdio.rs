//! MCP over stdio via the rmcp SDK.
//!
//! Each tool server runs as a child process for the lifetime of the
//! orchestrator. The connection is established once at startup, its tool
//! list cached, and calls are forwarded through the shared peer handle.

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use rmcp::{
    ServiceExt,
    model::{CallToolRequestParams, RawContent},
    service::{Peer, RoleClient, RunningService},
    transport::TokioChildProcess,
};
use tokio::{process::Command, sync::Mutex};

use super::{ServerLauncher, ToolServer};
use crate::agent::types::ToolHandle;
use crate::discovery::ServerDescriptor;
use crate::error::RegistrationError;

/// Launches tool servers as child processes speaking MCP over stdio.
#[derive(Debug, Clone)]
pub struct McpLauncher {
    /// Program used to run scanned `.py` server files.
    interpreter: String,
    /// Upper bound on spawn + handshake + tool listing, per attempt.
    timeout: Duration,
    /// Total attempts per server before it is dropped.
    attempts: u32,
}

impl McpLauncher {
    pub fn new(interpreter: impl Into<String>, timeout: Duration, attempts: u32) -> Self {
        Self {
            interpreter: interpreter.into(),
            timeout,
            attempts: attempts.max(1),
        }
    }

    async fn connect(&self, server: &ServerDescriptor) -> Result<McpToolServer, RegistrationError> {
        let command = build_command(server, &self.interpreter);
        let transport = TokioChildProcess::new(command)
            .map_err(|e| RegistrationError::LaunchFailed(e.to_string()))?;

        let service: RunningService<RoleClient, ()> = ()
            .serve(transport)
            .await
            .map_err(|e| RegistrationError::LaunchFailed(format!("handshake failed: {e}")))?;

        let mcp_tools = match service.list_all_tools().await {
            Ok(tools) => tools,
            Err(e) => {
                let _ = service.cancel().await;
                return Err(RegistrationError::LaunchFailed(format!(
                    "tools/list failed: {e}"
                )));
            }
        };

        let tools = mcp_tools.iter().map(convert_tool).collect();
        let peer = service.peer().clone();

        Ok(McpToolServer {
            name: server.symbolic_name.clone(),
            peer,
            service: Mutex::new(Some(service)),
            tools,
        })
    }
}

#[async_trait]
impl ServerLauncher for McpLauncher {
    async fn launch(
        &self,
        server: &ServerDescriptor,
    ) -> Result<Arc<dyn ToolServer>, RegistrationError> {
        let mut last_error = RegistrationError::LaunchFailed("no launch attempted".to_string());

        for attempt in 1..=self.attempts {
            match tokio::time::timeout(self.timeout, self.connect(server)).await {
                Ok(Ok(connected)) => {
                    tracing::info!(
                        server = %server.symbolic_name,
                        tools = connected.tools.len(),
                        attempt,
                        "Connected to tool server"
                    );
                    return Ok(Arc::new(connected));
                }
                Ok(Err(e)) => last_error = e,
                Err(_) => {
                    last_error = RegistrationError::TimedOut {
                        timeout_secs: self.timeout.as_secs(),
                    }
                }
            }
            if attempt < self.attempts {
                tracing::warn!(
                    server = %server.symbolic_name,
                    attempt,
                    "Tool server launch failed, retrying: {last_error}"
                );
            }
        }

        Err(last_error)
    }
}

/// Build the child-process command for a descriptor.
///
/// Configured servers run their explicit command. Scanned `.py` files run
/// through `interpreter`; any other scanned file is executed directly.
pub fn build_command(server: &ServerDescriptor, interpreter: &str) -> Command {
    let mut command = match &server.command {
        Some(program) => {
            let mut command = Command::new(program);
            command.args(&server.args);
            command
        }
        None if is_python(&server.entry_point) => {
            let mut command = Command::new(interpreter);
            command.arg(&server.entry_point);
            command
        }
        None => Command::new(&server.entry_point),
    };
    command.envs(&server.env);
    command.kill_on_drop(true);
    command
}

fn is_python(path: &Path) -> bool {
    path.extension().is_some_and(|ext| ext == "py")
}

/// A connected MCP server peer with its cached tool list.
pub struct McpToolServer {
    name: String,
    peer: Peer<RoleClient>,
    /// Owning handle, taken on shutdown.
    service: Mutex<Option<RunningService<RoleClient, ()>>>,
    tools: Vec<ToolHandle>,
}

#[async_trait]
impl ToolServer for McpToolServer {
    fn tools(&self) -> &[ToolHandle] {
        &self.tools
    }

    async fn call_tool(&self, name: &str, arguments: serde_json::Value) -> String {
        if !self.tools.iter().any(|t| t.name == name) {
            return format!("mcp tool '{name}' not available on server '{}'", self.name);
        }

        let arguments = match arguments {
            serde_json::Value::Object(map) => Some(map),
            serde_json::Value::Null => None,
            other => return format!("invalid tool arguments: expected an object, got {other}"),
        };

        let mut params = CallToolRequestParams::new(name.to_string());
        params.arguments = arguments;

        match self.peer.call_tool(params).await {
            Ok(result) => {
                if result.is_error == Some(true) {
                    format!("mcp tool error: {}", extract_text(&result.content))
                } else {
                    extract_text(&result.content)
                }
            }
            Err(e) => format!("mcp call failed: {e}"),
        }
    }

    async fn shutdown(&self) {
        let Some(service) = self.service.lock().await.take() else {
            return;
        };
        match service.cancel().await {
            Ok(reason) => tracing::debug!(server = %self.name, ?reason, "Tool server stopped"),
            Err(e) => tracing::warn!(server = %self.name, "Error stopping tool server: {e}"),
        }
    }
}

/// Convert an rmcp tool definition into a [`ToolHandle`].
pub fn convert_tool(mcp_tool: &rmcp::model::Tool) -> ToolHandle {
    ToolHandle {
        name: mcp_tool.name.to_string(),
        description: mcp_tool
            .description
            .as_ref()
            .map(|d| d.to_string())
            .unwrap_or_default(),
        input_schema: serde_json::Value::Object(mcp_tool.input_schema.as_ref().clone()),
    }
}

/// Extract text content from MCP Content items.
fn extract_text(content: &[rmcp::model::Content]) -> String {
    content
        .iter()
        .filter_map(|c| match &c.raw {
            RawContent::Text(t) => Some(t.text.as_str()),
            _ => None,
        })
        .collect::<Vec<_>>()
        .join("\n")
}
