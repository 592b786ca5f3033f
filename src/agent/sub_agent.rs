//! A sub-agent: one model binding plus the tools of one tool server.

use std::sync::Arc;

use async_trait::async_trait;
use genai::chat::ChatMessage;

use super::agent_loop::{AgentRun, RunOutcome, ToolDispatcher, run_agent};
use super::llm::ChatModel;
use super::types::AgentDescriptor;
use crate::error::AgentError;
use crate::mcp::ToolServer;

/// A registered sub-agent. Holds a shared handle to its tool server, which
/// lives as long as the orchestrator.
pub struct SubAgent {
    pub descriptor: AgentDescriptor,
    pub system_prompt: String,
    server: Arc<dyn ToolServer>,
    max_iterations: usize,
}

impl SubAgent {
    pub fn new(
        descriptor: AgentDescriptor,
        server: Arc<dyn ToolServer>,
        max_iterations: usize,
    ) -> Self {
        let system_prompt = build_sub_agent_prompt(&descriptor.name, &descriptor.server);
        Self {
            descriptor,
            system_prompt,
            server,
            max_iterations,
        }
    }

    pub fn name(&self) -> &str {
        &self.descriptor.name
    }

    pub fn server(&self) -> &Arc<dyn ToolServer> {
        &self.server
    }

    /// Answer `query` in a fresh conversation using this agent's tools.
    pub async fn invoke(
        &self,
        chat: &dyn ChatModel,
        query: &str,
    ) -> Result<RunOutcome, AgentError> {
        let run = AgentRun {
            agent: &self.descriptor.name,
            model: &self.descriptor.model,
            system_prompt: &self.system_prompt,
            tools: self
                .descriptor
                .tools
                .iter()
                .map(|t| t.to_genai_tool())
                .collect(),
            max_iterations: self.max_iterations,
        };
        let dispatcher = ServerDispatcher {
            server: self.server.as_ref(),
        };
        run_agent(chat, &run, vec![ChatMessage::user(query)], &dispatcher, None).await
    }
}

/// Forwards every tool call to the backing tool server.
struct ServerDispatcher<'a> {
    server: &'a dyn ToolServer,
}

#[async_trait]
impl ToolDispatcher for ServerDispatcher<'_> {
    async fn dispatch(&self, name: &str, arguments: serde_json::Value) -> String {
        self.server.call_tool(name, arguments).await
    }
}

/// System prompt for a sub-agent bound to a single tool server.
pub fn build_sub_agent_prompt(name: &str, server: &str) -> String {
    format!(
        "You are a specialized agent named '{name}' that can access tools from \
         the following MCP servers: {server}. \
         Use the available tools to help answer user questions effectively. \
         Provide clear, accurate responses based on the tool results."
    )
}
