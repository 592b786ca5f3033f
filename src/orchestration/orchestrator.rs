//! The assembled orchestrator: persona plus delegation policy, with one
//! delegation tool per registered sub-agent.

use async_trait::async_trait;
use genai::chat::ChatMessage;
use serde::Serialize;
use serde_json::json;
use tokio::sync::mpsc::UnboundedSender;

use super::persona::compose_system_prompt;
use crate::agent::agent_loop::{AgentRun, RunEvent, RunOutcome, ToolDispatcher, run_agent};
use crate::agent::delegation::{build_delegation_policy, delegation_tool, delegation_tool_name};
use crate::agent::llm::ChatModel;
use crate::agent::sub_agent::SubAgent;
use crate::agent::types::{AgentDescriptor, ModelSpec};
use crate::error::AgentError;

/// Name of the top-level agent in events and logs.
pub const ORCHESTRATOR_NAME: &str = "orchestrator";

/// Returned by [`Orchestrator::delegate`] when a sub-agent ends without text.
pub const EMPTY_REPLY: &str = "Agent completed the task but provided no response.";

/// One entry of the capability report.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct AgentCapability {
    pub agent: String,
    pub server: String,
    pub tools: Vec<ToolSummary>,
    pub tool_count: usize,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ToolSummary {
    pub name: String,
    pub description: String,
}

/// Top-level agent. Immutable once assembled; the sub-agent set is fixed
/// for the life of the process.
pub struct Orchestrator {
    descriptor: AgentDescriptor,
    system_prompt: String,
    sub_agents: Vec<SubAgent>,
    max_iterations: usize,
}

impl Orchestrator {
    /// Combine the persona directive with the delegation policy for
    /// `sub_agents` and bind one delegation tool per sub-agent.
    pub fn assemble(
        model: ModelSpec,
        persona: &str,
        sub_agents: Vec<SubAgent>,
        max_iterations: usize,
    ) -> Self {
        let agent_descriptors: Vec<AgentDescriptor> =
            sub_agents.iter().map(|a| a.descriptor.clone()).collect();
        let policy = build_delegation_policy(&agent_descriptors);
        let system_prompt = compose_system_prompt(persona, &policy);

        let descriptor = AgentDescriptor {
            name: ORCHESTRATOR_NAME.to_string(),
            server: String::new(),
            model,
            tools: agent_descriptors.iter().map(delegation_tool).collect(),
        };

        let names: Vec<&str> = sub_agents.iter().map(|a| a.name()).collect();
        tracing::info!(agents = ?names, "Assembled orchestrator");
        tracing::info!("Delegation options:\n{policy}");

        Self {
            descriptor,
            system_prompt,
            sub_agents,
            max_iterations,
        }
    }

    pub fn descriptor(&self) -> &AgentDescriptor {
        &self.descriptor
    }

    pub fn system_prompt(&self) -> &str {
        &self.system_prompt
    }

    pub fn sub_agents(&self) -> &[SubAgent] {
        &self.sub_agents
    }

    /// Names of the delegation tools offered to the orchestrator model.
    pub fn orchestrator_tools(&self) -> Vec<String> {
        self.descriptor.tools.iter().map(|t| t.name.clone()).collect()
    }

    /// Per sub-agent capability report, in registration order.
    pub fn capabilities(&self) -> Vec<AgentCapability> {
        self.sub_agents
            .iter()
            .map(|agent| AgentCapability {
                agent: agent.descriptor.name.clone(),
                server: agent.descriptor.server.clone(),
                tools: agent
                    .descriptor
                    .tools
                    .iter()
                    .map(|t| ToolSummary {
                        name: t.name.clone(),
                        description: t.description.clone(),
                    })
                    .collect(),
                tool_count: agent.descriptor.tools.len(),
            })
            .collect()
    }

    /// Run the orchestrator on `history`, which ends with the new user
    /// message. Delegation tool calls run the matching sub-agent.
    pub async fn invoke(
        &self,
        chat: &dyn ChatModel,
        history: Vec<ChatMessage>,
        events: Option<&UnboundedSender<RunEvent>>,
    ) -> Result<RunOutcome, AgentError> {
        let run = AgentRun {
            agent: ORCHESTRATOR_NAME,
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
        let dispatcher = DelegationDispatcher {
            orchestrator: self,
            chat,
        };
        run_agent(chat, &run, history, &dispatcher, events).await
    }

    /// Hand `query` to the sub-agent named `agent_name` and return its
    /// answer. Failures are returned as text so the orchestrator model can
    /// react to them.
    pub async fn delegate(&self, chat: &dyn ChatModel, agent_name: &str, query: &str) -> String {
        let Some(agent) = self.sub_agents.iter().find(|a| a.name() == agent_name) else {
            return unknown_tool(&delegation_tool_name(agent_name));
        };

        tracing::info!(agent = agent_name, "Delegating query");
        match agent.invoke(chat, query).await {
            Ok(outcome) if outcome.reply.is_empty() => EMPTY_REPLY.to_string(),
            Ok(outcome) => outcome.reply,
            Err(e) => {
                tracing::error!(agent = agent_name, "Delegation failed: {e}");
                format!("Error occurred while consulting {agent_name}: {e}")
            }
        }
    }

    /// Stop every tool server.
    pub async fn shutdown(&self) {
        for agent in &self.sub_agents {
            agent.server().shutdown().await;
        }
        tracing::info!("Orchestrator shut down");
    }
}

fn unknown_tool(name: &str) -> String {
    json!({ "error": format!("Unknown tool: {name}") }).to_string()
}

/// Routes `delegate_to_*` tool calls from the orchestrator model.
struct DelegationDispatcher<'a> {
    orchestrator: &'a Orchestrator,
    chat: &'a dyn ChatModel,
}

#[async_trait]
impl ToolDispatcher for DelegationDispatcher<'_> {
    async fn dispatch(&self, name: &str, arguments: serde_json::Value) -> String {
        let Some(agent_name) = name.strip_prefix("delegate_to_") else {
            return unknown_tool(name);
        };
        let Some(query) = arguments.get("query").and_then(|q| q.as_str()) else {
            return json!({ "error": "Missing required argument: query" }).to_string();
        };
        self.orchestrator.delegate(self.chat, agent_name, query).await
    }
}
