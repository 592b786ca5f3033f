//! Shared vocabulary for agents: model tiers, tool handles and descriptors.
//!
//! All types derive [`serde::Serialize`] so the capability report can be
//! printed as JSON.

use std::fmt;
use std::str::FromStr;

use serde::Serialize;

/// Hosted (or local) LLM provider backing an agent.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Provider {
    Anthropic,
    OpenAi,
    Ollama,
}

impl Provider {
    /// Environment variable holding the provider's API key, or `None` for
    /// providers that run without one.
    pub fn api_key_env(&self) -> Option<&'static str> {
        match self {
            Provider::Anthropic => Some("ANTHROPIC_API_KEY"),
            Provider::OpenAi => Some("OPENAI_API_KEY"),
            Provider::Ollama => None,
        }
    }

    /// Namespace used in genai's `namespace::model` form.
    pub fn namespace(&self) -> &'static str {
        match self {
            Provider::Anthropic => "anthropic",
            Provider::OpenAi => "openai",
            Provider::Ollama => "ollama",
        }
    }
}

impl fmt::Display for Provider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.namespace())
    }
}

impl FromStr for Provider {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "anthropic" => Ok(Provider::Anthropic),
            "openai" => Ok(Provider::OpenAi),
            "ollama" => Ok(Provider::Ollama),
            other => Err(format!("unsupported provider: {other}")),
        }
    }
}

/// Model binding for one agent tier.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ModelSpec {
    pub provider: Provider,
    pub model: String,
    pub temperature: f64,
    pub max_tokens: u32,
}

impl ModelSpec {
    /// Fully-qualified model identifier, e.g. `openai::gpt-4o`.
    pub fn qualified_name(&self) -> String {
        format!("{}::{}", self.provider.namespace(), self.model)
    }
}

/// A tool advertised by a tool server (or synthesized for delegation).
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ToolHandle {
    pub name: String,
    pub description: String,
    pub input_schema: serde_json::Value,
}

impl ToolHandle {
    /// Convert to the genai tool schema passed in chat requests.
    pub fn to_genai_tool(&self) -> genai::chat::Tool {
        genai::chat::Tool::new(self.name.clone())
            .with_description(self.description.clone())
            .with_schema(self.input_schema.clone())
    }
}

/// Static description of an agent: its model binding and bound tools.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct AgentDescriptor {
    /// Agent name (`{server}_agent` for sub-agents).
    pub name: String,
    /// Symbolic name of the backing tool server. Empty for the orchestrator.
    pub server: String,
    pub model: ModelSpec,
    pub tools: Vec<ToolHandle>,
}
