use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::PathBuf;

use crate::agent::types::ModelSpec;

/// The TOML file structure for writesense.toml.
#[derive(Debug, Deserialize, Default)]
pub struct ConfigFile {
    pub general: Option<GeneralConfig>,
    pub orchestrator: Option<OrchestratorSection>,
    pub sub_agents: Option<LlmSection>,
    pub launch: Option<LaunchConfig>,
    /// Explicitly registered tool servers, merged ahead of scanned ones.
    #[serde(default)]
    pub servers: Vec<ServerEntry>,
}

#[derive(Debug, Deserialize)]
pub struct GeneralConfig {
    pub servers_dir: Option<String>,
    pub server_suffix: Option<String>,
    pub interpreter: Option<String>,
    pub log_level: Option<String>,
    pub debug: Option<bool>,
}

#[derive(Debug, Deserialize, Default)]
pub struct LlmSection {
    pub provider: Option<String>,
    pub model: Option<String>,
    pub temperature: Option<f64>,
    pub max_tokens: Option<u32>,
    pub max_iterations: Option<usize>,
}

#[derive(Debug, Deserialize)]
pub struct OrchestratorSection {
    #[serde(flatten)]
    pub llm: LlmSection,
    pub language: Option<String>,
    /// If specified, fully replaces the default persona directive.
    pub system_prompt: Option<String>,
    pub enable_memory: Option<bool>,
}

#[derive(Debug, Deserialize)]
pub struct LaunchConfig {
    pub timeout_secs: Option<u64>,
    pub attempts: Option<u32>,
}

/// One `[[servers]]` entry: a tool server launched by an explicit command
/// instead of being found by filename.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct ServerEntry {
    pub name: String,
    pub command: String,
    #[serde(default)]
    pub args: Vec<String>,
    #[serde(default)]
    pub env: BTreeMap<String, String>,
}

/// Fully-resolved runtime configuration. All fields have values and every
/// value has been validated.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub orchestrator_llm: ModelSpec,
    pub sub_agent_llm: ModelSpec,
    pub servers_dir: PathBuf,
    pub server_suffix: String,
    pub interpreter: String,
    pub servers: Vec<ServerEntry>,
    pub response_language: String,
    pub persona_prompt: Option<String>,
    pub orchestrator_max_iterations: usize,
    pub sub_agent_max_iterations: usize,
    pub enable_memory: bool,
    pub launch_timeout_secs: u64,
    pub launch_attempts: u32,
    pub log_level: String,
    pub debug: bool,
}

/// Unvalidated model settings for one tier. Numbers stay typed here; the
/// provider stays a string until `finalize` so an unknown value can be
/// reported with the field it came from.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PartialLlm {
    pub provider: Option<String>,
    pub model: Option<String>,
    pub temperature: Option<f64>,
    pub max_tokens: Option<u32>,
}

/// Partial config used during merge. All fields are Option so that
/// missing fields don't override lower-priority values.
#[derive(Debug, Clone, Default)]
pub struct PartialConfig {
    pub orchestrator_llm: PartialLlm,
    pub sub_agent_llm: PartialLlm,
    pub servers_dir: Option<PathBuf>,
    pub server_suffix: Option<String>,
    pub interpreter: Option<String>,
    pub servers: Option<Vec<ServerEntry>>,
    pub response_language: Option<String>,
    pub persona_prompt: Option<String>,
    pub orchestrator_max_iterations: Option<usize>,
    pub sub_agent_max_iterations: Option<usize>,
    pub enable_memory: Option<bool>,
    pub launch_timeout_secs: Option<u64>,
    pub launch_attempts: Option<u32>,
    pub log_level: Option<String>,
    pub debug: Option<bool>,
}

impl ConfigFile {
    /// Flatten the sectioned file into a `PartialConfig` layer.
    pub fn to_partial(self) -> PartialConfig {
        let general = self.general;
        let orchestrator = self.orchestrator;
        let sub_agents = self.sub_agents.unwrap_or_default();
        let launch = self.launch;

        let (orchestrator_llm, language, system_prompt, enable_memory) = match orchestrator {
            Some(o) => (o.llm, o.language, o.system_prompt, o.enable_memory),
            None => (LlmSection::default(), None, None, None),
        };

        PartialConfig {
            orchestrator_max_iterations: orchestrator_llm.max_iterations,
            orchestrator_llm: orchestrator_llm.into(),
            sub_agent_max_iterations: sub_agents.max_iterations,
            sub_agent_llm: sub_agents.into(),
            servers_dir: general
                .as_ref()
                .and_then(|g| g.servers_dir.as_ref().map(PathBuf::from)),
            server_suffix: general.as_ref().and_then(|g| g.server_suffix.clone()),
            interpreter: general.as_ref().and_then(|g| g.interpreter.clone()),
            servers: if self.servers.is_empty() {
                None
            } else {
                Some(self.servers)
            },
            response_language: language,
            persona_prompt: system_prompt,
            enable_memory,
            launch_timeout_secs: launch.as_ref().and_then(|l| l.timeout_secs),
            launch_attempts: launch.as_ref().and_then(|l| l.attempts),
            log_level: general.as_ref().and_then(|g| g.log_level.clone()),
            debug: general.as_ref().and_then(|g| g.debug),
        }
    }
}

impl From<LlmSection> for PartialLlm {
    fn from(section: LlmSection) -> Self {
        PartialLlm {
            provider: section.provider,
            model: section.model,
            temperature: section.temperature,
            max_tokens: section.max_tokens,
        }
    }
}
