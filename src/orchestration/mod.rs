//! Orchestrator assembly.
//!
//! [`build_orchestrator`] runs the whole startup pipeline: discover tool
//! servers, register a sub-agent per server, then assemble the
//! [`Orchestrator`] around the registered set.

pub mod orchestrator;
pub mod persona;

pub use orchestrator::{AgentCapability, Orchestrator, ToolSummary};

use crate::agent::factory::register_sub_agents;
use crate::config::AppConfig;
use crate::discovery::{build_registry, discover_servers};
use crate::mcp::ServerLauncher;

/// Discover, register and assemble. Individual server problems are logged
/// and skipped; assembly always succeeds, possibly with no sub-agents.
pub async fn build_orchestrator(config: &AppConfig, launcher: &dyn ServerLauncher) -> Orchestrator {
    let scanned = discover_servers(&config.servers_dir, &config.server_suffix);
    let discovery = build_registry(&config.servers, scanned);
    discovery.log_warnings();
    tracing::info!(
        servers = discovery.servers.len(),
        dir = %config.servers_dir.display(),
        "Discovered tool servers"
    );

    let registration = register_sub_agents(
        &discovery.servers,
        launcher,
        &config.sub_agent_llm,
        config.sub_agent_max_iterations,
    )
    .await;
    if !registration.failures.is_empty() {
        tracing::warn!(
            failed = registration.failures.len(),
            registered = registration.agents.len(),
            "Some tool servers were dropped"
        );
    }

    let persona = match &config.persona_prompt {
        Some(prompt) => prompt.clone(),
        None => persona::default_persona(&config.response_language),
    };

    Orchestrator::assemble(
        config.orchestrator_llm.clone(),
        &persona,
        registration.agents,
        config.orchestrator_max_iterations,
    )
}
