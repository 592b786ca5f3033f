//! Agent factory: one sub-agent per discovered tool server.
//!
//! Registration is sequential and runs once at startup. A server that fails
//! to launch or advertises no tools is dropped with a
//! [`RegistrationFailure`]; the rest still register.

use super::delegation::sub_agent_name;
use super::sub_agent::SubAgent;
use super::types::{AgentDescriptor, ModelSpec};
use crate::discovery::ServerDescriptor;
use crate::error::{RegistrationError, RegistrationFailure};
use crate::mcp::ServerLauncher;

/// Outcome of registering every discovered server.
#[derive(Default)]
pub struct Registration {
    /// Successfully registered sub-agents, in server order.
    pub agents: Vec<SubAgent>,
    /// Servers that were dropped, with the reason.
    pub failures: Vec<RegistrationFailure>,
}

/// Launch each server and bind its tools to the sub-agent model tier.
pub async fn register_sub_agents(
    servers: &[ServerDescriptor],
    launcher: &dyn ServerLauncher,
    model: &ModelSpec,
    max_iterations: usize,
) -> Registration {
    let mut registration = Registration::default();

    for server in servers {
        let name = &server.symbolic_name;

        let tool_server = match launcher.launch(server).await {
            Ok(tool_server) => tool_server,
            Err(source) => {
                let failure = RegistrationFailure {
                    server: name.clone(),
                    source,
                };
                tracing::warn!("{failure}");
                registration.failures.push(failure);
                continue;
            }
        };

        let tools = tool_server.tools().to_vec();
        if tools.is_empty() {
            tool_server.shutdown().await;
            let failure = RegistrationFailure {
                server: name.clone(),
                source: RegistrationError::NoTools,
            };
            tracing::warn!("{failure}");
            registration.failures.push(failure);
            continue;
        }

        let descriptor = AgentDescriptor {
            name: sub_agent_name(name),
            server: name.clone(),
            model: model.clone(),
            tools,
        };
        tracing::info!(
            agent = %descriptor.name,
            tools = descriptor.tools.len(),
            "Registered sub-agent"
        );
        registration
            .agents
            .push(SubAgent::new(descriptor, tool_server, max_iterations));
    }

    registration
}
