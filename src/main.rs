use std::time::Duration;

use anyhow::Context;
use clap::Parser;

use writesense::agent::llm::GenaiChat;
use writesense::chat;
use writesense::cli::{Cli, Commands};
use writesense::config;
use writesense::mcp::McpLauncher;
use writesense::orchestration::{Orchestrator, build_orchestrator};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let loaded = config::load_config(&cli).context("Invalid configuration")?;
    let config = loaded.config;

    // Logs go to stderr so stdout carries only answers.
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::new(&config.log_level))
        .with_writer(std::io::stderr)
        .init();

    if let Some(path) = &loaded.source {
        tracing::info!("Loaded config from {}", path.display());
    }
    for warning in &loaded.warnings {
        tracing::warn!("Ignoring global config: {warning}");
    }

    tracing::info!(
        orchestrator_model = %config.orchestrator_llm.qualified_name(),
        sub_agent_model = %config.sub_agent_llm.qualified_name(),
        servers_dir = %config.servers_dir.display(),
        "WriteSense starting"
    );

    let launcher = McpLauncher::new(
        config.interpreter.clone(),
        Duration::from_secs(config.launch_timeout_secs),
        config.launch_attempts,
    );
    let orchestrator = build_orchestrator(&config, &launcher).await;
    let llm = GenaiChat::new();

    let result = tokio::select! {
        result = run(cli.command, &orchestrator, &llm, config.enable_memory) => result,
        _ = tokio::signal::ctrl_c() => {
            tracing::info!("Interrupted");
            Ok(())
        }
    };

    orchestrator.shutdown().await;
    result
}

async fn run(
    command: Commands,
    orchestrator: &Orchestrator,
    llm: &GenaiChat,
    enable_memory: bool,
) -> anyhow::Result<()> {
    match command {
        Commands::Ask { query } => {
            chat::ask(orchestrator, llm, &query).await?;
        }
        Commands::Chat => {
            chat::run_repl(orchestrator, llm, enable_memory, chat::stdin_lines()).await?
        },
        Commands::Agents { json } => {
            let capabilities = orchestrator.capabilities();
            if json {
                println!("{}", serde_json::to_string_pretty(&capabilities)?);
                return Ok(());
            }
            if capabilities.is_empty() {
                println!("No sub-agents registered.");
            }
            for cap in &capabilities {
                println!("{} (server: {}, {} tools)", cap.agent, cap.server, cap.tool_count);
                for tool in &cap.tools {
                    println!("  - {}: {}", tool.name, tool.description);
                }
            }
            println!("\n{}", orchestrator.system_prompt());
        }
    }
    Ok(())
}
