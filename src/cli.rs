use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "writesense",
    version,
    about = "Orchestrator agent that delegates to MCP tool-server sub-agents"
)]
pub struct Cli {
    /// Path to config file (overrides the global config file)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Directory scanned for tool-server definitions
    #[arg(short, long, global = true)]
    pub servers_dir: Option<PathBuf>,

    /// Natural language the orchestrator must answer in
    #[arg(short, long, global = true)]
    pub language: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Send a single query to the orchestrator and print the answer
    Ask {
        /// The user request
        query: String,
    },
    /// Start an interactive conversation with the orchestrator
    Chat,
    /// List registered sub-agents and print the orchestrator prompt
    Agents {
        /// Print the capability report as JSON
        #[arg(long)]
        json: bool,
    },
}
