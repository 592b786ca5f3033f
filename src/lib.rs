pub mod agent;
pub mod chat;
pub mod cli;
pub mod config;
pub mod discovery;
pub mod error;
pub mod mcp;
pub mod orchestration;
