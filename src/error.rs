use std::path::PathBuf;

/// Errors related to configuration loading and validation. All of these are
/// fatal at startup.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Failed to parse config at {path}: {message}")]
    ParseError { path: PathBuf, message: String },

    #[error("Unsupported LLM provider '{value}' in {field} (expected anthropic, openai or ollama)")]
    UnknownProvider { field: String, value: String },

    #[error("Invalid value '{value}' for {field}: {message}")]
    InvalidValue {
        field: String,
        value: String,
        message: String,
    },

    #[error("Model name for {tier} is empty")]
    MissingModel { tier: String },

    #[error("API key for {provider} not found in environment variable {env_var}")]
    MissingApiKey { provider: String, env_var: String },
}

/// Non-fatal problems found while discovering tool-server definitions.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DiscoveryWarning {
    #[error("Server directory {path} does not exist")]
    MissingDirectory { path: PathBuf },

    #[error("Skipping unreadable entry {path}: {message}")]
    UnreadableEntry { path: PathBuf, message: String },

    #[error("Rejected server name '{name}' from {origin}: {reason}")]
    InvalidName {
        name: String,
        origin: String,
        reason: String,
    },

    #[error("Duplicate server name '{name}' from {origin} (first definition kept)")]
    DuplicateName { name: String, origin: String },
}

/// Why a single tool server could not be registered as a sub-agent.
#[derive(Debug, thiserror::Error)]
pub enum RegistrationError {
    #[error("Failed to launch tool server: {0}")]
    LaunchFailed(String),

    #[error("Tool server did not finish its handshake within {timeout_secs}s")]
    TimedOut { timeout_secs: u64 },

    #[error("Tool server advertises no tools")]
    NoTools,
}

/// A tool server that was dropped during registration. The rest of the
/// registration proceeds without it.
#[derive(Debug, thiserror::Error)]
#[error("Registration of '{server}' failed: {source}")]
pub struct RegistrationFailure {
    pub server: String,
    #[source]
    pub source: RegistrationError,
}

/// Errors related to running an agent conversation.
#[derive(Debug, thiserror::Error)]
pub enum AgentError {
    #[error("LLM error: {0}")]
    LlmError(String),

    #[error("Agent '{agent}' reached the iteration limit ({limit}) without a final answer")]
    IterationLimit { agent: String, limit: usize },
}
