use super::schema::{AppConfig, PartialConfig, PartialLlm};
use crate::agent::types::{ModelSpec, Provider};
use crate::error::ConfigError;
use std::path::PathBuf;

/// Default filename suffix marking a tool-server definition.
pub const DEFAULT_SERVER_SUFFIX: &str = "_server.py";

const TEMPERATURE_RANGE: std::ops::RangeInclusive<f64> = 0.0..=2.0;
const MAX_TOKENS_RANGE: std::ops::RangeInclusive<u32> = 1..=100_000;

impl PartialLlm {
    /// Self's non-None values take precedence.
    pub fn with_fallback(self, fallback: PartialLlm) -> PartialLlm {
        PartialLlm {
            provider: self.provider.or(fallback.provider),
            model: self.model.or(fallback.model),
            temperature: self.temperature.or(fallback.temperature),
            max_tokens: self.max_tokens.or(fallback.max_tokens),
        }
    }

    /// Resolve one model tier, validating every field.
    ///
    /// `tier` is the environment prefix of the tier (`ORCHESTRATOR_LLM` or
    /// `MCP_AGENTS_LLM`) so errors name the variable the user would set.
    fn finalize(
        self,
        tier: &str,
        default_model: &str,
        default_max_tokens: u32,
        lookup_env: &dyn Fn(&str) -> Option<String>,
    ) -> Result<ModelSpec, ConfigError> {
        let provider_field = format!("{tier}_PROVIDER");
        let provider = match self.provider {
            Some(raw) => raw.parse::<Provider>().map_err(|_| ConfigError::UnknownProvider {
                field: provider_field,
                value: raw,
            })?,
            None => Provider::OpenAi,
        };

        let model = self.model.unwrap_or_else(|| default_model.to_string());
        if model.trim().is_empty() {
            return Err(ConfigError::MissingModel {
                tier: format!("{tier}_MODEL"),
            });
        }

        let temperature = self.temperature.unwrap_or(0.0);
        if !TEMPERATURE_RANGE.contains(&temperature) {
            return Err(ConfigError::InvalidValue {
                field: format!("{tier}_TEMPERATURE"),
                value: temperature.to_string(),
                message: "must be between 0.0 and 2.0".to_string(),
            });
        }

        let max_tokens = self.max_tokens.unwrap_or(default_max_tokens);
        if !MAX_TOKENS_RANGE.contains(&max_tokens) {
            return Err(ConfigError::InvalidValue {
                field: format!("{tier}_MAX_TOKENS"),
                value: max_tokens.to_string(),
                message: "must be between 1 and 100000".to_string(),
            });
        }

        if let Some(env_var) = provider.api_key_env() {
            let present = lookup_env(env_var).is_some_and(|key| !key.trim().is_empty());
            if !present {
                return Err(ConfigError::MissingApiKey {
                    provider: provider.to_string(),
                    env_var: env_var.to_string(),
                });
            }
        }

        Ok(ModelSpec {
            provider,
            model,
            temperature,
            max_tokens,
        })
    }
}

impl PartialConfig {
    /// Merge self with a lower-priority fallback.
    /// Self's non-None values take precedence.
    /// For servers: REPLACE semantics (if self has Some, use it entirely).
    pub fn with_fallback(self, fallback: PartialConfig) -> PartialConfig {
        PartialConfig {
            orchestrator_llm: self.orchestrator_llm.with_fallback(fallback.orchestrator_llm),
            sub_agent_llm: self.sub_agent_llm.with_fallback(fallback.sub_agent_llm),
            servers_dir: self.servers_dir.or(fallback.servers_dir),
            server_suffix: self.server_suffix.or(fallback.server_suffix),
            interpreter: self.interpreter.or(fallback.interpreter),
            servers: self.servers.or(fallback.servers),
            response_language: self.response_language.or(fallback.response_language),
            persona_prompt: self.persona_prompt.or(fallback.persona_prompt),
            orchestrator_max_iterations: self
                .orchestrator_max_iterations
                .or(fallback.orchestrator_max_iterations),
            sub_agent_max_iterations: self
                .sub_agent_max_iterations
                .or(fallback.sub_agent_max_iterations),
            enable_memory: self.enable_memory.or(fallback.enable_memory),
            launch_timeout_secs: self.launch_timeout_secs.or(fallback.launch_timeout_secs),
            launch_attempts: self.launch_attempts.or(fallback.launch_attempts),
            log_level: self.log_level.or(fallback.log_level),
            debug: self.debug.or(fallback.debug),
        }
    }

    /// Convert to AppConfig, filling any remaining gaps with defaults.
    ///
    /// `lookup_env` resolves provider API keys; a missing key for a provider
    /// that needs one is a [`ConfigError::MissingApiKey`].
    pub fn finalize(
        self,
        lookup_env: &dyn Fn(&str) -> Option<String>,
    ) -> Result<AppConfig, ConfigError> {
        let orchestrator_llm =
            self.orchestrator_llm
                .finalize("ORCHESTRATOR_LLM", "gpt-4o", 4000, lookup_env)?;
        let sub_agent_llm =
            self.sub_agent_llm
                .finalize("MCP_AGENTS_LLM", "gpt-4o-mini", 2000, lookup_env)?;

        let orchestrator_max_iterations = self.orchestrator_max_iterations.unwrap_or(10);
        let sub_agent_max_iterations = self.sub_agent_max_iterations.unwrap_or(10);
        for (field, value) in [
            ("orchestrator.max_iterations", orchestrator_max_iterations),
            ("sub_agents.max_iterations", sub_agent_max_iterations),
        ] {
            if !(1..=50).contains(&value) {
                return Err(ConfigError::InvalidValue {
                    field: field.to_string(),
                    value: value.to_string(),
                    message: "must be between 1 and 50".to_string(),
                });
            }
        }

        let launch_attempts = self.launch_attempts.unwrap_or(1);
        if launch_attempts == 0 {
            return Err(ConfigError::InvalidValue {
                field: "launch.attempts".to_string(),
                value: "0".to_string(),
                message: "at least one launch attempt is required".to_string(),
            });
        }

        let server_suffix = self
            .server_suffix
            .unwrap_or_else(|| DEFAULT_SERVER_SUFFIX.to_string());
        if server_suffix.is_empty() {
            return Err(ConfigError::InvalidValue {
                field: "general.server_suffix".to_string(),
                value: String::new(),
                message: "must not be empty".to_string(),
            });
        }

        let debug = self.debug.unwrap_or(false);

        Ok(AppConfig {
            orchestrator_llm,
            sub_agent_llm,
            servers_dir: self
                .servers_dir
                .unwrap_or_else(|| PathBuf::from("./mcp_servers")),
            server_suffix,
            interpreter: self.interpreter.unwrap_or_else(|| "python3".to_string()),
            servers: self.servers.unwrap_or_default(),
            response_language: self
                .response_language
                .unwrap_or_else(|| "Vietnamese".to_string()),
            persona_prompt: self.persona_prompt,
            orchestrator_max_iterations,
            sub_agent_max_iterations,
            enable_memory: self.enable_memory.unwrap_or(true),
            launch_timeout_secs: self.launch_timeout_secs.unwrap_or(30),
            launch_attempts,
            log_level: self.log_level.unwrap_or_else(|| {
                if debug { "debug" } else { "info" }.to_string()
            }),
            debug,
        })
    }
}
