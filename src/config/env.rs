//! Environment-variable layer of the configuration.
//!
//! Variables are read through a lookup function rather than `std::env`
//! directly so tests can supply a fixed map.

use std::path::PathBuf;
use std::str::FromStr;

use super::schema::{PartialConfig, PartialLlm};
use crate::error::ConfigError;

/// Build the environment layer.
///
/// Unset or empty variables leave the field as `None`. Numeric variables that
/// fail to parse are a [`ConfigError::InvalidValue`].
pub fn from_env(lookup: &dyn Fn(&str) -> Option<String>) -> Result<PartialConfig, ConfigError> {
    let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

    Ok(PartialConfig {
        orchestrator_llm: llm_from_env("ORCHESTRATOR_LLM", &get)?,
        sub_agent_llm: llm_from_env("MCP_AGENTS_LLM", &get)?,
        servers_dir: get("MCP_SERVERS_DIR").map(PathBuf::from),
        interpreter: get("MCP_SERVER_INTERPRETER"),
        response_language: get("ORCHESTRATOR_RESPONSE_LANGUAGE"),
        log_level: get("LOG_LEVEL").map(|level| level.to_lowercase()),
        debug: get("DEBUG").map(|v| v.eq_ignore_ascii_case("true")),
        ..Default::default()
    })
}

fn llm_from_env(
    prefix: &str,
    get: &dyn Fn(&str) -> Option<String>,
) -> Result<PartialLlm, ConfigError> {
    Ok(PartialLlm {
        provider: get(&format!("{prefix}_PROVIDER")),
        model: get(&format!("{prefix}_MODEL")),
        temperature: parse_var(&format!("{prefix}_TEMPERATURE"), get)?,
        max_tokens: parse_var(&format!("{prefix}_MAX_TOKENS"), get)?,
    })
}

fn parse_var<T>(key: &str, get: &dyn Fn(&str) -> Option<String>) -> Result<Option<T>, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match get(key) {
        Some(raw) => raw
            .trim()
            .parse::<T>()
            .map(Some)
            .map_err(|e| ConfigError::InvalidValue {
                field: key.to_string(),
                value: raw,
                message: e.to_string(),
            }),
        None => Ok(None),
    }
}
