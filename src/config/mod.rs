pub mod env;
pub mod merge;
pub mod schema;

pub use schema::*;

use crate::cli::Cli;
use crate::error::ConfigError;
use std::path::{Path, PathBuf};

/// Outcome of [`load_config`]. Loading happens before logging is set up, so
/// anything worth reporting is returned for the caller to log.
#[derive(Debug)]
pub struct LoadedConfig {
    pub config: AppConfig,
    /// Config file that contributed values, if any.
    pub source: Option<PathBuf>,
    /// Non-fatal problems, such as a broken global config file that was
    /// ignored.
    pub warnings: Vec<ConfigError>,
}

/// Load configuration by merging file, environment, and CLI sources.
/// Precedence: CLI > environment > config file > defaults.
///
/// A missing or broken global config file is not fatal (defaults apply and a
/// broken file is reported in [`LoadedConfig::warnings`]). A file passed with
/// `--config` must exist and parse.
pub fn load_config(cli: &Cli) -> Result<LoadedConfig, ConfigError> {
    let lookup = |key: &str| std::env::var(key).ok();
    load_config_with(cli, global_config_path().as_deref(), &lookup)
}

/// Same as [`load_config`] with an injectable global config path and
/// environment lookup.
pub fn load_config_with(
    cli: &Cli,
    global_path: Option<&Path>,
    lookup_env: &dyn Fn(&str) -> Option<String>,
) -> Result<LoadedConfig, ConfigError> {
    let mut warnings = Vec::new();

    // Layer 1: config file (explicit path, or the platform global file)
    let (file, source) = match &cli.config {
        Some(path) => (read_toml_file(path)?, Some(path.clone())),
        None => match global_path {
            Some(path) if path.exists() => match read_toml_file(path) {
                Ok(partial) => (partial, Some(path.to_path_buf())),
                Err(e) => {
                    warnings.push(e);
                    (PartialConfig::default(), None)
                }
            },
            _ => (PartialConfig::default(), None),
        },
    };

    // Layer 2: environment
    let env = env::from_env(lookup_env)?;

    // Layer 3: CLI args (converted to PartialConfig)
    let cli_partial = cli_to_partial(cli);

    let config = cli_partial
        .with_fallback(env)
        .with_fallback(file)
        .finalize(lookup_env)?;

    Ok(LoadedConfig {
        config,
        source,
        warnings,
    })
}

/// Read and parse a TOML config file into a PartialConfig.
pub fn read_toml_file(path: &Path) -> Result<PartialConfig, ConfigError> {
    let contents = std::fs::read_to_string(path)?;
    let config_file =
        toml::from_str::<ConfigFile>(&contents).map_err(|e| ConfigError::ParseError {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
    Ok(config_file.to_partial())
}

/// Resolve the platform-specific global config path.
/// Linux: ~/.config/writesense/writesense.toml
/// macOS: ~/Library/Application Support/writesense/writesense.toml
fn global_config_path() -> Option<PathBuf> {
    directories::ProjectDirs::from("", "", "writesense")
        .map(|dirs| dirs.config_dir().join("writesense.toml"))
}

/// Convert CLI arguments to a PartialConfig for merging.
fn cli_to_partial(cli: &Cli) -> PartialConfig {
    PartialConfig {
        servers_dir: cli.servers_dir.clone(),
        response_language: cli.language.clone(),
        ..Default::default()
    }
}
