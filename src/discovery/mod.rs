//! Tool-server discovery.
//!
//! Tool servers come from two places: files in a directory whose names end
//! in a fixed suffix ([`scan`]), and `[[servers]]` entries in the config file
//! ([`registry`]). Both produce [`ServerDescriptor`]s with validated,
//! unique symbolic names. Problems are reported as
//! [`DiscoveryWarning`](crate::error::DiscoveryWarning)s and never abort
//! startup.

pub mod registry;
pub mod scan;

use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;

use crate::error::DiscoveryWarning;

pub use registry::build_registry;
pub use scan::discover_servers;

/// Symbolic names end up inside tool names, which providers restrict to
/// this character set.
static NAME_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[A-Za-z0-9_-]+$").expect("symbolic name pattern is valid")
});

/// Longest symbolic name accepted. `delegate_to_{name}_agent` must stay
/// within the 64-character tool-name limit.
const MAX_NAME_LEN: usize = 40;

/// How the client talks to a tool server.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Transport {
    Stdio,
}

/// Where a descriptor came from.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ServerSource {
    /// Found by the directory scan.
    Scanned,
    /// Declared in a `[[servers]]` config entry.
    Configured,
}

/// One tool-server definition. Immutable after discovery.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ServerDescriptor {
    pub symbolic_name: String,
    /// Launch target. The server file for scanned servers, the command for
    /// configured ones.
    pub entry_point: PathBuf,
    pub transport: Transport,
    pub source: ServerSource,
    /// Explicit program to run. `None` means "derive from the entry point".
    pub command: Option<String>,
    pub args: Vec<String>,
    pub env: BTreeMap<String, String>,
}

impl ServerDescriptor {
    /// Descriptor for a server file found by the directory scan.
    pub fn scanned(symbolic_name: impl Into<String>, entry_point: impl Into<PathBuf>) -> Self {
        Self {
            symbolic_name: symbolic_name.into(),
            entry_point: entry_point.into(),
            transport: Transport::Stdio,
            source: ServerSource::Scanned,
            command: None,
            args: Vec::new(),
            env: BTreeMap::new(),
        }
    }
}

/// Outcome of a discovery pass: usable descriptors plus everything that
/// was skipped or rejected along the way.
#[derive(Debug, Default)]
pub struct Discovery {
    pub servers: Vec<ServerDescriptor>,
    pub warnings: Vec<DiscoveryWarning>,
}

impl Discovery {
    /// Emit every warning through `tracing`.
    pub fn log_warnings(&self) {
        for warning in &self.warnings {
            tracing::warn!("{warning}");
        }
    }
}

/// Check a symbolic name, returning the rejection reason if it is unusable.
pub fn validate_name(name: &str) -> Result<(), String> {
    if name.is_empty() {
        return Err("name is empty".to_string());
    }
    if name.len() > MAX_NAME_LEN {
        return Err(format!("name is longer than {MAX_NAME_LEN} characters"));
    }
    if !NAME_PATTERN.is_match(name) {
        return Err("only ASCII letters, digits, '_' and '-' are allowed".to_string());
    }
    Ok(())
}
