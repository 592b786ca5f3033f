//! Explicit server registry built from `[[servers]]` config entries.

use std::collections::HashSet;
use std::path::PathBuf;

use super::{Discovery, ServerDescriptor, ServerSource, Transport, validate_name};
use crate::config::ServerEntry;
use crate::error::DiscoveryWarning;

/// Validate configured entries and merge them with the scanned servers.
///
/// Configured entries come first, in file order, followed by scanned servers
/// in listing order. Names must be valid and unique; a rejected entry becomes
/// a warning and the first definition of a name wins. Warnings already
/// present on `scanned` are carried over.
pub fn build_registry(configured: &[ServerEntry], scanned: Discovery) -> Discovery {
    let mut merged = Discovery {
        servers: Vec::with_capacity(configured.len() + scanned.servers.len()),
        warnings: scanned.warnings,
    };
    let mut seen: HashSet<String> = HashSet::new();

    for entry in configured {
        let origin = format!("config entry '{}'", entry.name);
        if let Err(reason) = validate_name(&entry.name) {
            merged.warnings.push(DiscoveryWarning::InvalidName {
                name: entry.name.clone(),
                origin,
                reason,
            });
            continue;
        }
        if entry.command.trim().is_empty() {
            merged.warnings.push(DiscoveryWarning::InvalidName {
                name: entry.name.clone(),
                origin,
                reason: "command is required for stdio transport".to_string(),
            });
            continue;
        }
        if !seen.insert(entry.name.clone()) {
            merged.warnings.push(DiscoveryWarning::DuplicateName {
                name: entry.name.clone(),
                origin,
            });
            continue;
        }
        merged.servers.push(ServerDescriptor {
            symbolic_name: entry.name.clone(),
            entry_point: PathBuf::from(&entry.command),
            transport: Transport::Stdio,
            source: ServerSource::Configured,
            command: Some(entry.command.clone()),
            args: entry.args.clone(),
            env: entry.env.clone(),
        });
    }

    for server in scanned.servers {
        if !seen.insert(server.symbolic_name.clone()) {
            merged.warnings.push(DiscoveryWarning::DuplicateName {
                name: server.symbolic_name.clone(),
                origin: server.entry_point.display().to_string(),
            });
            continue;
        }
        merged.servers.push(server);
    }

    merged
}
