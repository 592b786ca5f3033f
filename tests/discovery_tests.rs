use std::collections::BTreeMap;
use std::fs;

use writesense::config::ServerEntry;
use writesense::discovery::{ServerSource, build_registry, discover_servers};
use writesense::error::DiscoveryWarning;

#[test]
fn every_matching_file_becomes_a_descriptor() {
    let dir = tempfile::tempdir().unwrap();
    for name in ["alpha", "beta", "gamma"] {
        fs::write(dir.path().join(format!("{name}_server.py")), "# server").unwrap();
    }
    fs::write(dir.path().join("helpers.py"), "").unwrap();

    let discovery = discover_servers(dir.path(), "_server.py");

    let mut names: Vec<String> = discovery
        .servers
        .iter()
        .map(|s| s.symbolic_name.clone())
        .collect();
    names.sort();
    assert_eq!(names, vec!["alpha", "beta", "gamma"]);
    assert!(discovery.warnings.is_empty());
}

#[test]
fn configured_entries_come_first_and_win_duplicates() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("weather_server.py"), "").unwrap();
    fs::write(dir.path().join("notes_server.py"), "").unwrap();

    let configured = vec![ServerEntry {
        name: "weather".to_string(),
        command: "uvx".to_string(),
        args: vec!["mcp-weather".to_string()],
        env: BTreeMap::new(),
    }];

    let registry = build_registry(&configured, discover_servers(dir.path(), "_server.py"));

    assert_eq!(registry.servers.len(), 2);
    assert_eq!(registry.servers[0].symbolic_name, "weather");
    assert_eq!(registry.servers[0].source, ServerSource::Configured);
    assert_eq!(registry.servers[1].symbolic_name, "notes");
    assert!(registry
        .warnings
        .iter()
        .any(|w| matches!(w, DiscoveryWarning::DuplicateName { name, .. } if name == "weather")));
}

#[test]
fn missing_directory_only_warns() {
    let dir = tempfile::tempdir().unwrap();
    let registry = build_registry(&[], discover_servers(&dir.path().join("absent"), "_server.py"));

    assert!(registry.servers.is_empty());
    assert!(matches!(
        registry.warnings.as_slice(),
        [DiscoveryWarning::MissingDirectory { .. }]
    ));
}
