//! Directory scan for tool-server files.

use std::fs;
use std::path::Path;

use super::{Discovery, ServerDescriptor, validate_name};
use crate::error::DiscoveryWarning;

/// Scan `dir` for files whose name ends with `suffix`.
///
/// The symbolic name is the filename minus the suffix; the file path becomes
/// the entry point. Descriptors follow directory listing order, which is not
/// stable across platforms.
///
/// Never fails: a missing directory yields an empty result with a
/// [`DiscoveryWarning::MissingDirectory`], and entries that cannot be read or
/// carry an invalid name are skipped with a warning.
pub fn discover_servers(dir: &Path, suffix: &str) -> Discovery {
    let mut discovery = Discovery::default();

    let entries = match fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            discovery.warnings.push(DiscoveryWarning::MissingDirectory {
                path: dir.to_path_buf(),
            });
            return discovery;
        }
        Err(e) => {
            discovery.warnings.push(DiscoveryWarning::UnreadableEntry {
                path: dir.to_path_buf(),
                message: e.to_string(),
            });
            return discovery;
        }
    };

    for entry in entries {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                discovery.warnings.push(DiscoveryWarning::UnreadableEntry {
                    path: dir.to_path_buf(),
                    message: e.to_string(),
                });
                continue;
            }
        };
        let path = entry.path();

        let Some(file_name) = entry.file_name().to_str().map(str::to_owned) else {
            // A non-UTF-8 name cannot match the suffix; only report it when
            // the lossy form suggests it was meant to.
            if entry.file_name().to_string_lossy().ends_with(suffix) {
                discovery.warnings.push(DiscoveryWarning::UnreadableEntry {
                    path,
                    message: "file name is not valid UTF-8".to_string(),
                });
            }
            continue;
        };

        let Some(symbolic_name) = file_name.strip_suffix(suffix) else {
            continue;
        };

        match fs::metadata(&path) {
            Ok(meta) if meta.is_file() => {}
            Ok(_) => continue,
            Err(e) => {
                discovery.warnings.push(DiscoveryWarning::UnreadableEntry {
                    path,
                    message: e.to_string(),
                });
                continue;
            }
        }

        if let Err(e) = fs::File::open(&path) {
            discovery.warnings.push(DiscoveryWarning::UnreadableEntry {
                path,
                message: e.to_string(),
            });
            continue;
        }

        if let Err(reason) = validate_name(symbolic_name) {
            discovery.warnings.push(DiscoveryWarning::InvalidName {
                name: symbolic_name.to_string(),
                origin: path.display().to_string(),
                reason,
            });
            continue;
        }

        tracing::debug!(name = symbolic_name, path = %path.display(), "Discovered tool server");
        discovery
            .servers
            .push(ServerDescriptor::scanned(symbolic_name, path));
    }

    discovery
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    const SUFFIX: &str = "_server.py";

    fn touch(dir: &Path, name: &str) {
        fs::write(dir.join(name), "# tool server\n").expect("write server file");
    }

    fn sorted_names(discovery: &Discovery) -> Vec<String> {
        let mut names: Vec<String> = discovery
            .servers
            .iter()
            .map(|s| s.symbolic_name.clone())
            .collect();
        names.sort();
        names
    }

    #[test]
    fn strips_suffix_to_derive_symbolic_names() {
        let tmp = TempDir::new().unwrap();
        touch(tmp.path(), "search_web_server.py");
        touch(tmp.path(), "doc_retriever_server.py");

        let discovery = discover_servers(tmp.path(), SUFFIX);

        assert_eq!(sorted_names(&discovery), vec!["doc_retriever", "search_web"]);
        assert!(discovery.warnings.is_empty());
        for server in &discovery.servers {
            assert_eq!(
                server.entry_point,
                tmp.path().join(format!("{}{SUFFIX}", server.symbolic_name))
            );
            assert_eq!(server.source, crate::discovery::ServerSource::Scanned);
        }
    }

    #[test]
    fn ignores_files_without_the_suffix() {
        let tmp = TempDir::new().unwrap();
        touch(tmp.path(), "web_server.py");
        touch(tmp.path(), "helpers.py");
        touch(tmp.path(), "README.md");
        touch(tmp.path(), "web_server.py.bak");

        let discovery = discover_servers(tmp.path(), SUFFIX);

        assert_eq!(sorted_names(&discovery), vec!["web"]);
        assert!(discovery.warnings.is_empty());
    }

    #[test]
    fn ignores_directories_matching_the_suffix() {
        let tmp = TempDir::new().unwrap();
        fs::create_dir(tmp.path().join("nested_server.py")).unwrap();
        touch(tmp.path(), "real_server.py");

        let discovery = discover_servers(tmp.path(), SUFFIX);

        assert_eq!(sorted_names(&discovery), vec!["real"]);
    }

    #[test]
    fn missing_directory_is_not_fatal() {
        let tmp = TempDir::new().unwrap();
        let missing = tmp.path().join("nope");

        let discovery = discover_servers(&missing, SUFFIX);

        assert!(discovery.servers.is_empty());
        assert_eq!(
            discovery.warnings,
            vec![DiscoveryWarning::MissingDirectory { path: missing }]
        );
    }

    #[cfg(unix)]
    #[test]
    fn unreadable_entry_is_skipped_with_warning() {
        let tmp = TempDir::new().unwrap();
        touch(tmp.path(), "web_server.py");
        let ghost = tmp.path().join("ghost_server.py");
        std::os::unix::fs::symlink(tmp.path().join("missing_target.py"), &ghost).unwrap();

        let discovery = discover_servers(tmp.path(), SUFFIX);

        assert_eq!(sorted_names(&discovery), vec!["web"]);
        assert_eq!(discovery.warnings.len(), 1);
        match &discovery.warnings[0] {
            DiscoveryWarning::UnreadableEntry { path, .. } => assert_eq!(path, &ghost),
            other => panic!("expected UnreadableEntry, got {other:?}"),
        }
    }

    #[test]
    fn rejects_invalid_names_with_structured_warning() {
        let tmp = TempDir::new().unwrap();
        touch(tmp.path(), "_server.py");
        touch(tmp.path(), "web search_server.py");
        touch(tmp.path(), "ok_server.py");

        let discovery = discover_servers(tmp.path(), SUFFIX);

        assert_eq!(sorted_names(&discovery), vec!["ok"]);
        assert_eq!(discovery.warnings.len(), 2);
        assert!(
            discovery
                .warnings
                .iter()
                .all(|w| matches!(w, DiscoveryWarning::InvalidName { .. }))
        );
    }
}
