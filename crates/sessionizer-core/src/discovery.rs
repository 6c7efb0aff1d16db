//! Finding the projects the picker offers.

use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::{debug, trace};
use walkdir::WalkDir;

use crate::config::Config;

/// Something a session can be started for.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Entry {
    /// Shown in the picker and used as the session name.
    pub label: String,
    pub path: PathBuf,
}

impl Entry {
    pub fn new(label: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        Self {
            label: label.into(),
            path: path.into(),
        }
    }

    /// The path as tmux receives it.
    pub fn path_str(&self) -> String {
        self.path.to_string_lossy().into_owned()
    }
}

/// Whether `dir` contains any of the rooter patterns.
pub fn is_project_root(dir: &Path, rooter_patterns: &[String]) -> bool {
    rooter_patterns.iter().any(|p| dir.join(p).exists())
}

fn base_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.to_string_lossy().into_owned())
}

/// Project roots below `dir`, labelled relative to it.
///
/// Project roots are not descended into. Directories whose name is in
/// `ignore` are skipped along with everything under them. Unreadable
/// directories are skipped.
pub fn entries_from_dir(dir: &Path, ignore: &[String], rooter_patterns: &[String]) -> Vec<Entry> {
    let mut entries = Vec::new();
    let mut walker = WalkDir::new(dir).sort_by_file_name().into_iter();

    while let Some(item) = walker.next() {
        let entry = match item {
            Ok(entry) => entry,
            Err(e) => {
                debug!(error = %e, "skipping unreadable path");
                continue;
            }
        };
        if !entry.file_type().is_dir() {
            continue;
        }

        let path = entry.path();
        if is_project_root(path, rooter_patterns) {
            let label = match path.strip_prefix(dir) {
                Ok(rel) if !rel.as_os_str().is_empty() => rel.to_string_lossy().into_owned(),
                _ => base_name(path),
            };
            trace!(label = %label, path = %path.display(), "found project");
            entries.push(Entry::new(label, path));
            walker.skip_current_dir();
            continue;
        }

        let ignored = entry.depth() > 0
            && ignore
                .iter()
                .any(|name| entry.file_name().to_string_lossy() == name.as_str());
        if ignored {
            trace!(path = %path.display(), "ignoring directory");
            walker.skip_current_dir();
        }
    }

    entries
}

/// An explicitly listed path, labelled with its base name.
pub fn entry_from_path(path: &Path) -> Entry {
    Entry::new(base_name(path), path)
}

/// Everything the picker offers: the default session, discovered projects,
/// then explicit entries.
pub fn build_entries(config: &Config) -> Vec<Entry> {
    let mut entries = vec![Entry::new(&config.default.name, &config.default.path)];

    for dir in &config.search.directories {
        let found = entries_from_dir(Path::new(dir), &config.base.ignore, &config.base.rooter_patterns);
        debug!(dir = %dir, projects = found.len(), "searched directory");
        entries.extend(found);
    }

    entries.extend(
        config
            .search
            .entries
            .iter()
            .filter(|p| !p.is_empty())
            .map(|p| entry_from_path(Path::new(p))),
    );
    entries
}

#[cfg(test)]
mod tests {
    use std::fs;

    use super::*;

    fn git_repo(root: &Path, rel: &str) {
        fs::create_dir_all(root.join(rel).join(".git")).unwrap();
    }

    fn tree() -> tempfile::TempDir {
        let root = tempfile::tempdir().unwrap();
        git_repo(root.path(), "alpha");
        git_repo(root.path(), "alpha/nested");
        git_repo(root.path(), "group/beta");
        git_repo(root.path(), "node_modules/dep");
        fs::create_dir_all(root.path().join("group/plain")).unwrap();
        fs::write(root.path().join("README"), "").unwrap();
        root
    }

    fn labels(entries: &[Entry]) -> Vec<&str> {
        entries.iter().map(|e| e.label.as_str()).collect()
    }

    #[test]
    fn test_finds_project_roots() {
        let root = tree();
        let patterns = vec![".git".to_string()];
        let ignore = vec!["node_modules".to_string()];

        let entries = entries_from_dir(root.path(), &ignore, &patterns);
        assert_eq!(labels(&entries), vec!["alpha", "group/beta"]);
        assert_eq!(entries[1].path, root.path().join("group/beta"));
    }

    #[test]
    fn test_ignore_list_is_optional() {
        let root = tree();
        let entries = entries_from_dir(root.path(), &[], &[".git".to_string()]);
        assert_eq!(labels(&entries), vec!["alpha", "group/beta", "node_modules/dep"]);
    }

    #[test]
    fn test_search_dir_itself_a_project() {
        let root = tempfile::tempdir().unwrap();
        git_repo(root.path(), "solo");
        let solo = root.path().join("solo");

        let entries = entries_from_dir(&solo, &[], &[".git".to_string()]);
        assert_eq!(labels(&entries), vec!["solo"]);
    }

    #[test]
    fn test_other_rooter_patterns() {
        let root = tempfile::tempdir().unwrap();
        fs::create_dir_all(root.path().join("crate")).unwrap();
        fs::write(root.path().join("crate/Cargo.toml"), "").unwrap();

        let entries = entries_from_dir(root.path(), &[], &["Cargo.toml".to_string()]);
        assert_eq!(labels(&entries), vec!["crate"]);
    }

    #[test]
    fn test_missing_dir_yields_nothing() {
        let entries = entries_from_dir(Path::new("/nonexistent/search"), &[], &[".git".to_string()]);
        assert!(entries.is_empty());
    }

    #[test]
    fn test_entry_from_path() {
        let entry = entry_from_path(Path::new("/home/me/dotfiles"));
        assert_eq!(entry.label, "dotfiles");
        assert_eq!(entry.path_str(), "/home/me/dotfiles");
    }

    #[test]
    fn test_build_entries_order() {
        let root = tree();
        let mut config = Config::default();
        config.default.name = "home".into();
        config.default.path = "/home/me".into();
        config.search.directories = vec![root.path().to_string_lossy().into_owned()];
        config.search.entries = vec!["/etc/nixos".into(), String::new()];
        config.base.ignore = vec!["node_modules".into()];

        let entries = build_entries(&config);
        assert_eq!(labels(&entries), vec!["home", "alpha", "group/beta", "nixos"]);
        assert_eq!(entries[0].path, PathBuf::from("/home/me"));
    }
}
