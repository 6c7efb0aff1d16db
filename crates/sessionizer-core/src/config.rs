//! Sessionizer's configuration file.
//!
//! # Location
//!
//! The first of these that applies:
//!
//! 1. `SESSIONIZER_CONFIG`, if set
//! 2. `$XDG_CONFIG_HOME/sessionizer/config.toml`, if that file exists
//! 3. `~/.config/sessionizer/config.toml`
//!
//! # Format
//!
//! ```toml
//! [default]
//! name = "default"
//! path = "~"
//!
//! [search]
//! directories = ["~/src"]
//! entries = ["~/dotfiles"]
//!
//! [base]
//! ignore = ["node_modules", "target"]
//! rooter_patterns = [".git"]
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use sessionizer_layout::expand_path;
use tracing::debug;

use crate::error::ConfigError;

/// Environment variable naming the config file directly.
pub const CONFIG_FILE_ENV: &str = "SESSIONIZER_CONFIG";

/// Environment variable for the XDG config base directory.
pub const XDG_CONFIG_HOME_ENV: &str = "XDG_CONFIG_HOME";

const APP_DIR: &str = "sessionizer";
const CONFIG_FILE_NAME: &str = "config.toml";

fn env_path(name: &str) -> Option<PathBuf> {
    std::env::var_os(name)
        .filter(|v| !v.is_empty())
        .map(PathBuf::from)
}

/// Directories searched for `config.toml`, most specific first.
pub fn config_dirs() -> Vec<PathBuf> {
    let mut dirs = Vec::new();
    if let Some(xdg) = env_path(XDG_CONFIG_HOME_ENV) {
        dirs.push(xdg.join(APP_DIR));
    }
    if let Some(home) = dirs::home_dir() {
        let dir = home.join(".config").join(APP_DIR);
        if !dirs.contains(&dir) {
            dirs.push(dir);
        }
    }
    if dirs.is_empty() {
        dirs.push(PathBuf::from(".config").join(APP_DIR));
    }
    dirs
}

/// Get the config file path.
///
/// Falls back to the most specific candidate when none exists yet.
pub fn config_file() -> PathBuf {
    if let Some(path) = env_path(CONFIG_FILE_ENV) {
        return path;
    }
    let candidates: Vec<PathBuf> = config_dirs()
        .into_iter()
        .map(|d| d.join(CONFIG_FILE_NAME))
        .collect();
    candidates
        .iter()
        .find(|p| p.is_file())
        .or_else(|| candidates.first())
        .cloned()
        .unwrap_or_else(|| PathBuf::from(CONFIG_FILE_NAME))
}

/// The session `start` opens.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DefaultSession {
    pub name: String,
    pub path: String,
}

impl Default for DefaultSession {
    fn default() -> Self {
        Self {
            name: "default".to_string(),
            path: "~".to_string(),
        }
    }
}

/// Where to look for projects.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    /// Walked recursively for project roots.
    pub directories: Vec<String>,
    /// Offered as-is.
    pub entries: Vec<String>,
}

/// Rules applied while walking search directories.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BaseConfig {
    /// Directory names never descended into.
    pub ignore: Vec<String>,
    /// A directory holding any of these is a project root.
    pub rooter_patterns: Vec<String>,
}

impl Default for BaseConfig {
    fn default() -> Self {
        Self {
            ignore: Vec::new(),
            rooter_patterns: vec![".git".to_string()],
        }
    }
}

/// Parsed configuration file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub default: DefaultSession,
    pub search: SearchConfig,
    pub base: BaseConfig,
}

impl Config {
    /// Load the config file from its standard location.
    pub fn load() -> Result<Self, ConfigError> {
        Self::from_file(config_file())
    }

    /// Load and expand a config file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(ConfigError::NotFound(path.to_path_buf()));
        }
        debug!(path = %path.display(), "loading config");
        let data = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&data)
    }

    /// Parse config text and expand every path in it.
    pub fn from_toml_str(data: &str) -> Result<Self, ConfigError> {
        let mut config: Config = toml::from_str(data)?;
        config.expand_paths();
        Ok(config)
    }

    fn expand_paths(&mut self) {
        self.default.path = expand_path(&self.default.path);
        for dir in &mut self.search.directories {
            *dir = expand_path(dir);
        }
        for entry in &mut self.search.entries {
            *entry = expand_path(entry);
        }
    }
}
