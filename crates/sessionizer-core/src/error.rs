//! Error types for Sessionizer's core workflows.

use std::path::PathBuf;

use sessionizer_layout::SpecError;
use sessionizer_tmux::TmuxError;
use thiserror::Error;

use crate::engine::LayoutError;

/// Errors that can occur while loading configuration.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// No config file at the expected location.
    #[error("config file not found: {}", .0.display())]
    NotFound(PathBuf),

    /// The config file exists but could not be read.
    #[error("failed to read config {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The config file is not valid TOML for this schema.
    #[error("invalid config: {0}")]
    Parse(#[from] toml::de::Error),
}

/// Errors from end-to-end operations such as starting a session.
#[derive(Error, Debug)]
pub enum CoreError {
    #[error(transparent)]
    Tmux(#[from] TmuxError),

    #[error(transparent)]
    Spec(#[from] SpecError),

    #[error("layout failed: {0}")]
    Layout(#[from] LayoutError),

    #[error(transparent)]
    Config(#[from] ConfigError),
}

/// Result type alias for core operations.
pub type Result<T> = std::result::Result<T, CoreError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_message() {
        let err = ConfigError::NotFound(PathBuf::from("/etc/sessionizer/config.toml"));
        assert_eq!(
            err.to_string(),
            "config file not found: /etc/sessionizer/config.toml"
        );
    }

    #[test]
    fn test_tmux_error_passes_through() {
        let err: CoreError = TmuxError::BinaryNotFound.into();
        assert_eq!(err.to_string(), "tmux not found in PATH");
    }

    #[test]
    fn test_layout_error_prefixed() {
        let err: CoreError = LayoutError::WindowNotLocated { window: 2 }.into();
        assert_eq!(
            err.to_string(),
            "layout failed: could not find pane for new window 2"
        );
    }
}
