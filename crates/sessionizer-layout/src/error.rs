//! Error types for layout files.

use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur while loading a layout.
#[derive(Error, Debug)]
pub enum SpecError {
    /// The layout file could not be read.
    #[error("failed to read layout {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The YAML could not be parsed into a layout.
    #[error("invalid layout yaml: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// A layout without windows.
    #[error("layout must have at least one window")]
    NoWindows,

    /// A window without panes.
    #[error("window {0} must have at least one pane")]
    NoPanes(usize),

    /// An arrangement name tmux does not know.
    #[error("unknown layout arrangement '{0}'")]
    UnknownArrangement(String),
}

/// Result type alias for layout operations.
pub type Result<T> = std::result::Result<T, SpecError>;
