//! Sessionizer core - everything between the CLI and tmux.
//!
//! - **engine**: Apply a layout to a freshly created session
//! - **readiness**: How long to wait for a new pane's shell
//! - **config**: Locate and parse `config.toml`
//! - **discovery**: Turn search directories into pickable entries
//! - **start**: Find or create, lay out, and enter a project session

pub mod config;
pub mod discovery;
pub mod engine;
pub mod error;
pub mod readiness;
pub mod start;

pub use config::{config_file, Config, CONFIG_FILE_ENV};
pub use discovery::{build_entries, Entry};
pub use engine::{resolve_directory, LayoutEngine, LayoutError};
pub use error::{ConfigError, CoreError, Result};
pub use readiness::{FixedDelay, NoDelay, PaneReadiness};
pub use start::{start_session, LAYOUT_FILE_NAME};
