//! Command-line interface definition using clap.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use sessionizer_core::config_file;

/// Build version string with git hash and build date.
fn version_string() -> &'static str {
    const VERSION: &str = env!("CARGO_PKG_VERSION");
    const GIT_HASH: &str = env!("GIT_HASH");
    const BUILD_DATE: &str = env!("BUILD_DATE");

    // Format: "0.3.0 (abc1234, 2026-01-29)"
    static VERSION_STRING: std::sync::OnceLock<String> = std::sync::OnceLock::new();
    VERSION_STRING.get_or_init(|| format!("{} ({}, {})", VERSION, GIT_HASH, BUILD_DATE))
}

/// Sessionizer - jump between per-project tmux sessions
#[derive(Parser, Debug)]
#[command(name = "sessionizer")]
#[command(author, version = version_string(), about, long_about = None)]
pub struct Cli {
    /// Enable verbose output (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Path to the config file
    #[arg(short, long, env = "SESSIONIZER_CONFIG", global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Commands {
    /// Pick a project and start its session (default)
    Search,

    /// Start the configured default session
    Start,

    /// List sessions
    Sessions {
        /// Only sessions no client is attached to
        #[arg(short, long)]
        detached: bool,

        /// Print hydrated sessions as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show the current session
    Session {
        #[arg(long)]
        json: bool,
    },

    /// List windows of the current session
    Windows {
        #[arg(long)]
        json: bool,
    },

    /// Show the current window
    Window {
        #[arg(long)]
        json: bool,
    },

    /// List panes of the current window
    Panes {
        #[arg(long)]
        json: bool,
    },

    /// Check a layout file and print it, or apply it to the current session
    Layout {
        /// Path to a YAML layout file
        #[arg(required = true)]
        file: PathBuf,

        /// Apply to the current session instead of printing
        #[arg(short, long)]
        apply: bool,
    },
}

impl Cli {
    /// The config file to read, using the standard location if not given.
    pub fn config_file(&self) -> PathBuf {
        self.config.clone().unwrap_or_else(config_file)
    }

    /// Returns the log level based on verbosity.
    pub fn log_level(&self) -> tracing::Level {
        match self.verbose {
            0 => tracing::Level::WARN,
            1 => tracing::Level::INFO,
            2 => tracing::Level::DEBUG,
            _ => tracing::Level::TRACE,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_parse_no_args() {
        let cli = Cli::parse_from(["sessionizer"]);
        assert!(cli.command.is_none());
        assert_eq!(cli.log_level(), tracing::Level::WARN);
    }

    #[test]
    fn test_cli_parse_sessions() {
        let cli = Cli::parse_from(["sessionizer", "sessions", "-d", "--json"]);
        assert_eq!(
            cli.command,
            Some(Commands::Sessions {
                detached: true,
                json: true
            })
        );
    }

    #[test]
    fn test_cli_parse_layout() {
        let cli = Cli::parse_from(["sessionizer", "layout", "dev.yml", "-a"]);
        match cli.command {
            Some(Commands::Layout { file, apply }) => {
                assert_eq!(file, PathBuf::from("dev.yml"));
                assert!(apply);
            }
            _ => panic!("Expected Layout command"),
        }
    }

    #[test]
    fn test_cli_layout_requires_file() {
        assert!(Cli::try_parse_from(["sessionizer", "layout"]).is_err());
    }

    #[test]
    fn test_cli_config_flag() {
        let cli = Cli::parse_from(["sessionizer", "--config", "/tmp/s.toml", "start"]);
        assert_eq!(cli.config_file(), PathBuf::from("/tmp/s.toml"));
        assert_eq!(cli.command, Some(Commands::Start));
    }

    #[test]
    fn test_cli_verbose() {
        let cli = Cli::parse_from(["sessionizer", "-vvv"]);
        assert_eq!(cli.verbose, 3);
        assert_eq!(cli.log_level(), tracing::Level::TRACE);

        let cli = Cli::parse_from(["sessionizer", "panes", "-vv"]);
        assert_eq!(cli.log_level(), tracing::Level::DEBUG);
    }

    #[test]
    fn test_version_string_carries_build_stamp() {
        let version = version_string();
        assert!(version.starts_with(env!("CARGO_PKG_VERSION")));
        assert!(version.contains(&format!("({}, ", env!("GIT_HASH"))));
        assert!(!env!("GIT_HASH").is_empty());
    }

    #[test]
    fn test_cli_help() {
        Cli::command().debug_assert();
    }
}
