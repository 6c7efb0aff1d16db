//! Sessionizer CLI entry point.

use clap::Parser;
use tracing_subscriber::{fmt, EnvFilter};

use sessionizer_cli::cli::{Cli, Commands};
use sessionizer_cli::commands;

fn main() {
    let cli = Cli::parse();

    // Initialize tracing
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(cli.log_level().to_string()));

    fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let config_path = cli.config_file();

    // No command = pick a project
    let command = cli.command.unwrap_or(Commands::Search);

    if let Err(e) = commands::execute(command, &config_path) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
