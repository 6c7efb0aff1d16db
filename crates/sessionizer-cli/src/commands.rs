//! Command handlers for CLI subcommands.

use std::path::Path;

use sessionizer_core::{
    build_entries, start_session, Config, FixedDelay, LayoutEngine, PaneReadiness,
};
use sessionizer_layout::LayoutSpec;
use sessionizer_tmux::{CommandExecutor, Session, TmuxError, TmuxServer};
use tracing::{debug, info};

use crate::cli::Commands;
use crate::picker;

/// Result type for command operations.
pub type Result<T> = std::result::Result<T, Box<dyn std::error::Error>>;

/// Execute a CLI command against the local tmux server.
///
/// Checking a layout file does not touch tmux, so it works without one.
pub fn execute(command: Commands, config_path: &Path) -> Result<()> {
    let output = match command {
        Commands::Layout { file, apply: false } => print_layout(&file)?,
        command => {
            let server = TmuxServer::new()?;
            run(&server, FixedDelay::default(), command, config_path)?
        }
    };
    if !output.is_empty() {
        println!("{}", output);
    }
    Ok(())
}

/// Run a command and return what it prints.
pub fn run<E, R>(
    server: &TmuxServer<E>,
    readiness: R,
    command: Commands,
    config_path: &Path,
) -> Result<String>
where
    E: CommandExecutor,
    R: PaneReadiness,
{
    match command {
        Commands::Search => cmd_search(server, readiness, config_path),
        Commands::Start => cmd_start(server, readiness, config_path),
        Commands::Sessions { detached, json } => cmd_sessions(server, detached, json),
        Commands::Session { json } => cmd_session(server, json),
        Commands::Windows { json } => cmd_windows(server, json),
        Commands::Window { json } => cmd_window(server, json),
        Commands::Panes { json } => cmd_panes(server, json),
        Commands::Layout { file, apply } => cmd_layout(server, readiness, &file, apply),
    }
}

fn cmd_search<E: CommandExecutor, R: PaneReadiness>(
    server: &TmuxServer<E>,
    readiness: R,
    config_path: &Path,
) -> Result<String> {
    let config = Config::from_file(config_path)?;
    let entries = build_entries(&config);
    debug!(entries = entries.len(), "built entries");

    match picker::pick(&entries)? {
        Some(entry) => start(server, readiness, &entry.label, &entry.path_str()),
        None => {
            info!("selection cancelled");
            Ok(String::new())
        }
    }
}

fn cmd_start<E: CommandExecutor, R: PaneReadiness>(
    server: &TmuxServer<E>,
    readiness: R,
    config_path: &Path,
) -> Result<String> {
    let config = Config::from_file(config_path)?;
    start(server, readiness, &config.default.name, &config.default.path)
}

fn start<E: CommandExecutor, R: PaneReadiness>(
    server: &TmuxServer<E>,
    readiness: R,
    name: &str,
    path: &str,
) -> Result<String> {
    let provisioned = start_session(server, readiness, name, path)?;
    let session = provisioned.session();
    info!(
        session = %session.name,
        created = provisioned.freshly_created(),
        "entered session"
    );
    Ok(String::new())
}

fn to_json<T: serde::Serialize + ?Sized>(value: &T) -> Result<String> {
    Ok(serde_json::to_string_pretty(value)?)
}

fn cmd_sessions<E: CommandExecutor>(
    server: &TmuxServer<E>,
    detached: bool,
    json: bool,
) -> Result<String> {
    let sessions = server.list_sessions(detached)?;
    if !json {
        let names: Vec<&str> = sessions.iter().map(|s| s.name.as_str()).collect();
        return Ok(names.join("\n"));
    }

    let hydrated = sessions
        .into_iter()
        .map(|s| server.hydrate_session(s))
        .collect::<std::result::Result<Vec<_>, _>>()?;
    to_json(&hydrated)
}

/// The caller's session, or `None` when there is no client to ask about.
fn current_session<E: CommandExecutor>(server: &TmuxServer<E>) -> Result<Option<Session>> {
    match server.current_session() {
        Ok(session) => Ok(Some(server.hydrate_session(session)?)),
        Err(e) if is_absent(&e) => {
            debug!(error = %e, "no current session");
            Ok(None)
        }
        Err(e) => Err(e.into()),
    }
}

/// Failures meaning the caller has no session, as opposed to tmux breaking.
fn is_absent(e: &TmuxError) -> bool {
    match e.root() {
        TmuxError::SessionNotFound(_) => true,
        TmuxError::CommandFailed(stderr) => {
            stderr.contains("no current client") || e.is_no_server()
        }
        _ => false,
    }
}

fn require_session<E: CommandExecutor>(server: &TmuxServer<E>) -> Result<Session> {
    current_session(server)?.ok_or_else(|| "not inside a tmux session".into())
}

fn cmd_session<E: CommandExecutor>(server: &TmuxServer<E>, json: bool) -> Result<String> {
    match (current_session(server)?, json) {
        (Some(session), true) => to_json(&session),
        (Some(session), false) => Ok(session.name),
        (None, true) => Ok("{}".to_string()),
        (None, false) => Ok(String::new()),
    }
}

fn cmd_windows<E: CommandExecutor>(server: &TmuxServer<E>, json: bool) -> Result<String> {
    let session = require_session(server)?;
    if json {
        return to_json(&session.windows);
    }
    let lines: Vec<String> = session
        .windows
        .iter()
        .map(|w| format!("{}\t{}", w.id, w.name))
        .collect();
    Ok(lines.join("\n"))
}

fn cmd_window<E: CommandExecutor>(server: &TmuxServer<E>, json: bool) -> Result<String> {
    let mut window = server.current_window()?;
    window.panes = server.list_panes(&window.id)?;
    if json {
        to_json(&window)
    } else {
        Ok(format!("{}\t{}", window.id, window.name))
    }
}

fn cmd_panes<E: CommandExecutor>(server: &TmuxServer<E>, json: bool) -> Result<String> {
    let window = server.current_window()?;
    let panes = server.list_panes(&window.id)?;
    if json {
        return to_json(&panes);
    }
    let ids: Vec<&str> = panes.iter().map(|p| p.id.as_str()).collect();
    Ok(ids.join("\n"))
}

fn cmd_layout<E: CommandExecutor, R: PaneReadiness>(
    server: &TmuxServer<E>,
    readiness: R,
    file: &Path,
    apply: bool,
) -> Result<String> {
    if !apply {
        return print_layout(file);
    }

    let spec = LayoutSpec::from_file(file)?;
    let session = require_session(server)?;
    LayoutEngine::new(server, readiness).apply(&session, &spec)?;
    info!(session = %session.name, file = %file.display(), "layout applied");
    Ok("Applied".to_string())
}

/// Validate a layout file and render it back as YAML.
fn print_layout(file: &Path) -> Result<String> {
    let spec = LayoutSpec::from_file(file)?;
    Ok(spec.to_yaml()?.trim_end().to_string())
}
