//! Queries and commands against a tmux server.

use std::env;

use tracing::{debug, trace};

use crate::context::{TmuxContext, TMUX_ENV};
use crate::executor::{CommandExecutor, TmuxCommand};
use crate::naming::SessionName;
use crate::record::{decode, decode_all, decode_single, Pane, Record, Session, Window};
use crate::{Result, TmuxError};

/// Direction of a pane split.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    /// Side by side (left/right).
    Horizontal,
    /// Stacked (top/bottom).
    Vertical,
}

impl Direction {
    fn flag(self) -> &'static str {
        match self {
            Self::Horizontal => "-h",
            Self::Vertical => "-v",
        }
    }
}

/// A tmux server reached through a [`CommandExecutor`].
#[derive(Debug)]
pub struct TmuxServer<E = TmuxCommand> {
    executor: E,
}

impl TmuxServer<TmuxCommand> {
    /// Connect to the tmux binary found on PATH.
    ///
    /// # Errors
    ///
    /// Returns `TmuxError::BinaryNotFound` if tmux is not available.
    pub fn new() -> Result<Self> {
        Ok(Self::with_executor(TmuxCommand::new()?))
    }
}

impl<E: CommandExecutor> TmuxServer<E> {
    /// Create a server handle on top of the given executor.
    pub fn with_executor(executor: E) -> Self {
        Self { executor }
    }

    /// Returns a reference to the executor.
    pub fn executor(&self) -> &E {
        &self.executor
    }

    /// Run a tmux command, naming the operation on failure.
    fn run(&self, operation: impl FnOnce() -> String, args: &[&str]) -> Result<String> {
        trace!(args = ?args, "tmux");
        self.executor.run(args).map_err(|e| e.during(operation()))
    }

    // ==================== Listing & Hydration ====================

    fn list_sessions_filtered(&self, filter: Option<&str>) -> Result<Vec<Session>> {
        let mut args = vec!["list-sessions", "-F", Session::FORMAT];
        if let Some(filter) = filter {
            args.push("-f");
            args.push(filter);
        }
        let output = self.run(|| "list sessions".to_string(), &args)?;
        Ok(decode_all(&output))
    }

    /// List sessions without their windows.
    ///
    /// Fails when no server is running.
    pub fn list_sessions(&self, detached_only: bool) -> Result<Vec<Session>> {
        let filter = detached_only.then_some("#{==:#{session_attached},0}");
        self.list_sessions_filtered(filter)
    }

    /// List the windows of a session, without their panes.
    pub fn list_windows(&self, session_id: &str) -> Result<Vec<Window>> {
        let output = self.run(
            || format!("list windows for session {}", session_id),
            &["list-windows", "-t", session_id, "-F", Window::FORMAT],
        )?;
        Ok(decode_all(&output))
    }

    /// List the panes of a window.
    pub fn list_panes(&self, window_id: &str) -> Result<Vec<Pane>> {
        let output = self.run(
            || format!("list panes for window {}", window_id),
            &["list-panes", "-t", window_id, "-F", Pane::FORMAT],
        )?;
        Ok(decode_all(&output))
    }

    /// List a session's windows with their panes.
    pub fn hydrate_windows(&self, session_id: &str) -> Result<Vec<Window>> {
        let mut windows = self.list_windows(session_id)?;
        for window in &mut windows {
            window.panes = self.list_panes(&window.id)?;
        }
        Ok(windows)
    }

    /// Fill in a session's windows and panes.
    pub fn hydrate_session(&self, mut session: Session) -> Result<Session> {
        session.windows = self.hydrate_windows(&session.id)?;
        Ok(session)
    }

    /// All sessions with their windows and panes.
    pub fn sessions(&self) -> Result<Vec<Session>> {
        self.list_sessions(false)?
            .into_iter()
            .map(|session| self.hydrate_session(session))
            .collect()
    }

    // ==================== Lookups ====================

    /// Find a session by exact name.
    ///
    /// Returns `Ok(None)` when no such session exists, including when no
    /// server is running yet. Corrupt output is an error.
    ///
    /// Names are compared here rather than in a tmux filter, since a name
    /// may contain format syntax such as `}`.
    pub fn session_by_name(&self, name: &SessionName) -> Result<Option<Session>> {
        let args = ["list-sessions", "-F", Session::FORMAT];
        match self.run(|| format!("session by name {}", name), &args) {
            Ok(output) => {
                for line in output.lines().filter(|line| !line.trim().is_empty()) {
                    let session: Session = decode(line)?;
                    if session.name == name.as_str() {
                        return Ok(Some(session));
                    }
                }
                Ok(None)
            }
            Err(e) if e.is_no_server() => {
                debug!(name = %name, "no tmux server running");
                Ok(None)
            }
            Err(e) => Err(e),
        }
    }

    /// The session the calling client is in.
    pub fn current_session(&self) -> Result<Session> {
        let output = self.run(
            || "current session id".to_string(),
            &["display-message", "-p", "#{session_id}"],
        )?;
        let id = output.trim();
        if id.is_empty() {
            return Err(TmuxError::SessionNotFound("current".into()));
        }

        let filter = format!("#{{==:#{{session_id}},{}}}", id);
        let output = self.run(
            || format!("current session {}", id),
            &["list-sessions", "-F", Session::FORMAT, "-f", filter.as_str()],
        )?;
        decode_single(&output)?.ok_or_else(|| TmuxError::SessionNotFound(id.to_string()))
    }

    /// The window the calling client is looking at.
    pub fn current_window(&self) -> Result<Window> {
        let output = self.run(
            || "current window".to_string(),
            &["display-message", "-p", Window::FORMAT],
        )?;
        decode_single(&output)?.ok_or_else(|| TmuxError::WindowNotFound("current".into()))
    }

    /// Check if a session with exactly this name exists.
    pub fn has_session(&self, name: &SessionName) -> bool {
        let target = format!("={}", name);
        self.executor.run(&["has-session", "-t", &target]).is_ok()
    }

    // ==================== Creation ====================

    /// Create a detached session and return it hydrated.
    ///
    /// tmux echoes the new session's record, which is authoritative.
    pub fn create_session(&self, name: &SessionName, path: &str) -> Result<Session> {
        debug!(name = %name, path = %path, "creating tmux session");
        let operation = || format!("create session {}", name);

        let mut args = vec!["new-session", "-d", "-s", name.as_str()];
        if !path.is_empty() {
            args.extend(["-c", path]);
        }
        args.extend(["-P", "-F", Session::FORMAT]);

        let output = self.run(operation, &args)?;
        let session = decode_single::<Session>(&output)
            .map_err(|e| e.during(operation()))?
            .ok_or_else(|| {
                TmuxError::CommandFailed("new-session printed no record".into()).during(operation())
            })?;
        self.hydrate_session(session)
    }

    /// Create a window at the end of a session and return its id.
    pub fn add_window(&self, session_id: &str, name: Option<&str>, dir: &str) -> Result<String> {
        debug!(session = %session_id, name = ?name, dir = %dir, "creating window");
        let target = format!("{}:", session_id);

        let mut args = vec!["new-window", "-t", target.as_str()];
        if let Some(name) = name.filter(|n| !n.is_empty()) {
            args.extend(["-n", name]);
        }
        if !dir.is_empty() {
            args.extend(["-c", dir]);
        }
        args.extend(["-P", "-F", "#{window_id}"]);

        let output = self.run(|| format!("create window in session {}", session_id), &args)?;
        Ok(output.trim().to_string())
    }

    /// Split a pane and return the new pane's id.
    pub fn split_pane(&self, pane_id: &str, direction: Direction, dir: &str) -> Result<String> {
        debug!(pane = %pane_id, ?direction, dir = %dir, "splitting pane");

        let mut args = vec!["split-window", direction.flag(), "-t", pane_id];
        if !dir.is_empty() {
            args.extend(["-c", dir]);
        }
        args.extend(["-P", "-F", "#{pane_id}"]);

        let output = self.run(|| format!("split pane {}", pane_id), &args)?;
        Ok(output.trim().to_string())
    }

    // ==================== Commands ====================

    pub fn rename_window(&self, window_id: &str, name: &str) -> Result<()> {
        self.run(
            || format!("rename window {}", window_id),
            &["rename-window", "-t", window_id, name],
        )
        .map(drop)
    }

    pub fn select_window(&self, window_id: &str) -> Result<()> {
        self.run(
            || format!("select window {}", window_id),
            &["select-window", "-t", window_id],
        )
        .map(drop)
    }

    pub fn select_pane(&self, pane_id: &str) -> Result<()> {
        self.run(
            || format!("select pane {}", pane_id),
            &["select-pane", "-t", pane_id],
        )
        .map(drop)
    }

    /// Apply a named arrangement (e.g. `main-vertical`) to a window.
    pub fn select_layout(&self, window_id: &str, layout: &str) -> Result<()> {
        self.run(
            || format!("select layout {} for window {}", layout, window_id),
            &["select-layout", "-t", window_id, layout],
        )
        .map(drop)
    }

    /// Type a line of text into a pane and press Enter.
    ///
    /// The text is sent literally, so `Enter` or `C-c` are typed as words
    /// rather than pressed as keys.
    pub fn send_keys(&self, pane_id: &str, text: &str) -> Result<()> {
        debug!(pane = %pane_id, text = %text, "sending line");
        let operation = || format!("send keys to pane {}", pane_id);
        self.run(operation, &["send-keys", "-t", pane_id, "-l", "--", text])?;
        self.run(operation, &["send-keys", "-t", pane_id, "Enter"])
            .map(drop)
    }

    // ==================== Context & Entry ====================

    /// Classify the calling process's relationship to this server.
    ///
    /// Evaluated fresh on every call.
    pub fn context(&self) -> TmuxContext {
        self.context_with_marker(env::var_os(TMUX_ENV).as_deref())
    }

    /// Classify using an explicit `TMUX` marker value.
    pub fn context_with_marker(&self, marker: Option<&std::ffi::OsStr>) -> TmuxContext {
        let listing = self.list_sessions(false);
        if let Err(e) = &listing {
            trace!(error = %e, "session listing probe failed");
        }
        TmuxContext::classify(listing.is_ok(), marker)
    }

    /// Switch the current client from inside tmux.
    pub fn switch_session(&self, name: &str) -> Result<()> {
        self.run(|| format!("switch to session {}", name), &["switch", "-t", name])
            .map(drop)
    }

    /// Attach the controlling terminal to a session.
    pub fn attach_session(&self, name: &str) -> Result<()> {
        self.executor
            .run_attached(&["attach", "-t", name])
            .map_err(|e| e.during(format!("attach to session {}", name)))
    }

    pub fn switch_client(&self, name: &str) -> Result<()> {
        self.run(
            || format!("switch client to session {}", name),
            &["switch-client", "-t", name],
        )
        .map(drop)
    }
}
