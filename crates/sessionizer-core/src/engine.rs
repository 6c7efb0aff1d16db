//! Turns a freshly created session into the topology a layout describes.
//!
//! The engine issues tmux commands strictly one at a time and in layout
//! order. Any failure stops it; whatever was already created stays.

use sessionizer_layout::{LayoutSpec, PaneSpec, SpecError, WindowSpec};
use sessionizer_tmux::{CommandExecutor, Direction, Session, TmuxError, TmuxServer};
use thiserror::Error;
use tracing::{debug, info};

use crate::readiness::PaneReadiness;

/// Typed into every new pane once its shell had time to start.
pub const CLEAR_COMMAND: &str = "clear";

/// Additional panes are split off the window's first pane this way.
pub const SPLIT_DIRECTION: Direction = Direction::Horizontal;

/// Errors that can occur while applying a layout.
#[derive(Error, Debug)]
pub enum LayoutError {
    /// The layout itself is unusable.
    #[error("invalid layout: {0}")]
    Invalid(#[from] SpecError),

    /// The session was handed over without a window and pane.
    #[error("session '{0}' has no initial pane")]
    NoInitialPane(String),

    /// A tmux command failed while laying out a window.
    #[error("window {window}: {step}: {source}")]
    Step {
        window: usize,
        step: String,
        #[source]
        source: TmuxError,
    },

    /// A window was created but did not show up when listed.
    #[error("could not find pane for new window {window}")]
    WindowNotLocated { window: usize },
}

/// Result type alias for layout application.
pub type Result<T> = std::result::Result<T, LayoutError>;

fn step(window: usize, step: impl Into<String>) -> impl FnOnce(TmuxError) -> LayoutError {
    let step = step.into();
    move |source| LayoutError::Step {
        window,
        step,
        source,
    }
}

/// Directory a pane starts in: its own, else its window's, else the
/// session's. Empty strings count as unset.
pub fn resolve_directory<'a>(
    pane: &'a PaneSpec,
    window: &'a WindowSpec,
    session_path: &'a str,
) -> &'a str {
    [pane.start_directory.as_deref(), window.start_directory.as_deref()]
        .into_iter()
        .flatten()
        .find(|dir| !dir.is_empty())
        .unwrap_or(session_path)
}

/// Pane to focus: the last one in the window marked `focus`.
pub fn focused_pane(panes: &[PaneSpec]) -> Option<usize> {
    panes.iter().rposition(|pane| pane.focus)
}

/// The window being laid out and the pane tmux gave it.
struct WindowTarget {
    window_id: String,
    pane_id: String,
    /// Already carries its name from `new-window -n`.
    named: bool,
}

/// Applies [`LayoutSpec`]s to sessions on a tmux server.
pub struct LayoutEngine<'a, E, R> {
    server: &'a TmuxServer<E>,
    readiness: R,
}

impl<'a, E: CommandExecutor, R: PaneReadiness> LayoutEngine<'a, E, R> {
    pub fn new(server: &'a TmuxServer<E>, readiness: R) -> Self {
        Self { server, readiness }
    }

    /// Lay out `session` according to `spec`, then select its first window.
    ///
    /// `session` must be hydrated and hold the window and pane tmux created
    /// with it; that pair becomes the layout's first window.
    pub fn apply(&self, session: &Session, spec: &LayoutSpec) -> Result<()> {
        spec.validate()?;
        info!(session = %session.name, windows = spec.windows.len(), "applying layout");

        let (first_window, first_pane) = session
            .first_pane()
            .ok_or_else(|| LayoutError::NoInitialPane(session.name.clone()))?;
        let first_window_id = first_window.id.clone();

        for (i, window_spec) in spec.windows.iter().enumerate() {
            let target = if i == 0 {
                WindowTarget {
                    window_id: first_window.id.clone(),
                    pane_id: first_pane.id.clone(),
                    named: false,
                }
            } else {
                self.create_window(session, i, window_spec)?
            };
            self.lay_out_window(session, i, window_spec, &target)?;
        }

        self.server
            .select_window(&first_window_id)
            .map_err(step(0, "select first window"))?;
        info!(session = %session.name, "layout applied");
        Ok(())
    }

    fn create_window(&self, session: &Session, i: usize, spec: &WindowSpec) -> Result<WindowTarget> {
        let dir = spec
            .start_directory
            .as_deref()
            .filter(|dir| !dir.is_empty())
            .unwrap_or(&session.path);

        let window_id = self
            .server
            .add_window(&session.id, spec.name(), dir)
            .map_err(step(i, "create window"))?;

        // new-window only prints the window id; its pane comes from listing.
        let windows = self
            .server
            .list_windows(&session.id)
            .map_err(step(i, "list windows"))?;
        if !windows.iter().any(|w| w.id == window_id) {
            return Err(LayoutError::WindowNotLocated { window: i });
        }
        let pane = self
            .server
            .list_panes(&window_id)
            .map_err(step(i, "list panes"))?
            .into_iter()
            .next()
            .ok_or(LayoutError::WindowNotLocated { window: i })?;

        debug!(window = i, id = %window_id, pane = %pane.id, "created window");
        Ok(WindowTarget {
            window_id,
            pane_id: pane.id,
            named: spec.name().is_some(),
        })
    }

    fn lay_out_window(
        &self,
        session: &Session,
        i: usize,
        spec: &WindowSpec,
        target: &WindowTarget,
    ) -> Result<()> {
        let Some((first_spec, rest)) = spec.panes.split_first() else {
            return Err(SpecError::NoPanes(i).into());
        };
        debug!(window = i, id = %target.window_id, panes = spec.panes.len(), "laying out window");

        if let Some(name) = spec.name().filter(|_| !target.named) {
            self.server
                .rename_window(&target.window_id, name)
                .map_err(step(i, "rename window"))?;
        }

        let first_pane = &target.pane_id;
        self.prepare_pane(i, 0, first_pane)?;

        let dir = resolve_directory(first_spec, spec, &session.path);
        if !dir.is_empty() {
            let cd = format!("cd {}", shell_words::quote(dir));
            self.server
                .send_keys(first_pane, &cd)
                .map_err(step(i, "change directory"))?;
        }

        let mut pane_ids = vec![first_pane.clone()];
        for (offset, pane_spec) in rest.iter().enumerate() {
            let j = offset + 1;
            let dir = resolve_directory(pane_spec, spec, &session.path);
            let pane_id = self
                .server
                .split_pane(first_pane, SPLIT_DIRECTION, dir)
                .map_err(step(i, format!("split pane {}", j)))?;
            self.prepare_pane(i, j, &pane_id)?;
            pane_ids.push(pane_id);
        }

        if let Some(arrangement) = spec.layout {
            self.server
                .select_layout(&target.window_id, arrangement.as_str())
                .map_err(step(i, "select layout"))?;
        }

        for (j, (pane_spec, pane_id)) in spec.panes.iter().zip(&pane_ids).enumerate() {
            if let Some(command) = pane_spec.command_line() {
                self.server
                    .send_keys(pane_id, &command)
                    .map_err(step(i, format!("send keys to pane {}", j)))?;
            }
        }

        if let Some(pane_id) = focused_pane(&spec.panes).and_then(|j| pane_ids.get(j)) {
            self.server
                .select_pane(pane_id)
                .map_err(step(i, "select pane"))?;
        }
        Ok(())
    }

    /// Wait for the shell, wipe whatever it printed, wait again.
    fn prepare_pane(&self, window: usize, pane: usize, pane_id: &str) -> Result<()> {
        self.readiness.settle(pane_id);
        self.server
            .send_keys(pane_id, CLEAR_COMMAND)
            .map_err(step(window, format!("clear pane {}", pane)))?;
        self.readiness.after_clear(pane_id);
        Ok(())
    }
}
