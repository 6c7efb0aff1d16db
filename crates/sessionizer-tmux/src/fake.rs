//! An in-memory tmux server for tests.
//!
//! `FakeTmux` answers the subset of the control protocol that
//! [`TmuxServer`](crate::TmuxServer) speaks, keeps a session/window/pane
//! tree, and records every call so tests can assert on ordering.

use std::cell::RefCell;

use crate::executor::CommandExecutor;
use crate::record::{Pane, Session, Window};
use crate::{Result, TmuxError};

#[derive(Debug, Clone)]
struct FakePane {
    id: String,
    active: bool,
}

#[derive(Debug, Clone)]
struct FakeWindow {
    id: String,
    name: String,
    active: bool,
    layout: Option<String>,
    panes: Vec<FakePane>,
}

#[derive(Debug, Clone)]
struct FakeSession {
    id: String,
    name: String,
    path: String,
    attached: bool,
    windows: Vec<FakeWindow>,
}

#[derive(Debug, Default)]
struct State {
    running: bool,
    next_session: u32,
    next_window: u32,
    next_pane: u32,
    sessions: Vec<FakeSession>,
    current: Option<String>,
    sent: Vec<(String, String)>,
    entered: Vec<(String, String)>,
    fail_commands: Vec<String>,
    fail_keys: Vec<String>,
}

impl State {
    fn new_pane(&mut self) -> FakePane {
        let id = format!("%{}", self.next_pane);
        self.next_pane += 1;
        FakePane { id, active: true }
    }

    fn new_window(&mut self, name: &str) -> FakeWindow {
        let id = format!("@{}", self.next_window);
        self.next_window += 1;
        let pane = self.new_pane();
        FakeWindow {
            id,
            name: name.to_string(),
            active: true,
            layout: None,
            panes: vec![pane],
        }
    }

    fn new_session(&mut self, name: &str, path: &str) -> &FakeSession {
        let id = format!("${}", self.next_session);
        self.next_session += 1;
        let window = self.new_window("zsh");
        self.running = true;
        self.sessions.push(FakeSession {
            id,
            name: name.to_string(),
            path: path.to_string(),
            attached: false,
            windows: vec![window],
        });
        &self.sessions[self.sessions.len() - 1]
    }

    fn session(&self, target: &str) -> Option<&FakeSession> {
        let target = target.trim_end_matches(':');
        let exact = target.strip_prefix('=');
        self.sessions.iter().find(|s| match exact {
            Some(name) => s.name == name,
            None => s.id == target || s.name == target,
        })
    }

    fn session_mut(&mut self, target: &str) -> Option<&mut FakeSession> {
        let target = target.trim_end_matches(':');
        self.sessions
            .iter_mut()
            .find(|s| s.id == target || s.name == target)
    }

    fn window_mut(&mut self, window_id: &str) -> Option<(&mut FakeSession, usize)> {
        self.sessions.iter_mut().find_map(|s| {
            let idx = s.windows.iter().position(|w| w.id == window_id)?;
            Some((s, idx))
        })
    }

    fn pane_window_mut(&mut self, pane_id: &str) -> Option<&mut FakeWindow> {
        self.sessions
            .iter_mut()
            .flat_map(|s| s.windows.iter_mut())
            .find(|w| w.panes.iter().any(|p| p.id == pane_id))
    }
}

fn session_line(s: &FakeSession) -> String {
    format!("{}:{}:{}:{}", s.id, s.name, u8::from(s.attached), s.path)
}

fn window_line(w: &FakeWindow) -> String {
    format!("{}:{}:0:{}", w.id, u8::from(w.active), w.name)
}

fn failed(message: impl Into<String>) -> TmuxError {
    TmuxError::CommandFailed(message.into())
}

/// Value following a flag such as `-t`.
fn flag<'a>(args: &[&'a str], name: &str) -> Option<&'a str> {
    let pos = args.iter().position(|a| *a == name)?;
    args.get(pos + 1).copied()
}

fn required<'a>(args: &[&'a str], name: &str) -> Result<&'a str> {
    flag(args, name).ok_or_else(|| failed(format!("missing {}", name)))
}

/// Pull `X` out of a `#{==:#{field},X}` filter.
fn filter_value<'a>(filter: &'a str, field: &str) -> Option<&'a str> {
    let prefix = format!("#{{==:#{{{}}},", field);
    filter.strip_prefix(prefix.as_str())?.strip_suffix('}')
}

/// In-memory tmux server.
#[derive(Debug)]
pub struct FakeTmux {
    state: RefCell<State>,
    calls: RefCell<Vec<Vec<String>>>,
}

impl Default for FakeTmux {
    fn default() -> Self {
        Self::new()
    }
}

impl FakeTmux {
    /// A running server with no sessions.
    pub fn new() -> Self {
        Self {
            state: RefCell::new(State {
                running: true,
                ..State::default()
            }),
            calls: RefCell::new(Vec::new()),
        }
    }

    /// Make every query fail as if no server were running, until a session
    /// is created.
    pub fn without_server(self) -> Self {
        self.state.borrow_mut().running = false;
        self
    }

    /// Add a session with one window per entry of `panes`, each holding that
    /// many panes.
    pub fn with_session(self, name: &str, path: &str, panes: &[usize]) -> Self {
        {
            let mut state = self.state.borrow_mut();
            let session_id = state.new_session(name, path).id.clone();
            let mut windows = Vec::new();
            for (i, count) in panes.iter().enumerate() {
                let mut window = if i == 0 {
                    let session = state.session_mut(&session_id).map(|s| s.windows.remove(0));
                    session.unwrap_or_else(|| state.new_window("zsh"))
                } else {
                    state.new_window("zsh")
                };
                window.active = i == 0;
                for _ in 1..*count {
                    let mut pane = state.new_pane();
                    pane.active = false;
                    window.panes.push(pane);
                }
                windows.push(window);
            }
            if let Some(session) = state.session_mut(&session_id) {
                session.windows = windows;
            }
        }
        self
    }

    /// Treat the named session as the one the calling client is in.
    pub fn with_current(self, name: &str) -> Self {
        self.state.borrow_mut().current = Some(name.to_string());
        self
    }

    /// Make every invocation of `command` fail.
    pub fn fail_on(self, command: &str) -> Self {
        self.state.borrow_mut().fail_commands.push(command.to_string());
        self
    }

    /// Make `send-keys` fail when it types exactly `text`.
    pub fn fail_on_keys(self, text: &str) -> Self {
        self.state.borrow_mut().fail_keys.push(text.to_string());
        self
    }

    /// Every argument vector received, in order.
    pub fn calls(&self) -> Vec<Vec<String>> {
        self.calls.borrow().clone()
    }

    /// Calls whose first argument is `command`.
    pub fn calls_to(&self, command: &str) -> Vec<Vec<String>> {
        self.calls
            .borrow()
            .iter()
            .filter(|c| c.first().map(String::as_str) == Some(command))
            .cloned()
            .collect()
    }

    /// The tmux subcommands received, in order.
    pub fn command_names(&self) -> Vec<String> {
        self.calls
            .borrow()
            .iter()
            .filter_map(|c| c.first().cloned())
            .collect()
    }

    /// Every `(pane, text)` typed with `send-keys`, in order.
    pub fn sent_keys(&self) -> Vec<(String, String)> {
        self.state.borrow().sent.clone()
    }

    /// Lines typed into one pane, in order.
    pub fn sent_to(&self, pane_id: &str) -> Vec<String> {
        self.state
            .borrow()
            .sent
            .iter()
            .filter(|(pane, _)| pane == pane_id)
            .map(|(_, text)| text.clone())
            .collect()
    }

    /// Entry commands (`switch`, `attach`, `switch-client`) with their target.
    pub fn entered(&self) -> Vec<(String, String)> {
        self.state.borrow().entered.clone()
    }

    /// Snapshot of a session as hydrated records.
    pub fn session(&self, name: &str) -> Option<Session> {
        let state = self.state.borrow();
        let s = state.sessions.iter().find(|s| s.name == name)?;
        let mut session = Session::new(&s.id, &s.name, s.attached, &s.path);
        session.windows = s
            .windows
            .iter()
            .map(|w| {
                let mut window = Window::new(&w.id, w.active, 0, &w.name);
                window.panes = w
                    .panes
                    .iter()
                    .enumerate()
                    .map(|(i, p)| Pane::new(&p.id, i as u32, p.active))
                    .collect();
                window
            })
            .collect();
        Some(session)
    }

    /// Arrangement last applied to a window with `select-layout`.
    pub fn layout_of(&self, window_id: &str) -> Option<String> {
        self.state
            .borrow()
            .sessions
            .iter()
            .flat_map(|s| s.windows.iter())
            .find(|w| w.id == window_id)
            .and_then(|w| w.layout.clone())
    }

    fn dispatch(&self, args: &[&str]) -> Result<String> {
        let mut state = self.state.borrow_mut();
        let command = args.first().copied().unwrap_or_default();

        if state.fail_commands.iter().any(|c| c == command) {
            return Err(failed(format!("injected failure for {}", command)));
        }

        match command {
            "list-sessions" => {
                if !state.running {
                    return Err(failed("no server running on /tmp/tmux-0/default"));
                }
                let filter = flag(args, "-f");
                let lines: Vec<String> = state
                    .sessions
                    .iter()
                    .filter(|s| match filter {
                        None => true,
                        Some(f) => {
                            if let Some(id) = filter_value(f, "session_id") {
                                s.id == id
                            } else {
                                filter_value(f, "session_attached") == Some("0") && !s.attached
                            }
                        }
                    })
                    .map(session_line)
                    .collect();
                Ok(join_lines(&lines))
            }
            "list-windows" => {
                let target = required(args, "-t")?;
                let session = state
                    .session(target)
                    .ok_or_else(|| failed(format!("can't find session: {}", target)))?;
                let lines: Vec<String> = session.windows.iter().map(window_line).collect();
                Ok(join_lines(&lines))
            }
            "list-panes" => {
                let target = required(args, "-t")?;
                let window = state
                    .sessions
                    .iter()
                    .flat_map(|s| s.windows.iter())
                    .find(|w| w.id == target)
                    .ok_or_else(|| failed(format!("can't find window: {}", target)))?;
                let lines: Vec<String> = window
                    .panes
                    .iter()
                    .enumerate()
                    .map(|(i, p)| format!("{}:{}:{}", p.id, i, u8::from(p.active)))
                    .collect();
                Ok(join_lines(&lines))
            }
            "display-message" => {
                let current = state
                    .current
                    .as_deref()
                    .and_then(|name| state.session(name))
                    .ok_or_else(|| failed("no current client"))?;
                match args.last().copied() {
                    Some("#{session_id}") => Ok(format!("{}\n", current.id)),
                    _ => {
                        let window = current
                            .windows
                            .iter()
                            .find(|w| w.active)
                            .ok_or_else(|| failed("no current window"))?;
                        Ok(format!("{}\n", window_line(window)))
                    }
                }
            }
            "new-session" => {
                let name = required(args, "-s")?;
                if state.sessions.iter().any(|s| s.name == name) {
                    return Err(failed(format!("duplicate session: {}", name)));
                }
                let path = flag(args, "-c").unwrap_or_default();
                let line = session_line(state.new_session(name, path));
                Ok(format!("{}\n", line))
            }
            "new-window" => {
                let target = required(args, "-t")?.to_string();
                let name = flag(args, "-n").unwrap_or("zsh").to_string();
                if state.session(&target).is_none() {
                    return Err(failed(format!("can't find session: {}", target)));
                }
                let window = state.new_window(&name);
                let id = window.id.clone();
                if let Some(session) = state.session_mut(&target) {
                    for w in &mut session.windows {
                        w.active = false;
                    }
                    session.windows.push(window);
                }
                Ok(format!("{}\n", id))
            }
            "split-window" => {
                let target = required(args, "-t")?.to_string();
                let pane = state.new_pane();
                let id = pane.id.clone();
                let window = state
                    .pane_window_mut(&target)
                    .ok_or_else(|| failed(format!("can't find pane: {}", target)))?;
                for p in &mut window.panes {
                    p.active = false;
                }
                window.panes.push(pane);
                Ok(format!("{}\n", id))
            }
            "rename-window" => {
                let target = required(args, "-t")?;
                let name = args.get(3).copied().unwrap_or_default();
                let (session, idx) = state
                    .window_mut(target)
                    .ok_or_else(|| failed(format!("can't find window: {}", target)))?;
                session.windows[idx].name = name.to_string();
                Ok(String::new())
            }
            "select-window" => {
                let target = required(args, "-t")?;
                let (session, idx) = state
                    .window_mut(target)
                    .ok_or_else(|| failed(format!("can't find window: {}", target)))?;
                for (i, w) in session.windows.iter_mut().enumerate() {
                    w.active = i == idx;
                }
                Ok(String::new())
            }
            "select-pane" => {
                let target = required(args, "-t")?;
                let window = state
                    .pane_window_mut(target)
                    .ok_or_else(|| failed(format!("can't find pane: {}", target)))?;
                for p in &mut window.panes {
                    p.active = p.id == target;
                }
                Ok(String::new())
            }
            "select-layout" => {
                let target = required(args, "-t")?;
                let layout = args.get(3).copied().unwrap_or_default();
                let (session, idx) = state
                    .window_mut(target)
                    .ok_or_else(|| failed(format!("can't find window: {}", target)))?;
                session.windows[idx].layout = Some(layout.to_string());
                Ok(String::new())
            }
            "send-keys" => {
                let target = required(args, "-t")?.to_string();
                if state.pane_window_mut(&target).is_none() {
                    return Err(failed(format!("can't find pane: {}", target)));
                }
                // Key presses such as `Enter` are not recorded as text.
                if !args.contains(&"-l") {
                    return Ok(String::new());
                }
                let text = args.last().copied().unwrap_or_default().to_string();
                if state.fail_keys.contains(&text) {
                    return Err(failed(format!("injected failure typing {}", text)));
                }
                state.sent.push((target, text));
                Ok(String::new())
            }
            "has-session" => {
                let target = required(args, "-t")?;
                state
                    .session(target)
                    .map(|_| String::new())
                    .ok_or_else(|| failed(format!("can't find session: {}", target)))
            }
            "switch" | "attach" | "switch-client" => {
                let target = required(args, "-t")?.to_string();
                if state.session(&target).is_none() {
                    return Err(failed(format!("can't find session: {}", target)));
                }
                state.entered.push((command.to_string(), target));
                Ok(String::new())
            }
            other => Err(failed(format!("unknown command: {}", other))),
        }
    }
}

fn join_lines(lines: &[String]) -> String {
    lines.iter().map(|l| format!("{}\n", l)).collect()
}

impl CommandExecutor for FakeTmux {
    fn run(&self, args: &[&str]) -> Result<String> {
        self.calls
            .borrow_mut()
            .push(args.iter().map(|a| a.to_string()).collect());
        self.dispatch(args)
    }
}
