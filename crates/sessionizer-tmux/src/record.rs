//! Session, window and pane records and their line decoders.
//!
//! tmux prints one record per line using the `-F` formats below, with fields
//! joined by [`DELIMITER`]. Decoding is pure: it never touches a process, so
//! literal protocol strings can be tested directly.

use serde::Serialize;
use tracing::warn;

use crate::{Result, TmuxError};

/// Field separator used in every record format.
pub const DELIMITER: char = ':';

/// A record type tmux can print with a fixed `-F` format.
pub trait Record: Sized {
    /// Human-readable record name used in errors.
    const KIND: &'static str;
    /// The tmux format string producing one record per line.
    const FORMAT: &'static str;
    /// Number of delimiter-separated fields.
    const FIELDS: usize;

    /// Build the record from exactly [`Self::FIELDS`] fields.
    fn from_fields(fields: &[&str]) -> Option<Self>;
}

/// Decode one line into a record.
///
/// The last field keeps any further delimiters, since paths and window
/// names may contain them.
pub fn decode<R: Record>(line: &str) -> Result<R> {
    let malformed = || TmuxError::MalformedRecord {
        kind: R::KIND,
        line: line.to_string(),
    };

    let fields: Vec<&str> = line.splitn(R::FIELDS, DELIMITER).collect();
    if fields.len() != R::FIELDS {
        return Err(malformed());
    }
    R::from_fields(&fields).ok_or_else(malformed)
}

/// Decode every non-blank line, skipping malformed ones.
pub fn decode_all<R: Record>(output: &str) -> Vec<R> {
    output
        .lines()
        .filter(|line| !line.trim().is_empty())
        .filter_map(|line| match decode::<R>(line) {
            Ok(record) => Some(record),
            Err(e) => {
                warn!(line = %line, error = %e, "skipping tmux record");
                None
            }
        })
        .collect()
}

/// Decode a single-line response.
///
/// Empty output means tmux found nothing and yields `Ok(None)`; output that
/// is present but corrupt is an error.
pub fn decode_single<R: Record>(output: &str) -> Result<Option<R>> {
    match output.lines().find(|line| !line.trim().is_empty()) {
        Some(line) => decode(line).map(Some),
        None => Ok(None),
    }
}

/// tmux prints flags as `0`/`1`; `session_attached` is a client count.
fn parse_flag(field: &str) -> Option<bool> {
    match field {
        "true" => Some(true),
        "false" => Some(false),
        n => n.parse::<u32>().ok().map(|count| count > 0),
    }
}

/// Represents a tmux session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Session {
    /// Server-assigned id (e.g., "$1").
    pub id: String,
    /// Session name.
    pub name: String,
    /// Whether any client is attached.
    pub attached: bool,
    /// Working directory of the session.
    pub path: String,
    /// Windows in this session, filled in by hydration.
    pub windows: Vec<Window>,
}

impl Session {
    /// Create a new Session without windows.
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        attached: bool,
        path: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            attached,
            path: path.into(),
            windows: Vec::new(),
        }
    }

    /// Parse session from a tmux output line.
    ///
    /// Expected format: `session_id:session_name:session_attached:session_path`
    pub fn parse(line: &str) -> Result<Self> {
        decode(line)
    }

    /// The first window and its first pane, if hydrated.
    pub fn first_pane(&self) -> Option<(&Window, &Pane)> {
        let window = self.windows.first()?;
        window.panes.first().map(|pane| (window, pane))
    }
}

impl Record for Session {
    const KIND: &'static str = "session";
    const FORMAT: &'static str =
        "#{session_id}:#{session_name}:#{session_attached}:#{session_path}";
    const FIELDS: usize = 4;

    fn from_fields(fields: &[&str]) -> Option<Self> {
        let attached = parse_flag(fields[2])?;
        Some(Self::new(fields[0], fields[1], attached, fields[3]))
    }
}

/// Represents a window within a tmux session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Window {
    /// Window id (e.g., "@1").
    pub id: String,
    /// Whether this is the session's current window.
    pub active: bool,
    /// Number of clients viewing this window.
    pub active_clients: u32,
    /// Window name.
    pub name: String,
    /// Panes in this window, filled in by hydration.
    pub panes: Vec<Pane>,
}

impl Window {
    /// Create a new Window without panes.
    pub fn new(id: impl Into<String>, active: bool, active_clients: u32, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            active,
            active_clients,
            name: name.into(),
            panes: Vec::new(),
        }
    }

    /// Parse window from a tmux output line.
    ///
    /// Expected format: `window_id:window_active:window_active_clients:window_name`
    pub fn parse(line: &str) -> Result<Self> {
        decode(line)
    }
}

impl Record for Window {
    const KIND: &'static str = "window";
    const FORMAT: &'static str =
        "#{window_id}:#{window_active}:#{window_active_clients}:#{window_name}";
    const FIELDS: usize = 4;

    fn from_fields(fields: &[&str]) -> Option<Self> {
        let active = parse_flag(fields[1])?;
        let active_clients = fields[2].parse().ok()?;
        Some(Self::new(fields[0], active, active_clients, fields[3]))
    }
}

/// Represents a pane within a tmux window.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Pane {
    /// Pane ID (e.g., "%0", "%1").
    pub id: String,
    /// Pane index within window.
    pub index: u32,
    /// Whether this pane is active.
    pub active: bool,
}

impl Pane {
    /// Create a new Pane.
    pub fn new(id: impl Into<String>, index: u32, active: bool) -> Self {
        Self {
            id: id.into(),
            index,
            active,
        }
    }

    /// Parse pane from a tmux output line.
    ///
    /// Expected format: `pane_id:pane_index:pane_active`
    pub fn parse(line: &str) -> Result<Self> {
        decode(line)
    }
}

impl Record for Pane {
    const KIND: &'static str = "pane";
    const FORMAT: &'static str = "#{pane_id}:#{pane_index}:#{pane_active}";
    const FIELDS: usize = 3;

    fn from_fields(fields: &[&str]) -> Option<Self> {
        let index = fields[1].parse().ok()?;
        let active = parse_flag(fields[2])?;
        Some(Self::new(fields[0], index, active))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_session_valid() {
        let session = Session::parse("$1:my-proj:1:/home/me/src/my-proj").unwrap();
        assert_eq!(session.id, "$1");
        assert_eq!(session.name, "my-proj");
        assert!(session.attached);
        assert_eq!(session.path, "/home/me/src/my-proj");
        assert!(session.windows.is_empty());
    }

    #[test]
    fn test_session_attached_is_client_count() {
        assert!(Session::parse("$2:a:3:/tmp").unwrap().attached);
        assert!(!Session::parse("$2:a:0:/tmp").unwrap().attached);
    }

    #[test]
    fn test_parse_session_path_keeps_delimiters() {
        let session = Session::parse("$3:odd:0:/mnt/c:/work").unwrap();
        assert_eq!(session.path, "/mnt/c:/work");
    }

    #[test]
    fn test_parse_session_malformed() {
        for line in ["", "$1", "$1:name:0", "$1:name:yes:/tmp"] {
            let err = Session::parse(line).unwrap_err();
            assert!(
                matches!(err, TmuxError::MalformedRecord { kind: "session", .. }),
                "expected malformed for {:?}",
                line
            );
        }
    }

    #[test]
    fn test_parse_window_valid() {
        let window = Window::parse("@4:1:2:editor").unwrap();
        assert_eq!(window.id, "@4");
        assert!(window.active);
        assert_eq!(window.active_clients, 2);
        assert_eq!(window.name, "editor");
        assert!(window.panes.is_empty());
    }

    #[test]
    fn test_parse_window_invalid_client_count() {
        assert!(Window::parse("@4:1:many:editor").is_err());
    }

    #[test]
    fn test_parse_pane_valid() {
        let pane = Pane::parse("%7:2:0").unwrap();
        assert_eq!(pane, Pane::new("%7", 2, false));
    }

    #[test]
    fn test_parse_pane_invalid_index() {
        let err = Pane::parse("%0:abc:1").unwrap_err();
        assert!(matches!(err, TmuxError::MalformedRecord { kind: "pane", .. }));
    }

    #[test]
    fn test_decode_all_skips_bad_lines() {
        let output = "%0:0:1\nnot a pane\n\n%1:1:0\n%2:x:0\n";
        let panes: Vec<Pane> = decode_all(output);
        assert_eq!(panes, vec![Pane::new("%0", 0, true), Pane::new("%1", 1, false)]);
    }

    #[test]
    fn test_decode_all_empty_output() {
        let windows: Vec<Window> = decode_all("");
        assert!(windows.is_empty());
    }

    #[test]
    fn test_decode_single() {
        assert_eq!(decode_single::<Pane>("\n").unwrap(), None);
        assert_eq!(
            decode_single::<Pane>("%3:0:1\n").unwrap(),
            Some(Pane::new("%3", 0, true))
        );
        assert!(decode_single::<Pane>("%3\n").is_err());
    }

    #[test]
    fn test_first_pane() {
        let mut session = Session::new("$1", "s", false, "/tmp");
        assert!(session.first_pane().is_none());

        let mut window = Window::new("@1", true, 0, "zsh");
        window.panes.push(Pane::new("%1", 0, true));
        session.windows.push(window);

        let (window, pane) = session.first_pane().unwrap();
        assert_eq!(window.id, "@1");
        assert_eq!(pane.id, "%1");
    }

    #[test]
    fn test_session_serializes_nested() {
        let mut session = Session::new("$1", "s", false, "/tmp");
        session.windows.push(Window::new("@1", true, 1, "zsh"));
        let json = serde_json::to_value(&session).unwrap();
        assert_eq!(json["windows"][0]["active_clients"], 1);
        assert_eq!(json["path"], "/tmp");
    }
}
