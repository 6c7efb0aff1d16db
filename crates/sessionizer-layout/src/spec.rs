//! Layout specification types.

use std::fmt;
use std::fs;
use std::path::Path;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::{Result, SpecError};

/// Expand `~` and environment variables in a directory.
///
/// Unknown variables leave the path with only `~` expanded.
pub fn expand_path(path: &str) -> String {
    match shellexpand::full(path) {
        Ok(expanded) => expanded.into_owned(),
        Err(e) => {
            warn!(path = %path, error = %e, "could not expand variables in path");
            shellexpand::tilde(path).into_owned()
        }
    }
}

/// One of tmux's built-in pane arrangements.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Arrangement {
    EvenHorizontal,
    EvenVertical,
    MainHorizontal,
    MainVertical,
    Tiled,
}

impl Arrangement {
    pub const ALL: [Arrangement; 5] = [
        Self::EvenHorizontal,
        Self::EvenVertical,
        Self::MainHorizontal,
        Self::MainVertical,
        Self::Tiled,
    ];

    /// The name tmux's `select-layout` accepts.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::EvenHorizontal => "even-horizontal",
            Self::EvenVertical => "even-vertical",
            Self::MainHorizontal => "main-horizontal",
            Self::MainVertical => "main-vertical",
            Self::Tiled => "tiled",
        }
    }
}

impl fmt::Display for Arrangement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Arrangement {
    type Err = SpecError;

    fn from_str(s: &str) -> Result<Self> {
        Self::ALL
            .into_iter()
            .find(|a| a.as_str() == s)
            .ok_or_else(|| SpecError::UnknownArrangement(s.to_string()))
    }
}

/// A pane inside a window.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaneSpec {
    /// Command tokens, joined with spaces and typed into the pane.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub shell_command: Vec<String>,
    /// Whether the pane should end up selected.
    #[serde(default)]
    pub focus: bool,
    /// Overrides the window's start directory.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_directory: Option<String>,
}

impl PaneSpec {
    /// The command line to type, if any.
    pub fn command_line(&self) -> Option<String> {
        if self.shell_command.is_empty() {
            None
        } else {
            Some(self.shell_command.join(" "))
        }
    }
}

/// A window and its panes.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WindowSpec {
    #[serde(rename = "window_name", default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub layout: Option<Arrangement>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_directory: Option<String>,
    #[serde(default)]
    pub panes: Vec<PaneSpec>,
}

impl WindowSpec {
    /// The window name, if one is set and non-empty.
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref().filter(|n| !n.is_empty())
    }
}

/// A complete layout: the windows of a session, in order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LayoutSpec {
    #[serde(default)]
    pub windows: Vec<WindowSpec>,
}

impl LayoutSpec {
    /// One focused, command-less pane in a `main-vertical` window.
    pub fn simple(name: &str, path: &str) -> Self {
        Self {
            windows: vec![WindowSpec {
                name: Some(name.to_string()),
                layout: Some(Arrangement::MainVertical),
                start_directory: Some(path.to_string()),
                panes: vec![PaneSpec {
                    focus: true,
                    ..PaneSpec::default()
                }],
            }],
        }
    }

    /// Read, validate and expand a layout file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        debug!(path = %path.display(), "reading layout");
        let data = fs::read_to_string(path).map_err(|source| SpecError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_yaml_str(&data)
    }

    /// Parse, validate and expand a layout from YAML text.
    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        let mut layout: LayoutSpec = serde_yaml::from_str(yaml)?;
        layout.validate()?;
        layout.expand_directories();
        Ok(layout)
    }

    /// Check that there is at least one window and every window has a pane.
    pub fn validate(&self) -> Result<()> {
        if self.windows.is_empty() {
            return Err(SpecError::NoWindows);
        }
        for (i, window) in self.windows.iter().enumerate() {
            if window.panes.is_empty() {
                return Err(SpecError::NoPanes(i));
            }
        }
        Ok(())
    }

    /// Expand `~` and variables in every start directory.
    pub fn expand_directories(&mut self) {
        for window in &mut self.windows {
            if let Some(dir) = &mut window.start_directory {
                *dir = expand_path(dir);
            }
            for pane in &mut window.panes {
                if let Some(dir) = pane.start_directory.as_mut().filter(|d| !d.is_empty()) {
                    *dir = expand_path(dir);
                }
            }
        }
    }

    /// Serialize back to YAML.
    pub fn to_yaml(&self) -> Result<String> {
        Ok(serde_yaml::to_string(self)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MULTI_WINDOW: &str = r#"
windows:
  - window_name: dev
    layout: main-vertical
    start_directory: /src/proj
    panes:
      - shell_command: [nvim]
      - shell_command: [cargo, watch, -x, test]
        start_directory: /src/proj/crates
      - focus: true
      - shell_command: [git, status]
  - window_name: logs
    layout: even-horizontal
    start_directory: /var/log
    panes:
      - shell_command: [tail, -f, syslog]
"#;

    #[test]
    fn test_simple() {
        let layout = LayoutSpec::simple("test-window", "/home/user");
        assert_eq!(layout.windows.len(), 1);

        let window = &layout.windows[0];
        assert_eq!(window.name(), Some("test-window"));
        assert_eq!(window.layout, Some(Arrangement::MainVertical));
        assert_eq!(window.start_directory.as_deref(), Some("/home/user"));
        assert_eq!(window.panes.len(), 1);
        assert!(window.panes[0].focus);
        assert!(window.panes[0].shell_command.is_empty());
    }

    #[test]
    fn test_parse_multi_window() {
        let layout = LayoutSpec::from_yaml_str(MULTI_WINDOW).unwrap();
        assert_eq!(layout.windows.len(), 2);

        let dev = &layout.windows[0];
        assert_eq!(dev.name(), Some("dev"));
        assert_eq!(dev.layout, Some(Arrangement::MainVertical));
        assert_eq!(dev.panes.len(), 4);
        let focused: Vec<usize> = dev
            .panes
            .iter()
            .enumerate()
            .filter(|(_, p)| p.focus)
            .map(|(i, _)| i)
            .collect();
        assert_eq!(focused, vec![2]);
        assert_eq!(
            dev.panes[1].command_line().as_deref(),
            Some("cargo watch -x test")
        );
        assert_eq!(dev.panes[1].start_directory.as_deref(), Some("/src/proj/crates"));
        assert_eq!(dev.panes[2].command_line(), None);

        let logs = &layout.windows[1];
        assert_eq!(logs.layout, Some(Arrangement::EvenHorizontal));
        assert_eq!(logs.start_directory.as_deref(), Some("/var/log"));
        assert_eq!(logs.panes.len(), 1);
    }

    #[test]
    fn test_round_trip() {
        let original = LayoutSpec::from_yaml_str(MULTI_WINDOW).unwrap();
        let yaml = original.to_yaml().unwrap();
        let parsed = LayoutSpec::from_yaml_str(&yaml).unwrap();
        assert_eq!(parsed, original);
    }

    #[test]
    fn test_simple_round_trip() {
        let layout = LayoutSpec::simple("marshal-test", "/test/path");
        let parsed = LayoutSpec::from_yaml_str(&layout.to_yaml().unwrap()).unwrap();
        assert_eq!(parsed, layout);
    }

    #[test]
    fn test_optional_fields_default() {
        let layout = LayoutSpec::from_yaml_str("windows:\n  - panes:\n      - {}\n").unwrap();
        let window = &layout.windows[0];
        assert_eq!(window.name(), None);
        assert_eq!(window.layout, None);
        assert_eq!(window.start_directory, None);
        assert_eq!(window.panes[0], PaneSpec::default());
    }

    #[test]
    fn test_empty_name_is_no_name() {
        let window = WindowSpec {
            name: Some(String::new()),
            ..WindowSpec::default()
        };
        assert_eq!(window.name(), None);
    }

    #[test]
    fn test_rejects_no_windows() {
        let err = LayoutSpec::from_yaml_str("windows: []\n").unwrap_err();
        assert!(matches!(err, SpecError::NoWindows));
    }

    #[test]
    fn test_rejects_window_without_panes() {
        let yaml = "windows:\n  - window_name: a\n    panes: [{}]\n  - window_name: b\n";
        let err = LayoutSpec::from_yaml_str(yaml).unwrap_err();
        assert!(matches!(err, SpecError::NoPanes(1)));
    }

    #[test]
    fn test_rejects_unknown_arrangement() {
        let yaml = "windows:\n  - layout: spiral\n    panes: [{}]\n";
        assert!(matches!(
            LayoutSpec::from_yaml_str(yaml).unwrap_err(),
            SpecError::Yaml(_)
        ));
    }

    #[test]
    fn test_arrangement_names() {
        for arrangement in Arrangement::ALL {
            let parsed: Arrangement = arrangement.as_str().parse().unwrap();
            assert_eq!(parsed, arrangement);
        }
        assert_eq!(Arrangement::MainHorizontal.to_string(), "main-horizontal");
        assert!("diagonal".parse::<Arrangement>().is_err());
    }

    #[test]
    fn test_expands_home_in_directories() {
        let yaml = "windows:\n  - start_directory: ~/src\n    panes:\n      - start_directory: ~/tmp\n";
        let layout = LayoutSpec::from_yaml_str(yaml).unwrap();
        let window_dir = layout.windows[0].start_directory.as_deref().unwrap();
        let pane_dir = layout.windows[0].panes[0].start_directory.as_deref().unwrap();
        assert!(!window_dir.starts_with('~'));
        assert!(window_dir.ends_with("/src"));
        assert!(!pane_dir.starts_with('~'));
    }

    #[test]
    fn test_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(".sessionizer.yml");
        fs::write(&path, MULTI_WINDOW).unwrap();

        let layout = LayoutSpec::from_file(&path).unwrap();
        assert_eq!(layout.windows.len(), 2);
    }

    #[test]
    fn test_from_file_not_found() {
        let err = LayoutSpec::from_file("/nonexistent/layout.yml").unwrap_err();
        assert!(matches!(err, SpecError::Read { .. }));
    }
}
