//! Where the calling process sits relative to the tmux server.

use std::ffi::OsStr;

use serde::Serialize;

/// Environment variable tmux sets for processes running inside it.
pub const TMUX_ENV: &str = "TMUX";

/// The calling process's relationship to the tmux server.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TmuxContext {
    /// Running inside a session of the server.
    Attached,
    /// A server is reachable but the caller is outside it.
    Detached,
    /// No server is reachable.
    Serverless,
}

impl TmuxContext {
    /// Classify from a session-listing probe and the `TMUX` marker.
    ///
    /// An empty marker counts as absent.
    pub fn classify(listing_succeeded: bool, marker: Option<&OsStr>) -> Self {
        if !listing_succeeded {
            return Self::Serverless;
        }
        match marker {
            Some(value) if !value.is_empty() => Self::Attached,
            _ => Self::Detached,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_listing_failure_is_serverless() {
        let marker = OsStr::new("/tmp/tmux-501/default,1234,0");
        assert_eq!(TmuxContext::classify(false, Some(marker)), TmuxContext::Serverless);
        assert_eq!(TmuxContext::classify(false, None), TmuxContext::Serverless);
    }

    #[test]
    fn test_marker_absent_is_detached() {
        assert_eq!(TmuxContext::classify(true, None), TmuxContext::Detached);
        assert_eq!(TmuxContext::classify(true, Some(OsStr::new(""))), TmuxContext::Detached);
    }

    #[test]
    fn test_marker_present_is_attached() {
        let marker = OsStr::new("/tmp/tmux-501/default,1234,0");
        assert_eq!(TmuxContext::classify(true, Some(marker)), TmuxContext::Attached);
    }
}
