//! Error types for tmux operations.

use thiserror::Error;

/// Errors that can occur during tmux operations.
#[derive(Error, Debug)]
pub enum TmuxError {
    /// tmux not found in PATH.
    #[error("tmux not found in PATH")]
    BinaryNotFound,

    /// tmux exited with a non-zero status.
    #[error("tmux command failed: {0}")]
    CommandFailed(String),

    /// I/O error while spawning tmux.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// A line of tmux output did not match the expected record shape.
    #[error("malformed {kind} record: {line:?}")]
    MalformedRecord { kind: &'static str, line: String },

    /// Session not found.
    #[error("session '{0}' not found")]
    SessionNotFound(String),

    /// Window not found.
    #[error("window '{0}' not found")]
    WindowNotFound(String),

    /// A failure annotated with the operation that produced it.
    #[error("{operation}: {source}")]
    Operation {
        operation: String,
        #[source]
        source: Box<TmuxError>,
    },
}

impl TmuxError {
    /// Wrap this error with the name of the operation that failed.
    pub fn during(self, operation: impl Into<String>) -> Self {
        Self::Operation {
            operation: operation.into(),
            source: Box::new(self),
        }
    }

    /// The innermost error, skipping operation annotations.
    pub fn root(&self) -> &TmuxError {
        match self {
            Self::Operation { source, .. } => source.root(),
            other => other,
        }
    }

    /// Whether this failure means no tmux server is running.
    ///
    /// tmux reports a missing server on stderr with a non-zero exit code.
    pub fn is_no_server(&self) -> bool {
        match self.root() {
            Self::CommandFailed(stderr) => {
                stderr.contains("no server running")
                    || stderr.contains("error connecting to")
                    || stderr.contains("no sessions")
            }
            _ => false,
        }
    }

    /// Whether this is a malformed-record failure.
    pub fn is_malformed(&self) -> bool {
        matches!(self.root(), Self::MalformedRecord { .. })
    }
}

/// Result type alias for tmux operations.
pub type Result<T> = std::result::Result<T, TmuxError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_during_names_operation() {
        let err = TmuxError::CommandFailed("can't find session: $9".into())
            .during("list windows for session $9");
        assert_eq!(
            err.to_string(),
            "list windows for session $9: tmux command failed: can't find session: $9"
        );
    }

    #[test]
    fn test_root_skips_nested_operations() {
        let err = TmuxError::WindowNotFound("@3".into())
            .during("inner")
            .during("outer");
        assert!(matches!(err.root(), TmuxError::WindowNotFound(id) if id == "@3"));
    }

    #[test]
    fn test_is_no_server() {
        let err = TmuxError::CommandFailed("no server running on /tmp/tmux-501/default".into())
            .during("list sessions");
        assert!(err.is_no_server());
        assert!(!TmuxError::CommandFailed("unknown command".into()).is_no_server());
        assert!(!TmuxError::BinaryNotFound.is_no_server());
    }

    #[test]
    fn test_is_malformed() {
        let err = TmuxError::MalformedRecord {
            kind: "session",
            line: "garbage".into(),
        };
        assert!(err.is_malformed());
        assert!(err.during("session by name").is_malformed());
    }
}
