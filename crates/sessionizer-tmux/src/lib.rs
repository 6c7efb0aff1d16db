//! tmux control-protocol client for Sessionizer.
//!
//! This crate models the live state of a tmux server and provisions
//! sessions on it:
//! - Decode session, window and pane records from tmux's text output
//! - Hydrate sessions into a session → window → pane tree
//! - Classify whether the caller is inside tmux, outside it, or has no server
//! - Find-or-create a session by normalized name and enter it
//!
//! # Example
//!
//! ```no_run
//! use sessionizer_tmux::{SessionName, TmuxServer};
//!
//! // Connect (verifies tmux is available)
//! let tmux = TmuxServer::new().expect("tmux not found");
//!
//! // Find or create a session, then switch/attach to it
//! let provisioned = tmux
//!     .ensure_and_enter(&SessionName::new("My Project"), "/home/me/src/project")
//!     .unwrap();
//! println!("session {} (fresh: {})", provisioned.session().name, provisioned.freshly_created());
//!
//! // Inspect the full tree
//! for session in tmux.sessions().unwrap() {
//!     println!("{}: {} windows", session.name, session.windows.len());
//! }
//! ```

pub mod context;
pub mod error;
pub mod executor;
#[cfg(any(test, feature = "test-util"))]
pub mod fake;
pub mod naming;
pub mod provision;
pub mod record;
pub mod server;

pub use context::{TmuxContext, TMUX_ENV};
pub use error::{Result, TmuxError};
pub use executor::{CommandExecutor, TmuxCommand};
pub use naming::{normalize_name, SessionName};
pub use provision::Provisioned;
pub use record::{Pane, Session, Window};
pub use server::{Direction, TmuxServer};
