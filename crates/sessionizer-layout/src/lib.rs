//! Layout files for Sessionizer.
//!
//! A layout describes the windows of a session, the panes in each window,
//! the directory each starts in, the command typed into it and which pane
//! ends up focused. Layouts are read from YAML:
//!
//! ```yaml
//! windows:
//!   - window_name: dev
//!     layout: main-vertical
//!     start_directory: ~/src/proj
//!     panes:
//!       - shell_command: [nvim]
//!         focus: true
//!       - shell_command: [cargo, watch]
//! ```

pub mod error;
pub mod spec;

pub use error::{Result, SpecError};
pub use spec::{expand_path, Arrangement, LayoutSpec, PaneSpec, WindowSpec};
