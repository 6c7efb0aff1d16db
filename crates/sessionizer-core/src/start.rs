//! Starting a session for a project: find or create it, lay it out if it is
//! new and the project ships a layout file, then enter it.

use std::path::{Path, PathBuf};

use sessionizer_layout::LayoutSpec;
use sessionizer_tmux::{CommandExecutor, Provisioned, SessionName, TmuxServer};
use tracing::{debug, info};

use crate::engine::LayoutEngine;
use crate::readiness::PaneReadiness;
use crate::Result;

/// Layout file looked up in a project's root.
pub const LAYOUT_FILE_NAME: &str = ".sessionizer.yml";

/// Where a project's layout file would live.
pub fn layout_file(project_path: &Path) -> PathBuf {
    project_path.join(LAYOUT_FILE_NAME)
}

/// Find or create the session for `name`, apply the project's layout file
/// to a newly created session, and enter it.
///
/// A layout failure is returned before entering; the session stays.
pub fn start_session<E, R>(
    server: &TmuxServer<E>,
    readiness: R,
    name: &str,
    path: &str,
) -> Result<Provisioned>
where
    E: CommandExecutor,
    R: PaneReadiness,
{
    let name = SessionName::new(name);
    let provisioned = server.ensure_session(&name, path)?;

    if let Provisioned::Created(session) = &provisioned {
        let file = layout_file(Path::new(path));
        if file.is_file() {
            info!(session = %session.name, file = %file.display(), "applying project layout");
            let spec = LayoutSpec::from_file(&file)?;
            LayoutEngine::new(server, readiness).apply(session, &spec)?;
        } else {
            debug!(session = %session.name, "no layout file");
        }
    }

    server.enter_session(provisioned.session())?;
    Ok(provisioned)
}
