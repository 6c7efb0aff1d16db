//! Find-or-create a session and enter it the right way for the caller.

use tracing::{debug, info};

use crate::context::TmuxContext;
use crate::executor::CommandExecutor;
use crate::naming::SessionName;
use crate::record::Session;
use crate::server::TmuxServer;
use crate::Result;

/// Outcome of [`TmuxServer::ensure_session`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Provisioned {
    /// A session with the name already existed and was left untouched.
    Reused(Session),
    /// A new session was created; it holds exactly what tmux reported.
    Created(Session),
}

impl Provisioned {
    pub fn session(&self) -> &Session {
        match self {
            Self::Reused(s) | Self::Created(s) => s,
        }
    }

    pub fn into_session(self) -> Session {
        match self {
            Self::Reused(s) | Self::Created(s) => s,
        }
    }

    /// Whether this call created the session. Only fresh sessions get a
    /// layout applied.
    pub fn freshly_created(&self) -> bool {
        matches!(self, Self::Created(_))
    }
}

impl<E: CommandExecutor> TmuxServer<E> {
    /// Return the session named `name`, creating it at `path` if absent.
    ///
    /// A reused session is returned as listed; `path` is ignored for it.
    pub fn ensure_session(&self, name: &SessionName, path: &str) -> Result<Provisioned> {
        if let Some(session) = self.session_by_name(name)? {
            debug!(name = %name, id = %session.id, "reusing session");
            return Ok(Provisioned::Reused(session));
        }

        let session = self.create_session(name, path)?;
        info!(name = %name, id = %session.id, path = %session.path, "created session");
        Ok(Provisioned::Created(session))
    }

    /// Enter a session using the action that fits the current context.
    ///
    /// Returns the context that decided the action.
    pub fn enter_session(&self, session: &Session) -> Result<TmuxContext> {
        let context = self.context();
        self.enter_session_in(session, context)?;
        Ok(context)
    }

    /// Enter a session for an already-classified context.
    pub fn enter_session_in(&self, session: &Session, context: TmuxContext) -> Result<()> {
        debug!(name = %session.name, ?context, "entering session");
        match context {
            TmuxContext::Attached => self.switch_session(&session.name),
            TmuxContext::Detached => self.attach_session(&session.name),
            TmuxContext::Serverless => self.switch_client(&session.name),
        }
    }

    /// Find or create the session, then enter it.
    ///
    /// If entering fails the session stays created.
    pub fn ensure_and_enter(&self, name: &SessionName, path: &str) -> Result<Provisioned> {
        let provisioned = self.ensure_session(name, path)?;
        self.enter_session(provisioned.session())?;
        Ok(provisioned)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fake::FakeTmux;

    #[test]
    fn test_ensure_creates_missing_session() {
        let fake = FakeTmux::new();
        let server = TmuxServer::with_executor(&fake);

        let provisioned = server
            .ensure_session(&SessionName::new("My.Proj"), "/src/my.proj")
            .unwrap();
        assert!(provisioned.freshly_created());

        let session = provisioned.session();
        assert_eq!(session.name, "my-proj");
        assert_eq!(session.path, "/src/my.proj");
        assert_eq!(session.windows.len(), 1);
        assert_eq!(session.windows[0].panes.len(), 1);
    }

    #[test]
    fn test_ensure_reuses_existing_session_verbatim() {
        let fake = FakeTmux::new().with_session("proj", "/original", &[2, 1]);
        let server = TmuxServer::with_executor(&fake);

        let provisioned = server
            .ensure_session(&SessionName::new("proj"), "/elsewhere")
            .unwrap();
        assert!(!provisioned.freshly_created());
        assert_eq!(provisioned.session().path, "/original");
        assert!(fake.calls_to("new-session").is_empty());
    }

    #[test]
    fn test_ensure_does_not_reuse_a_different_session() {
        let fake = FakeTmux::new().with_session("cvmx", "/work/cvmx", &[1]);
        let server = TmuxServer::with_executor(&fake);

        let provisioned = server.ensure_session(&SessionName::new("a}b"), "/work/ab").unwrap();
        assert!(provisioned.freshly_created());
        assert_eq!(provisioned.session().name, "a}b");
        assert_eq!(provisioned.session().path, "/work/ab");
    }

    #[test]
    fn test_ensure_starts_server_when_none_running() {
        let fake = FakeTmux::new().without_server();
        let server = TmuxServer::with_executor(&fake);

        let provisioned = server.ensure_session(&SessionName::new("proj"), "/p").unwrap();
        assert!(matches!(provisioned, Provisioned::Created(_)));
    }

    #[test]
    fn test_ensure_propagates_creation_failure() {
        let fake = FakeTmux::new().fail_on("new-session");
        let server = TmuxServer::with_executor(&fake);
        let err = server
            .ensure_session(&SessionName::new("proj"), "/p")
            .unwrap_err();
        assert!(err.to_string().starts_with("create session proj"));
    }

    #[test]
    fn test_enter_dispatches_one_action_per_context() {
        let fake = FakeTmux::new().with_session("proj", "/p", &[1]);
        let server = TmuxServer::with_executor(&fake);
        let session = fake.session("proj").unwrap();

        server.enter_session_in(&session, TmuxContext::Attached).unwrap();
        server.enter_session_in(&session, TmuxContext::Detached).unwrap();
        server.enter_session_in(&session, TmuxContext::Serverless).unwrap();

        let entered: Vec<String> = fake.entered().into_iter().map(|(cmd, _)| cmd).collect();
        assert_eq!(entered, vec!["switch", "attach", "switch-client"]);
    }

    #[test]
    fn test_entry_failure_keeps_created_session() {
        let fake = FakeTmux::new().fail_on("attach").fail_on("switch").fail_on("switch-client");
        let server = TmuxServer::with_executor(&fake);

        let result = server.ensure_and_enter(&SessionName::new("proj"), "/p");
        assert!(result.is_err());
        assert!(fake.session("proj").is_some());
    }
}
