//! The dedicated notify connection owned by the lifecycle manager.

use std::fmt;
use std::sync::Arc;

use crate::ports::NotifySession;

use super::NotificationDispatcher;

/// One exclusive database session plus its notification hook.
///
/// Only the lifecycle manager mutates a connection. Collaborators borrow the
/// session for the duration of a single call.
pub struct Connection {
    session: Box<dyn NotifySession>,
    session_id: Option<i32>,
    hook: Option<Arc<NotificationDispatcher>>,
    live: bool,
}

impl Connection {
    /// Wraps a freshly opened session. No hook is attached yet.
    pub fn new(session: Box<dyn NotifySession>) -> Self {
        let session_id = session.session_id();
        Self {
            session,
            session_id,
            hook: None,
            live: true,
        }
    }

    /// Backend identifier, usable by operators to terminate the session.
    pub fn session_id(&self) -> Option<i32> {
        self.session_id
    }

    /// False once the server ended the session.
    pub fn is_live(&self) -> bool {
        self.live
    }

    /// True while notifications are routed to a dispatcher.
    pub fn has_hook(&self) -> bool {
        self.hook.is_some()
    }

    pub(crate) fn hook(&self) -> Option<Arc<NotificationDispatcher>> {
        self.hook.clone()
    }

    pub(crate) fn attach_hook(&mut self, dispatcher: Arc<NotificationDispatcher>) {
        self.hook = Some(dispatcher);
    }

    pub(crate) fn detach_hook(&mut self) {
        self.hook = None;
    }

    pub(crate) fn mark_dead(&mut self) {
        self.live = false;
    }

    pub(crate) fn session_mut(&mut self) -> &mut dyn NotifySession {
        self.session.as_mut()
    }
}

impl fmt::Debug for Connection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Connection")
            .field("session_id", &self.session_id)
            .field("hooked", &self.has_hook())
            .field("live", &self.live)
            .finish()
    }
}
