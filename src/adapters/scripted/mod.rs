//! Scripted NotifyConnector for tests and demos.
//!
//! Sessions are fed through tokio mpsc channels. A [`SessionHandle`] pushes
//! notifications or ends the session the way a server-side termination
//! would; the connector can be told to reject connects, LISTEN batches or
//! UNLISTEN batches with a given server message.
//!
//! # Panics
//!
//! Methods panic if the internal lock is poisoned.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use tokio::sync::mpsc;

use crate::domain::foundation::NotifyError;
use crate::domain::notify::RawNotification;
use crate::ports::{NotifyConnector, NotifySession, SessionEvent};

const FIRST_SESSION_ID: i32 = 1000;

#[derive(Debug)]
struct Script {
    connect_failure: Option<String>,
    listen_failure: Option<String>,
    unlisten_failure: Option<String>,
    connect_attempts: u32,
    next_session_id: i32,
    sessions: Vec<SessionHandle>,
}

impl Default for Script {
    fn default() -> Self {
        Self {
            connect_failure: None,
            listen_failure: None,
            unlisten_failure: None,
            connect_attempts: 0,
            next_session_id: FIRST_SESSION_ID,
            sessions: Vec::new(),
        }
    }
}

/// Connector handing out scripted sessions. Clones share the script.
#[derive(Debug, Clone, Default)]
pub struct ScriptedConnector {
    script: Arc<Mutex<Script>>,
}

impl ScriptedConnector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reject every connect with this message until `allow_connects`.
    pub fn fail_connects(&self, message: impl Into<String>) {
        self.lock().connect_failure = Some(message.into());
    }

    pub fn allow_connects(&self) {
        self.lock().connect_failure = None;
    }

    /// Fail every LISTEN batch with this message until `allow_listen`.
    pub fn fail_listen(&self, message: impl Into<String>) {
        self.lock().listen_failure = Some(message.into());
    }

    pub fn allow_listen(&self) {
        self.lock().listen_failure = None;
    }

    /// Fail every UNLISTEN batch with this message.
    pub fn fail_unlisten(&self, message: impl Into<String>) {
        self.lock().unlisten_failure = Some(message.into());
    }

    /// Connect calls so far, failed ones included.
    pub fn connect_attempts(&self) -> u32 {
        self.lock().connect_attempts
    }

    /// Handles of every session opened so far.
    pub fn sessions(&self) -> Vec<SessionHandle> {
        self.lock().sessions.clone()
    }

    pub fn latest_session(&self) -> Option<SessionHandle> {
        self.lock().sessions.last().cloned()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Script> {
        self.script.lock().expect("ScriptedConnector: lock poisoned")
    }
}

#[async_trait]
impl NotifyConnector for ScriptedConnector {
    async fn connect(&self) -> Result<Box<dyn NotifySession>, NotifyError> {
        let mut script = self.lock();
        script.connect_attempts += 1;
        if let Some(message) = &script.connect_failure {
            return Err(NotifyError::Connect(message.clone()));
        }

        let session_id = script.next_session_id;
        script.next_session_id += 1;

        let (events, receiver) = mpsc::unbounded_channel();
        let handle = SessionHandle {
            session_id,
            events,
            batches: Arc::new(Mutex::new(Vec::new())),
        };
        script.sessions.push(handle.clone());

        Ok(Box::new(ScriptedSession {
            session_id,
            events: receiver,
            batches: Arc::clone(&handle.batches),
            script: Arc::clone(&self.script),
            closed: None,
        }))
    }
}

/// Test-side control of one scripted session.
#[derive(Debug, Clone)]
pub struct SessionHandle {
    session_id: i32,
    events: mpsc::UnboundedSender<SessionEvent>,
    batches: Arc<Mutex<Vec<Vec<String>>>>,
}

impl SessionHandle {
    pub fn session_id(&self) -> i32 {
        self.session_id
    }

    /// Deliver a notification, as `pg_notify(channel, payload)` would.
    pub fn notify(&self, channel: &str, payload: &str) {
        let _ = self
            .events
            .send(SessionEvent::Notification(RawNotification::new(channel, payload)));
    }

    /// End the session from the server side.
    pub fn terminate(&self, message: &str) {
        let _ = self
            .events
            .send(SessionEvent::Closed(NotifyError::ConnectionLost(
                message.to_string(),
            )));
    }

    /// Every batch the session executed, failed ones included.
    pub fn executed_batches(&self) -> Vec<Vec<String>> {
        self.batches
            .lock()
            .expect("SessionHandle: lock poisoned")
            .clone()
    }
}

/// Session side of a scripted connection.
pub struct ScriptedSession {
    session_id: i32,
    events: mpsc::UnboundedReceiver<SessionEvent>,
    batches: Arc<Mutex<Vec<Vec<String>>>>,
    script: Arc<Mutex<Script>>,
    closed: Option<NotifyError>,
}

#[async_trait]
impl NotifySession for ScriptedSession {
    fn session_id(&self) -> Option<i32> {
        Some(self.session_id)
    }

    async fn execute_batch(&mut self, statements: &[String]) -> Result<(), NotifyError> {
        self.batches
            .lock()
            .expect("ScriptedSession: lock poisoned")
            .push(statements.to_vec());

        if let Some(closed) = &self.closed {
            return Err(NotifyError::Statement(closed.to_string()));
        }

        let failure = {
            let script = self.script.lock().expect("ScriptedSession: lock poisoned");
            let is_unlisten = statements
                .first()
                .map_or(false, |s| s.starts_with("UNLISTEN"));
            if is_unlisten {
                script.unlisten_failure.clone()
            } else {
                script.listen_failure.clone()
            }
        };

        match failure {
            Some(message) => Err(NotifyError::Statement(message)),
            None => Ok(()),
        }
    }

    async fn next_event(&mut self) -> SessionEvent {
        if let Some(closed) = &self.closed {
            return SessionEvent::Closed(closed.clone());
        }

        let event = self.events.recv().await.unwrap_or_else(|| {
            SessionEvent::Closed(NotifyError::ConnectionLost(
                "scripted session dropped".to_string(),
            ))
        });
        if let SessionEvent::Closed(error) = &event {
            self.closed = Some(error.clone());
        }
        event
    }
}
