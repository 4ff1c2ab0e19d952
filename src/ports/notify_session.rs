//! NotifySession port - the database push/subscribe contract.
//!
//! A session is one exclusive database connection able to:
//! - report a backend session identifier (usable by operators to terminate it)
//! - execute a batch of statements with one aggregate outcome
//! - yield pushed notifications, in server order, until it ends

use async_trait::async_trait;

use crate::domain::foundation::NotifyError;
use crate::domain::notify::RawNotification;

/// Next thing a session has to report.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEvent {
    /// A NOTIFY on a subscribed channel.
    Notification(RawNotification),
    /// The session ended. No further events follow.
    Closed(NotifyError),
}

/// One exclusive database session carrying LISTEN subscriptions.
#[async_trait]
pub trait NotifySession: Send {
    /// Backend identifier of the session, if the driver exposes one.
    fn session_id(&self) -> Option<i32>;

    /// Execute the statements as a single batch.
    ///
    /// Returns the first failure. Implementations should return
    /// `NotifyError::Statement` for statement-level errors.
    async fn execute_batch(&mut self, statements: &[String]) -> Result<(), NotifyError>;

    /// Wait for the next pushed event.
    ///
    /// Must be cancellation safe: dropping the future loses no notification.
    async fn next_event(&mut self) -> SessionEvent;
}

/// Factory for dedicated notify sessions.
#[async_trait]
pub trait NotifyConnector: Send + Sync {
    /// Open a new session. Connect errors are `NotifyError::Connect`.
    async fn connect(&self) -> Result<Box<dyn NotifySession>, NotifyError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[allow(dead_code)]
    fn assert_session_object_safe(_: &dyn NotifySession) {}

    #[allow(dead_code)]
    fn assert_connector_object_safe(_: &dyn NotifyConnector) {}

    #[test]
    fn session_event_equality() {
        let a = SessionEvent::Notification(RawNotification::new("round-closed", "1"));
        let b = SessionEvent::Notification(RawNotification::new("round-closed", "1"));
        assert_eq!(a, b);
        assert_ne!(a, SessionEvent::Closed(NotifyError::ConnectionLost("x".into())));
    }
}
