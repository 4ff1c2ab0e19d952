//! sqlx `PgListener` implementation of the NotifySession port.
//!
//! Each session owns one dedicated PostgreSQL connection. `PgListener`
//! reconnects on its own when `try_recv` is called after a loss; the session
//! never does that, because recovery belongs to the lifecycle manager. Once
//! closed, a session keeps reporting the same `Closed` event.
//!
//! `try_recv` drops the server's FATAL `ErrorResponse` and then reports EOF
//! as `Ok(None)`. A session killed with `pg_terminate_backend` therefore
//! closes with "connection to the database was closed", not with the
//! server's "terminating connection due to administrator command".

use std::time::Duration;

use async_trait::async_trait;
use secrecy::{ExposeSecret, Secret};
use sqlx::postgres::PgListener;
use sqlx::Executor;

use crate::config::DatabaseConfig;
use crate::domain::foundation::NotifyError;
use crate::domain::notify::RawNotification;
use crate::ports::{NotifyConnector, NotifySession, SessionEvent};

use super::describe;

const CONNECTION_CLOSED: &str = "connection to the database was closed";

/// Opens dedicated listener connections.
#[derive(Clone)]
pub struct PgListenerConnector {
    url: Secret<String>,
    connect_timeout: Duration,
}

impl PgListenerConnector {
    pub fn new(url: Secret<String>, connect_timeout: Duration) -> Self {
        Self {
            url,
            connect_timeout,
        }
    }

    pub fn from_config(config: &DatabaseConfig) -> Self {
        Self::new(config.url.clone(), config.connect_timeout())
    }
}

#[async_trait]
impl NotifyConnector for PgListenerConnector {
    async fn connect(&self) -> Result<Box<dyn NotifySession>, NotifyError> {
        let connecting = PgListener::connect(self.url.expose_secret());
        let mut listener = tokio::time::timeout(self.connect_timeout, connecting)
            .await
            .map_err(|_| {
                NotifyError::Connect(format!(
                    "timed out after {}s",
                    self.connect_timeout.as_secs()
                ))
            })?
            .map_err(|e| NotifyError::Connect(describe(&e)))?;

        let session_id = sqlx::query_scalar::<_, i32>("SELECT pg_backend_pid()")
            .fetch_one(&mut listener)
            .await
            .map_err(|e| NotifyError::Connect(describe(&e)))?;

        tracing::debug!(target: "pg_notify", session_id, "Listener connection opened");

        Ok(Box::new(PgListenerSession {
            listener,
            session_id,
            closed: None,
        }))
    }
}

/// One open listener connection.
pub struct PgListenerSession {
    listener: PgListener,
    session_id: i32,
    closed: Option<NotifyError>,
}

#[async_trait]
impl NotifySession for PgListenerSession {
    fn session_id(&self) -> Option<i32> {
        Some(self.session_id)
    }

    async fn execute_batch(&mut self, statements: &[String]) -> Result<(), NotifyError> {
        if let Some(closed) = &self.closed {
            return Err(NotifyError::Statement(closed.to_string()));
        }
        // Simple query protocol: one round trip, all-or-nothing outcome.
        let batch = statements.join("; ");
        (&mut self.listener)
            .execute(batch.as_str())
            .await
            .map_err(|e| NotifyError::Statement(describe(&e)))?;
        Ok(())
    }

    async fn next_event(&mut self) -> SessionEvent {
        if let Some(closed) = &self.closed {
            return SessionEvent::Closed(closed.clone());
        }

        let error = match self.listener.try_recv().await {
            Ok(Some(notification)) => {
                return SessionEvent::Notification(RawNotification::new(
                    notification.channel(),
                    notification.payload(),
                ));
            }
            // Also the path for server-side termination; the FATAL text is lost.
            Ok(None) => NotifyError::ConnectionLost(CONNECTION_CLOSED.to_string()),
            Err(e) => NotifyError::ConnectionLost(describe(&e)),
        };

        self.closed = Some(error.clone());
        SessionEvent::Closed(error)
    }
}
