//! SQL implementation of the ListenerRegistrar port.
//!
//! Builds one statement per channel and submits them as a single batch.
//! Channel names are quoted identifiers so names such as `round-closed`
//! are accepted by the server verbatim.

use async_trait::async_trait;

use crate::domain::foundation::{BatchKind, NotifyError};
use crate::ports::{ListenerRegistrar, NotifySession};

/// Issues `LISTEN "<channel>"` / `UNLISTEN "<channel>"` batches.
#[derive(Debug, Clone, Copy, Default)]
pub struct SqlListenerRegistrar;

impl SqlListenerRegistrar {
    pub fn new() -> Self {
        Self
    }

    async fn run_batch(
        &self,
        kind: BatchKind,
        session: &mut dyn NotifySession,
        channels: &[String],
    ) -> Result<(), NotifyError> {
        if channels.is_empty() {
            return Ok(());
        }
        let batch = statements(kind, channels);
        session
            .execute_batch(&batch)
            .await
            .map_err(|e| match e {
                NotifyError::Batch { message, .. } => NotifyError::batch(kind, message),
                other => NotifyError::batch(kind, other.to_string()),
            })
    }
}

#[async_trait]
impl ListenerRegistrar for SqlListenerRegistrar {
    async fn subscribe(
        &self,
        session: &mut dyn NotifySession,
        channels: &[String],
    ) -> Result<(), NotifyError> {
        self.run_batch(BatchKind::Listen, session, channels).await
    }

    async fn unsubscribe(
        &self,
        session: &mut dyn NotifySession,
        channels: &[String],
    ) -> Result<(), NotifyError> {
        self.run_batch(BatchKind::Unlisten, session, channels).await
    }
}

fn statements(kind: BatchKind, channels: &[String]) -> Vec<String> {
    channels
        .iter()
        .map(|channel| format!("{} {}", kind, quote_identifier(channel)))
        .collect()
}

/// Quotes a channel name as a PostgreSQL identifier.
pub fn quote_identifier(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}
