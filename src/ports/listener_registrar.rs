//! ListenerRegistrar port - (un)registers channel subscriptions as a batch.

use async_trait::async_trait;

use crate::domain::foundation::NotifyError;

use super::NotifySession;

/// Port for issuing LISTEN/UNLISTEN batches on a session.
///
/// A failed batch is a statement-level error (`NotifyError::Batch`), never a
/// connection-loss condition. The session is borrowed for one call only.
#[async_trait]
pub trait ListenerRegistrar: Send + Sync {
    /// Subscribe the session to every channel in one batch.
    async fn subscribe(
        &self,
        session: &mut dyn NotifySession,
        channels: &[String],
    ) -> Result<(), NotifyError>;

    /// Unsubscribe the session from every channel in one batch.
    async fn unsubscribe(
        &self,
        session: &mut dyn NotifySession,
        channels: &[String],
    ) -> Result<(), NotifyError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[allow(dead_code)]
    fn assert_object_safe(_: &dyn ListenerRegistrar) {}
}
