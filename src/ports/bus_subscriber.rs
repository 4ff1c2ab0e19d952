//! BusSubscriber port - Interface for consuming process bus messages.

use async_trait::async_trait;
use std::sync::Arc;

use crate::domain::foundation::NotifyError;
use crate::domain::notify::BusMessage;

/// Handler for processing bus messages.
///
/// Implementations should be:
/// - **Quick** - Long operations should be queued for async processing
/// - **Isolated** - Errors don't affect other handlers
///
/// # Example
///
/// ```ignore
/// struct RoundFinalizer { /* ... */ }
///
/// #[async_trait]
/// impl MessageHandler for RoundFinalizer {
///     async fn handle(&self, message: BusMessage) -> Result<(), NotifyError> {
///         self.finish(message.argument).await
///     }
///
///     fn name(&self) -> &'static str {
///         "RoundFinalizer"
///     }
/// }
/// ```
#[async_trait]
pub trait MessageHandler: Send + Sync {
    /// Process a message.
    async fn handle(&self, message: BusMessage) -> Result<(), NotifyError>;

    /// Handler name for logging.
    fn name(&self) -> &'static str;
}

/// Port for subscribing to bus topics.
pub trait BusSubscriber: Send + Sync {
    /// Subscribe handler to a topic.
    fn subscribe(&self, topic: &str, handler: Arc<dyn MessageHandler>);
}
