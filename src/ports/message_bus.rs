//! MessageBus port - Interface for publishing on the process bus.
//!
//! The dispatcher publishes round finalization triggers without knowing
//! how the host process fans them out.

use async_trait::async_trait;

use crate::domain::foundation::NotifyError;
use crate::domain::notify::BusMessage;

/// Port for publishing bus messages.
///
/// Implementations must ensure:
/// - Messages are delivered in the order `message` is called
/// - Errors are propagated to the caller
///
/// # Example
///
/// ```ignore
/// bus.message(BusMessage::finish_round(RoundNumber::new(124))).await?;
/// ```
#[async_trait]
pub trait MessageBus: Send + Sync {
    /// Publish a single message.
    async fn message(&self, message: BusMessage) -> Result<(), NotifyError>;
}
