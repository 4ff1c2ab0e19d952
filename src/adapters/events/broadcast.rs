//! Broadcast message bus for the hosting process.
//!
//! Fans every message out to all current receivers over a tokio
//! `broadcast` channel. Receivers that lag behind lose the oldest messages
//! and observe `RecvError::Lagged`.

use async_trait::async_trait;
use tokio::sync::broadcast;

use crate::domain::foundation::NotifyError;
use crate::domain::notify::BusMessage;
use crate::ports::MessageBus;

/// Process bus backed by `tokio::sync::broadcast`.
#[derive(Debug, Clone)]
pub struct BroadcastMessageBus {
    sender: broadcast::Sender<BusMessage>,
}

impl BroadcastMessageBus {
    /// Create a bus with the given per-receiver buffer.
    ///
    /// # Panics
    ///
    /// Panics if `capacity` is zero.
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// New receiver observing every message published from now on.
    pub fn subscribe(&self) -> broadcast::Receiver<BusMessage> {
        self.sender.subscribe()
    }

    pub fn receiver_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

#[async_trait]
impl MessageBus for BroadcastMessageBus {
    async fn message(&self, message: BusMessage) -> Result<(), NotifyError> {
        // No receiver is not a failure: nobody is interested in the round yet.
        let _ = self.sender.send(message);
        Ok(())
    }
}
