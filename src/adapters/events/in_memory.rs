//! In-memory message bus.
//!
//! Records every published message and delivers it to registered handlers
//! in the publishing task, so tests observe publications deterministically.
//!
//! # Panics
//!
//! Methods panic if internal locks are poisoned, which only happens after a
//! handler panicked while the bus held a lock.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use crate::domain::foundation::NotifyError;
use crate::domain::notify::BusMessage;
use crate::ports::{BusSubscriber, MessageBus, MessageHandler};

/// In-memory process bus.
///
/// # Example
///
/// ```ignore
/// let bus = Arc::new(InMemoryMessageBus::new());
///
/// bus.message(BusMessage::finish_round(RoundNumber::new(124))).await?;
///
/// assert_eq!(bus.message_count(), 1);
/// assert!(bus.has_topic("finishRound"));
/// ```
pub struct InMemoryMessageBus {
    handlers: RwLock<HashMap<String, Vec<Arc<dyn MessageHandler>>>>,
    published: RwLock<Vec<BusMessage>>,
}

impl InMemoryMessageBus {
    pub fn new() -> Self {
        Self {
            handlers: RwLock::new(HashMap::new()),
            published: RwLock::new(Vec::new()),
        }
    }

    // === Test Helpers ===

    /// All published messages, in publication order.
    pub fn published_messages(&self) -> Vec<BusMessage> {
        self.published
            .read()
            .expect("InMemoryMessageBus: published lock poisoned")
            .clone()
    }

    /// Published messages for one topic.
    pub fn messages_for(&self, topic: &str) -> Vec<BusMessage> {
        self.published_messages()
            .into_iter()
            .filter(|m| m.topic == topic)
            .collect()
    }

    pub fn message_count(&self) -> usize {
        self.published
            .read()
            .expect("InMemoryMessageBus: published lock poisoned")
            .len()
    }

    pub fn has_topic(&self, topic: &str) -> bool {
        self.published
            .read()
            .expect("InMemoryMessageBus: published lock poisoned")
            .iter()
            .any(|m| m.topic == topic)
    }

    /// Forget recorded messages. Handlers stay registered.
    pub fn clear(&self) {
        self.published
            .write()
            .expect("InMemoryMessageBus: published write lock poisoned")
            .clear();
    }
}

impl Default for InMemoryMessageBus {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl MessageBus for InMemoryMessageBus {
    async fn message(&self, message: BusMessage) -> Result<(), NotifyError> {
        self.published
            .write()
            .expect("InMemoryMessageBus: published write lock poisoned")
            .push(message.clone());

        // Clone handlers to release lock before await points
        let topic_handlers: Vec<Arc<dyn MessageHandler>> = {
            let handlers = self
                .handlers
                .read()
                .expect("InMemoryMessageBus: handlers lock poisoned");
            handlers.get(&message.topic).cloned().unwrap_or_default()
        };

        let mut errors = Vec::new();
        for handler in topic_handlers {
            if let Err(e) = handler.handle(message.clone()).await {
                errors.push(format!("{}: {}", handler.name(), e));
            }
        }

        if !errors.is_empty() {
            return Err(NotifyError::Bus {
                topic: message.topic,
                reason: format!("handler errors: {}", errors.join(", ")),
            });
        }

        Ok(())
    }
}

impl BusSubscriber for InMemoryMessageBus {
    fn subscribe(&self, topic: &str, handler: Arc<dyn MessageHandler>) {
        self.handlers
            .write()
            .expect("InMemoryMessageBus: handlers write lock poisoned")
            .entry(topic.to_string())
            .or_default()
            .push(handler);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::notify::{RoundNumber, FINISH_ROUND};
    use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};

    fn finish(round: u64) -> BusMessage {
        BusMessage::finish_round(RoundNumber::new(round))
    }

    #[tokio::test]
    async fn message_is_recorded() {
        let bus = InMemoryMessageBus::new();

        bus.message(finish(7)).await.unwrap();

        assert_eq!(bus.message_count(), 1);
        assert!(bus.has_topic(FINISH_ROUND));
        assert_eq!(bus.messages_for(FINISH_ROUND), vec![finish(7)]);
    }

    #[tokio::test]
    async fn handler_receives_round_argument() {
        let bus = InMemoryMessageBus::new();
        let seen = Arc::new(AtomicU64::new(0));

        struct RoundHandler(Arc<AtomicU64>);

        #[async_trait]
        impl MessageHandler for RoundHandler {
            async fn handle(&self, message: BusMessage) -> Result<(), NotifyError> {
                self.0.store(message.argument.value(), Ordering::SeqCst);
                Ok(())
            }
            fn name(&self) -> &'static str {
                "RoundHandler"
            }
        }

        bus.subscribe(FINISH_ROUND, Arc::new(RoundHandler(seen.clone())));
        bus.message(finish(42)).await.unwrap();

        assert_eq!(seen.load(Ordering::SeqCst), 42);
    }

    #[tokio::test]
    async fn handlers_on_other_topics_are_not_invoked() {
        let bus = InMemoryMessageBus::new();
        let counter = Arc::new(AtomicUsize::new(0));

        struct CountingHandler(Arc<AtomicUsize>);

        #[async_trait]
        impl MessageHandler for CountingHandler {
            async fn handle(&self, _: BusMessage) -> Result<(), NotifyError> {
                self.0.fetch_add(1, Ordering::SeqCst);
                Ok(())
            }
            fn name(&self) -> &'static str {
                "CountingHandler"
            }
        }

        bus.subscribe(FINISH_ROUND, Arc::new(CountingHandler(counter.clone())));
        bus.subscribe(FINISH_ROUND, Arc::new(CountingHandler(counter.clone())));
        bus.subscribe("startRound", Arc::new(CountingHandler(counter.clone())));

        bus.message(finish(1)).await.unwrap();

        assert_eq!(counter.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn handler_error_is_reported_as_bus_error() {
        let bus = InMemoryMessageBus::new();

        struct FailingHandler;

        #[async_trait]
        impl MessageHandler for FailingHandler {
            async fn handle(&self, _: BusMessage) -> Result<(), NotifyError> {
                Err(NotifyError::InvalidState("round already final".to_string()))
            }
            fn name(&self) -> &'static str {
                "FailingHandler"
            }
        }

        bus.subscribe(FINISH_ROUND, Arc::new(FailingHandler));
        let err = bus.message(finish(3)).await.unwrap_err();

        match err {
            NotifyError::Bus { topic, reason } => {
                assert_eq!(topic, FINISH_ROUND);
                assert!(reason.contains("FailingHandler"));
            }
            other => panic!("unexpected error: {:?}", other),
        }
        // Recorded even though a handler failed.
        assert_eq!(bus.message_count(), 1);
    }

    #[tokio::test]
    async fn clear_removes_recorded_messages() {
        let bus = InMemoryMessageBus::new();
        bus.message(finish(1)).await.unwrap();
        bus.message(finish(2)).await.unwrap();

        bus.clear();

        assert_eq!(bus.message_count(), 0);
    }
}
