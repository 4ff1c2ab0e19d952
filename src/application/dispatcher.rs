//! Notification dispatcher.
//!
//! Classifies raw notifications by channel, parses the round number and
//! publishes the matching bus message.
//!
//! # Routing
//!
//! | Channel | Log | Bus message |
//! |---------|-----|-------------|
//! | `round-closed` `n` | info `Round closed` | `finishRound(n + 1)` |
//! | `round-reopened` `n` | warn `Round reopened` | `finishRound(n)` |
//! | not registered | error `Invalid channel` | none |
//! | registered, no handler | error `Channel not supported` | none |

use std::sync::Arc;

use tokio::sync::RwLock;

use crate::domain::foundation::NotifyError;
use crate::domain::notify::{BusMessage, ChannelRegistry, ChannelRoute, RawNotification, RoundHandler, RoundNumber};
use crate::ports::{LogDetail, MessageBus, NotifyLogger};

use super::log_messages;

/// What happened to a notification that did not fail.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DispatchOutcome {
    Published(BusMessage),
    InvalidChannel,
    UnsupportedChannel,
}

/// The notification hook attached to a live connection.
pub struct NotificationDispatcher {
    registry: RwLock<ChannelRegistry>,
    bus: Arc<dyn MessageBus>,
    logger: Arc<dyn NotifyLogger>,
}

impl NotificationDispatcher {
    pub fn new(
        registry: ChannelRegistry,
        bus: Arc<dyn MessageBus>,
        logger: Arc<dyn NotifyLogger>,
    ) -> Self {
        Self {
            registry: RwLock::new(registry),
            bus,
            logger,
        }
    }

    /// New dispatcher on the same bus and logger with another registry.
    pub fn with_registry(&self, registry: ChannelRegistry) -> Self {
        Self::new(registry, Arc::clone(&self.bus), Arc::clone(&self.logger))
    }

    /// Swap the registry in place. Diagnostics only.
    pub async fn replace_registry(&self, registry: ChannelRegistry) {
        *self.registry.write().await = registry;
    }

    /// Channels to LISTEN on.
    pub async fn channel_names(&self) -> Vec<String> {
        self.registry.read().await.channel_names()
    }

    /// Handle one pushed notification.
    ///
    /// Invalid and unsupported channels are logged and dropped. Malformed
    /// payloads and bus failures are logged and returned; none of them
    /// concern the connection.
    pub async fn on_notification(
        &self,
        notification: RawNotification,
    ) -> Result<DispatchOutcome, NotifyError> {
        self.logger.debug(
            log_messages::NOTIFICATION_RECEIVED,
            LogDetail::Notification {
                channel: notification.channel.clone(),
                data: notification.payload.clone(),
            },
        );

        let route = self.registry.read().await.route(&notification.channel);
        let handler = match route {
            ChannelRoute::Handler(handler) => handler,
            ChannelRoute::Invalid => {
                self.logger.error(
                    log_messages::INVALID_CHANNEL,
                    LogDetail::Channel(notification.channel),
                );
                return Ok(DispatchOutcome::InvalidChannel);
            }
            ChannelRoute::Unsupported => {
                self.logger.error(
                    log_messages::CHANNEL_NOT_SUPPORTED,
                    LogDetail::Channel(notification.channel),
                );
                return Ok(DispatchOutcome::UnsupportedChannel);
            }
        };

        let round = self.parse_round(&notification)?;
        let message = match handler {
            RoundHandler::RoundClosed => {
                let next = round.next().ok_or_else(|| self.malformed(&notification))?;
                self.logger
                    .info(log_messages::ROUND_CLOSED, LogDetail::Round(round));
                BusMessage::finish_round(next)
            }
            RoundHandler::RoundReopened => {
                self.logger
                    .warn(log_messages::ROUND_REOPENED, LogDetail::Round(round));
                BusMessage::finish_round(round)
            }
        };

        match self.bus.message(message.clone()).await {
            Ok(()) => Ok(DispatchOutcome::Published(message)),
            Err(e) => {
                self.logger
                    .error(log_messages::BUS_PUBLISH_FAILED, LogDetail::Error(e.clone()));
                Err(e)
            }
        }
    }

    fn parse_round(&self, notification: &RawNotification) -> Result<RoundNumber, NotifyError> {
        RoundNumber::parse(&notification.payload).map_err(|_| self.malformed(notification))
    }

    fn malformed(&self, notification: &RawNotification) -> NotifyError {
        let error = NotifyError::MalformedPayload {
            channel: notification.channel.clone(),
            payload: notification.payload.clone(),
        };
        self.logger
            .error(log_messages::MALFORMED_PAYLOAD, LogDetail::Error(error.clone()));
        error
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::{InMemoryMessageBus, RecordingLogger};
    use crate::ports::LogLevel;
    use async_trait::async_trait;
    use proptest::prelude::*;

    fn dispatcher(registry: ChannelRegistry) -> (NotificationDispatcher, Arc<InMemoryMessageBus>, Arc<RecordingLogger>) {
        let bus = Arc::new(InMemoryMessageBus::new());
        let logger = Arc::new(RecordingLogger::new());
        let dispatcher = NotificationDispatcher::new(registry, bus.clone(), logger.clone());
        (dispatcher, bus, logger)
    }

    #[tokio::test]
    async fn round_closed_finishes_next_round() {
        let (dispatcher, bus, logger) = dispatcher(ChannelRegistry::default());

        let outcome = dispatcher
            .on_notification(RawNotification::new("round-closed", "123"))
            .await
            .unwrap();

        assert_eq!(
            outcome,
            DispatchOutcome::Published(BusMessage::finish_round(RoundNumber::new(124)))
        );
        assert_eq!(
            bus.published_messages(),
            vec![BusMessage::finish_round(RoundNumber::new(124))]
        );
        assert_eq!(
            logger.entries_at(LogLevel::Debug)[0].detail,
            LogDetail::Notification {
                channel: "round-closed".to_string(),
                data: "123".to_string()
            }
        );
        let info = logger.entries_at(LogLevel::Info);
        assert_eq!(info.len(), 1);
        assert_eq!(info[0].message, "Round closed");
        assert_eq!(info[0].detail, LogDetail::Round(RoundNumber::new(123)));
        assert!(logger.entries_at(LogLevel::Warn).is_empty());
    }

    #[tokio::test]
    async fn round_reopened_finishes_same_round() {
        let (dispatcher, bus, logger) = dispatcher(ChannelRegistry::default());

        dispatcher
            .on_notification(RawNotification::new("round-reopened", "123"))
            .await
            .unwrap();

        assert_eq!(
            bus.published_messages(),
            vec![BusMessage::finish_round(RoundNumber::new(123))]
        );
        let warn = logger.entries_at(LogLevel::Warn);
        assert_eq!(warn.len(), 1);
        assert_eq!(warn[0].message, "Round reopened");
        assert_eq!(warn[0].detail, LogDetail::Round(RoundNumber::new(123)));
        assert!(logger.entries_at(LogLevel::Info).is_empty());
    }

    #[tokio::test]
    async fn unregistered_channel_is_invalid() {
        let (dispatcher, bus, logger) = dispatcher(ChannelRegistry::empty());

        let outcome = dispatcher
            .on_notification(RawNotification::new("round-reopened", "123"))
            .await
            .unwrap();

        assert_eq!(outcome, DispatchOutcome::InvalidChannel);
        assert_eq!(bus.message_count(), 0);
        let errors = logger.entries_at(LogLevel::Error);
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].message, "Invalid channel");
        assert_eq!(errors[0].detail, LogDetail::Channel("round-reopened".to_string()));
        assert!(logger.entries_at(LogLevel::Info).is_empty());
        assert!(logger.entries_at(LogLevel::Warn).is_empty());
    }

    #[tokio::test]
    async fn registered_channel_without_handler_is_not_supported() {
        let (dispatcher, bus, logger) = dispatcher(ChannelRegistry::new([("test", "test")]));

        let outcome = dispatcher
            .on_notification(RawNotification::new("test", "123"))
            .await
            .unwrap();

        assert_eq!(outcome, DispatchOutcome::UnsupportedChannel);
        assert_eq!(bus.message_count(), 0);
        let errors = logger.entries_at(LogLevel::Error);
        assert_eq!(errors[0].message, "Channel not supported");
        assert_eq!(errors[0].detail, LogDetail::Channel("test".to_string()));
    }

    #[tokio::test]
    async fn non_numeric_payload_is_a_parse_error() {
        let (dispatcher, bus, logger) = dispatcher(ChannelRegistry::default());

        let err = dispatcher
            .on_notification(RawNotification::new("round-closed", "abc"))
            .await
            .unwrap_err();

        assert_eq!(
            err,
            NotifyError::MalformedPayload {
                channel: "round-closed".to_string(),
                payload: "abc".to_string()
            }
        );
        assert_eq!(bus.message_count(), 0);
        assert_eq!(logger.messages_at(LogLevel::Error), vec!["Malformed notification payload"]);
        assert!(logger.entries_at(LogLevel::Info).is_empty());
    }

    #[tokio::test]
    async fn closing_the_last_representable_round_is_malformed() {
        let (dispatcher, bus, logger) = dispatcher(ChannelRegistry::default());

        let result = dispatcher
            .on_notification(RawNotification::new("round-closed", &u64::MAX.to_string()))
            .await;

        assert!(matches!(result, Err(NotifyError::MalformedPayload { .. })));
        assert_eq!(bus.message_count(), 0);
        assert_eq!(
            logger.messages_at(LogLevel::Error),
            vec!["Malformed notification payload"]
        );
        assert!(logger.entries_at(LogLevel::Info).is_empty());
    }

    struct RejectingBus;

    #[async_trait]
    impl MessageBus for RejectingBus {
        async fn message(&self, message: BusMessage) -> Result<(), NotifyError> {
            Err(NotifyError::Bus {
                topic: message.topic,
                reason: "bus closed".to_string(),
            })
        }
    }

    #[tokio::test]
    async fn bus_failure_is_logged_and_returned() {
        let logger = Arc::new(RecordingLogger::new());
        let dispatcher = NotificationDispatcher::new(
            ChannelRegistry::default(),
            Arc::new(RejectingBus),
            logger.clone(),
        );

        let result = dispatcher
            .on_notification(RawNotification::new("round-reopened", "5"))
            .await;

        assert!(matches!(result, Err(NotifyError::Bus { .. })));
        assert_eq!(logger.messages_at(LogLevel::Error), vec!["Failed to publish bus message"]);
    }

    #[tokio::test]
    async fn replace_registry_changes_routing() {
        let (dispatcher, bus, _logger) = dispatcher(ChannelRegistry::default());

        dispatcher.replace_registry(ChannelRegistry::empty()).await;
        let outcome = dispatcher
            .on_notification(RawNotification::new("round-closed", "1"))
            .await
            .unwrap();

        assert_eq!(outcome, DispatchOutcome::InvalidChannel);
        assert!(dispatcher.channel_names().await.is_empty());
        assert_eq!(bus.message_count(), 0);
    }

    #[tokio::test]
    async fn notifications_are_published_in_delivery_order() {
        let (dispatcher, bus, _logger) = dispatcher(ChannelRegistry::default());

        for (channel, payload) in [("round-closed", "1"), ("round-reopened", "1"), ("round-closed", "2")] {
            dispatcher
                .on_notification(RawNotification::new(channel, payload))
                .await
                .unwrap();
        }

        let rounds: Vec<u64> = bus
            .published_messages()
            .iter()
            .map(|m| m.argument.value())
            .collect();
        assert_eq!(rounds, vec![2, 1, 3]);
    }

    proptest! {
        #[test]
        fn closed_and_reopened_differ_by_one(n in 0u64..u64::MAX) {
            let runtime = tokio::runtime::Builder::new_current_thread().build().unwrap();
            runtime.block_on(async {
                let (dispatcher, bus, _logger) = dispatcher(ChannelRegistry::default());
                dispatcher.on_notification(RawNotification::new("round-closed", n.to_string())).await.unwrap();
                dispatcher.on_notification(RawNotification::new("round-reopened", n.to_string())).await.unwrap();
                let published = bus.published_messages();
                assert_eq!(published[0].argument.value(), n + 1);
                assert_eq!(published[1].argument.value(), n);
            });
        }
    }
}
