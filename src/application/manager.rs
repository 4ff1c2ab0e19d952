//! Connection lifecycle manager.
//!
//! Owns the single dedicated notify connection and drives it through
//! bootstrap, notification delivery, loss detection and recovery.
//!
//! ## Flow
//!
//! ```text
//! init ──> connect ──> attach hook ──> LISTEN batch ──> Listening
//!                                                          │
//!            run: next event ──> Notification ──> dispatcher
//!                            └─> Closed ──> Lost ──> Reconnecting
//!                                                      │
//!                     connect ──> attach hook ──> LISTEN ──> Listening
//!                     exhausted ──> connection = None ──> Failed ──> terminate
//! ```
//!
//! Only one connect or reconnect sequence is ever in flight: the manager is
//! driven through `&mut self`, and a loss reported outside `Listening` is
//! ignored.

use std::sync::Arc;

use tokio::sync::watch;

use crate::domain::foundation::{NotifyError, StateMachine};
use crate::domain::notify::{ChannelRegistry, ConnectionState, RawNotification};
use crate::ports::{
    ListenerRegistrar, LogDetail, MessageBus, NotifyConnector, NotifyLogger, ProcessTerminator,
    SessionEvent,
};

use super::log_messages;
use super::retry::{RetryController, RetryFailure, RetryPolicy};
use super::{Connection, NotificationDispatcher, SqlListenerRegistrar};

/// Bridges PostgreSQL notifications on the round channels to the process bus.
///
/// # Example
///
/// ```ignore
/// let mut notify = PgNotify::new(connector, bus, logger, terminator)
///     .with_reconnect_policy(RetryPolicy::reconnect());
///
/// notify.init().await?;
/// notify.run(shutdown_rx).await?;
/// ```
pub struct PgNotify {
    connector: Arc<dyn NotifyConnector>,
    registrar: Arc<dyn ListenerRegistrar>,
    dispatcher: Arc<NotificationDispatcher>,
    logger: Arc<dyn NotifyLogger>,
    terminator: Arc<dyn ProcessTerminator>,
    initial_retry: RetryController,
    reconnect_retry: RetryController,
    connection: Option<Connection>,
    state: ConnectionState,
}

impl PgNotify {
    /// Create a manager for the production channel set and default policies.
    pub fn new(
        connector: Arc<dyn NotifyConnector>,
        bus: Arc<dyn MessageBus>,
        logger: Arc<dyn NotifyLogger>,
        terminator: Arc<dyn ProcessTerminator>,
    ) -> Self {
        let dispatcher = Arc::new(NotificationDispatcher::new(
            ChannelRegistry::default(),
            bus,
            Arc::clone(&logger),
        ));
        Self {
            connector,
            registrar: Arc::new(SqlListenerRegistrar::new()),
            dispatcher,
            logger,
            terminator,
            initial_retry: RetryController::new(RetryPolicy::initial_connect()),
            reconnect_retry: RetryController::new(RetryPolicy::reconnect()),
            connection: None,
            state: ConnectionState::Uninitialized,
        }
    }

    /// Replace the LISTEN/UNLISTEN registrar.
    pub fn with_registrar(mut self, registrar: Arc<dyn ListenerRegistrar>) -> Self {
        self.registrar = registrar;
        self
    }

    /// Replace the channel registry.
    pub fn with_registry(mut self, registry: ChannelRegistry) -> Self {
        self.dispatcher = Arc::new(self.dispatcher.with_registry(registry));
        self
    }

    pub fn with_initial_policy(mut self, policy: RetryPolicy) -> Self {
        self.initial_retry = RetryController::new(policy);
        self
    }

    pub fn with_reconnect_policy(mut self, policy: RetryPolicy) -> Self {
        self.reconnect_retry = RetryController::new(policy);
        self
    }

    pub fn state(&self) -> ConnectionState {
        self.state
    }

    /// The live connection, `None` before bootstrap and after teardown.
    pub fn connection(&self) -> Option<&Connection> {
        self.connection.as_ref()
    }

    /// Backend identifier of the current session.
    pub fn session_id(&self) -> Option<i32> {
        self.connection.as_ref().and_then(Connection::session_id)
    }

    /// The notification hook attached to every connection.
    pub fn dispatcher(&self) -> &Arc<NotificationDispatcher> {
        &self.dispatcher
    }

    /// Channels subscribed on every connection.
    pub async fn channels(&self) -> Vec<String> {
        self.dispatcher.channel_names().await
    }

    /// One-shot bootstrap with the initial-connect policy.
    ///
    /// Each attempt opens a connection, attaches the hook and subscribes the
    /// full channel set. On exhaustion the last error is returned and the
    /// connection is left as the last attempt produced it; this is not fatal.
    pub async fn init(&mut self) -> Result<(), NotifyError> {
        self.transition(ConnectionState::Connecting)?;

        let establisher = self.establisher();
        let logger = Arc::clone(&self.logger);
        let result = self
            .initial_retry
            .attempt(
                |_| establisher.open(),
                |failure| {
                    report_failure(
                        logger.as_ref(),
                        failure,
                        log_messages::INITIAL_CONNECTION_FAILED,
                    )
                },
            )
            .await;

        match result {
            Ok(connection) => {
                self.connection = Some(connection);
                self.transition(ConnectionState::Listening)?;
                self.logger
                    .info(log_messages::INITIAL_CONNECTION_ESTABLISHED, LogDetail::None);
                Ok(())
            }
            Err(failure) => {
                self.connection = failure.connection;
                self.transition(ConnectionState::Uninitialized)?;
                Err(failure.error)
            }
        }
    }

    /// Deliver notifications until shutdown or unrecoverable loss.
    ///
    /// Notifications are dispatched one at a time, in server order. A lost
    /// session triggers recovery; if recovery is exhausted the terminator has
    /// been invoked and `ReconnectExhausted` is returned. A shutdown signal
    /// unsubscribes (best effort), clears the connection and returns `Ok`.
    pub async fn run(&mut self, mut shutdown: watch::Receiver<bool>) -> Result<(), NotifyError> {
        if !self.state.is_listening() {
            return Err(NotifyError::InvalidState(format!(
                "notify loop requires Listening, state is {}",
                self.state
            )));
        }

        loop {
            let wake = {
                let connection = self.connection.as_mut().ok_or(NotifyError::NotConnected)?;
                tokio::select! {
                    biased;
                    _ = wait_for_shutdown(&mut shutdown) => Wake::Shutdown,
                    event = connection.session_mut().next_event() => Wake::Event(event),
                }
            };

            match wake {
                Wake::Shutdown => {
                    self.close().await;
                    return Ok(());
                }
                Wake::Event(SessionEvent::Notification(notification)) => {
                    self.deliver(notification).await;
                }
                Wake::Event(SessionEvent::Closed(error)) => {
                    let recovery = tokio::select! {
                        biased;
                        _ = wait_for_shutdown(&mut shutdown) => None,
                        result = self.handle_connection_lost(error) => Some(result),
                    };
                    match recovery {
                        Some(result) => result?,
                        None => {
                            // The dead session cannot take an UNLISTEN.
                            self.release();
                            return Ok(());
                        }
                    }
                }
            }
        }
    }

    /// React to the end of the current session.
    ///
    /// Acts only in `Listening`; a loss reported while a sequence is already
    /// in flight, or after teardown, is ignored.
    pub async fn handle_connection_lost(&mut self, error: NotifyError) -> Result<(), NotifyError> {
        if !self.state.is_listening() {
            self.logger
                .debug(log_messages::CONNECTION_LOSS_IGNORED, LogDetail::Error(error));
            return Ok(());
        }

        self.logger
            .error(log_messages::CONNECTION_LOST, LogDetail::Error(error));
        if let Some(connection) = self.connection.as_mut() {
            connection.mark_dead();
        }
        self.transition(ConnectionState::Lost)?;
        self.transition(ConnectionState::Reconnecting)?;

        let establisher = self.establisher();
        let logger = Arc::clone(&self.logger);
        let result = self
            .reconnect_retry
            .attempt(
                |_| establisher.open(),
                |failure| report_failure(logger.as_ref(), failure, log_messages::RECONNECT_FAILED),
            )
            .await;

        match result {
            Ok(connection) => {
                self.connection = Some(connection);
                self.transition(ConnectionState::Listening)?;
                self.logger.info(log_messages::RECONNECTED, LogDetail::None);
                Ok(())
            }
            Err(failure) => {
                self.connection = None;
                self.transition(ConnectionState::Failed)?;
                let error = NotifyError::ReconnectExhausted {
                    attempts: self.reconnect_retry.policy().max_attempts(),
                    last_error: Box::new(failure.error),
                };
                self.terminator.terminate(&error);
                Err(error)
            }
        }
    }

    /// Attach the hook and subscribe on the current connection.
    pub async fn set_listeners(&mut self) -> Result<(), NotifyError> {
        let establisher = self.establisher();
        let connection = self.connection.as_mut().ok_or(NotifyError::NotConnected)?;
        establisher.set_listeners(connection).await
    }

    /// Unsubscribe and detach the hook.
    ///
    /// The hook is removed whether or not the UNLISTEN batch succeeds. A
    /// batch failure is logged and returned for the caller to ignore. With no
    /// connection this is a no-op.
    pub async fn remove_listeners(&mut self) -> Result<(), NotifyError> {
        let channels = self.dispatcher.channel_names().await;
        let Some(connection) = self.connection.as_mut() else {
            return Ok(());
        };

        let result = self
            .registrar
            .unsubscribe(connection.session_mut(), &channels)
            .await;
        connection.detach_hook();

        if let Err(e) = &result {
            self.logger
                .error(log_messages::UNLISTEN_FAILED, LogDetail::Error(e.clone()));
        }
        result
    }

    /// Deliberate teardown: best-effort unsubscribe, then drop the connection.
    pub async fn close(&mut self) {
        let live = self.connection.as_ref().map_or(false, Connection::is_live);
        if live && !self.state.is_terminal() {
            // Failure is already logged; it must not block teardown.
            let _ = self.remove_listeners().await;
        }
        self.release();
    }

    fn release(&mut self) {
        self.connection = None;
        if self.state.can_transition_to(&ConnectionState::Closed) {
            self.state = ConnectionState::Closed;
        }
    }

    async fn deliver(&mut self, notification: RawNotification) {
        let Some(hook) = self.connection.as_ref().and_then(Connection::hook) else {
            return;
        };
        // Message-scoped failures are logged by the dispatcher.
        let _ = hook.on_notification(notification).await;
    }

    fn transition(&mut self, target: ConnectionState) -> Result<(), NotifyError> {
        self.state = self.state.transition_to(target)?;
        Ok(())
    }

    fn establisher(&self) -> Establisher {
        Establisher {
            connector: Arc::clone(&self.connector),
            registrar: Arc::clone(&self.registrar),
            dispatcher: Arc::clone(&self.dispatcher),
            logger: Arc::clone(&self.logger),
        }
    }
}

enum Wake {
    Shutdown,
    Event(SessionEvent),
}

/// Result of a failed connect-and-listen attempt.
struct EstablishFailure {
    error: NotifyError,
    /// Set when connect succeeded but LISTEN failed.
    connection: Option<Connection>,
}

/// The composed operation retried by both connect paths.
struct Establisher {
    connector: Arc<dyn NotifyConnector>,
    registrar: Arc<dyn ListenerRegistrar>,
    dispatcher: Arc<NotificationDispatcher>,
    logger: Arc<dyn NotifyLogger>,
}

impl Establisher {
    async fn open(&self) -> Result<Connection, EstablishFailure> {
        let session = self
            .connector
            .connect()
            .await
            .map_err(|error| EstablishFailure {
                error,
                connection: None,
            })?;

        let mut connection = Connection::new(session);
        match self.set_listeners(&mut connection).await {
            Ok(()) => Ok(connection),
            Err(error) => Err(EstablishFailure {
                error,
                connection: Some(connection),
            }),
        }
    }

    /// Hook first, so nothing arrives before a listener exists.
    async fn set_listeners(&self, connection: &mut Connection) -> Result<(), NotifyError> {
        let channels = self.dispatcher.channel_names().await;
        connection.attach_hook(Arc::clone(&self.dispatcher));

        if let Err(e) = self
            .registrar
            .subscribe(connection.session_mut(), &channels)
            .await
        {
            self.logger
                .error(log_messages::LISTEN_FAILED, LogDetail::Error(e.clone()));
            return Err(e);
        }
        Ok(())
    }
}

fn report_failure(
    logger: &dyn NotifyLogger,
    failure: RetryFailure<'_, EstablishFailure>,
    exhausted_message: &str,
) {
    let message = if failure.is_final {
        exhausted_message
    } else if failure.error.connection.is_some() {
        // Connected; the LISTEN failure is already logged.
        return;
    } else {
        log_messages::ERROR_CONNECTING
    };
    logger.error(message, LogDetail::Error(failure.error.error.clone()));
}

/// Resolves once shutdown is requested. Never resolves if the sender is gone.
async fn wait_for_shutdown(shutdown: &mut watch::Receiver<bool>) {
    loop {
        if *shutdown.borrow_and_update() {
            return;
        }
        if shutdown.changed().await.is_err() {
            std::future::pending::<()>().await;
        }
    }
}
