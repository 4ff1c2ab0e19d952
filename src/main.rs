//! PG Round Notify daemon

use std::process::ExitCode;
use std::sync::Arc;

use tokio::sync::{broadcast, watch};
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use pg_round_notify::adapters::{
    BroadcastMessageBus, ExitProcessTerminator, PgListenerConnector, TracingLogger,
};
use pg_round_notify::application::PgNotify;
use pg_round_notify::config::{AppConfig, ConfigError, LoggingConfig};
use pg_round_notify::domain::notify::BusMessage;

/// Buffered bus messages per consumer
const BUS_CAPACITY: usize = 256;

#[tokio::main]
async fn main() -> ExitCode {
    let config = match load_config() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("pg-round-notify: {}", e);
            return ExitCode::FAILURE;
        }
    };
    init_tracing(&config.logging);

    info!(version = env!("CARGO_PKG_VERSION"), "Starting pg-round-notify");

    let registry = match config.notify.registry() {
        Ok(registry) => registry,
        Err(e) => {
            error!(error = %e, "Invalid channel configuration");
            return ExitCode::FAILURE;
        }
    };

    let bus = Arc::new(BroadcastMessageBus::new(BUS_CAPACITY));
    spawn_bus_consumer(bus.subscribe());

    let mut notify = PgNotify::new(
        Arc::new(PgListenerConnector::from_config(&config.database)),
        bus,
        Arc::new(TracingLogger::new()),
        Arc::new(ExitProcessTerminator::new()),
    )
    .with_registry(registry)
    .with_initial_policy(config.notify.initial_policy())
    .with_reconnect_policy(config.notify.reconnect_policy());

    if notify.init().await.is_err() {
        // Failure details are already logged.
        return ExitCode::FAILURE;
    }
    info!(session_id = ?notify.session_id(), "Listening for round notifications");

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => {
                info!("Shutdown requested");
                let _ = shutdown_tx.send(true);
            }
            Err(e) => warn!(error = %e, "Cannot listen for Ctrl-C, running until killed"),
        }
    });

    match notify.run(shutdown_rx).await {
        Ok(()) => {
            info!("Stopped");
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!(error = %e, "Notify loop ended");
            ExitCode::FAILURE
        }
    }
}

fn load_config() -> Result<AppConfig, ConfigError> {
    let config = AppConfig::load()?;
    config.validate()?;
    Ok(config)
}

fn init_tracing(config: &LoggingConfig) {
    let registry = tracing_subscriber::registry().with(config.env_filter());
    if config.json {
        registry.with(tracing_subscriber::fmt::layer().json()).init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }
}

/// Stand-in consumer until the round finalizer subscribes in-process.
fn spawn_bus_consumer(mut messages: broadcast::Receiver<BusMessage>) {
    tokio::spawn(async move {
        loop {
            match messages.recv().await {
                Ok(message) => info!(
                    topic = %message.topic,
                    round = message.argument.value(),
                    "Bus message"
                ),
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    warn!(skipped, "Bus consumer lagged behind")
                }
                Err(broadcast::error::RecvError::Closed) => break,
            }
        }
    });
}
