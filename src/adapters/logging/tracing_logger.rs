//! `tracing` implementation of the NotifyLogger port.

use crate::ports::{LogDetail, LogLevel, NotifyLogger};

/// Target of every event emitted by this logger.
pub const LOG_TARGET: &str = "pg_notify";

/// Forwards records to `tracing` with the detail as structured fields.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingLogger;

impl TracingLogger {
    pub fn new() -> Self {
        Self
    }
}

// `tracing::event!` needs the level as a constant.
macro_rules! emit {
    ($level:expr, $message:expr, $detail:expr) => {
        match $detail {
            LogDetail::None => tracing::event!(target: LOG_TARGET, $level, "{}", $message),
            LogDetail::Error(error) => {
                tracing::event!(target: LOG_TARGET, $level, error = %error, "{}", $message)
            }
            LogDetail::Round(round) => {
                tracing::event!(target: LOG_TARGET, $level, round = round.value(), "{}", $message)
            }
            LogDetail::Channel(channel) => {
                tracing::event!(target: LOG_TARGET, $level, channel = %channel, "{}", $message)
            }
            LogDetail::Notification { channel, data } => tracing::event!(
                target: LOG_TARGET,
                $level,
                channel = %channel,
                data = %data,
                "{}",
                $message
            ),
        }
    };
}

impl NotifyLogger for TracingLogger {
    fn log(&self, level: LogLevel, message: &str, detail: LogDetail) {
        match level {
            LogLevel::Debug => emit!(tracing::Level::DEBUG, message, detail),
            LogLevel::Info => emit!(tracing::Level::INFO, message, detail),
            LogLevel::Warn => emit!(tracing::Level::WARN, message, detail),
            LogLevel::Error => emit!(tracing::Level::ERROR, message, detail),
        }
    }
}
