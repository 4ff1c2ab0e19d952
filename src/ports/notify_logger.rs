//! NotifyLogger port - structured log sink for the notify subsystem.
//!
//! Message texts are fixed literals that operational tooling matches on.
//! The detail carries the structured part of the record.

use std::fmt;

use crate::domain::foundation::NotifyError;
use crate::domain::notify::RoundNumber;

/// Severity of a log record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum LogLevel {
    Debug,
    Info,
    Warn,
    Error,
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warn => "warn",
            LogLevel::Error => "error",
        };
        write!(f, "{}", s)
    }
}

/// Structured detail attached to a log record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LogDetail {
    None,
    Error(NotifyError),
    Round(RoundNumber),
    Channel(String),
    Notification { channel: String, data: String },
}

/// Port for the logging collaborator.
pub trait NotifyLogger: Send + Sync {
    /// Record a message at the given level.
    fn log(&self, level: LogLevel, message: &str, detail: LogDetail);

    fn debug(&self, message: &str, detail: LogDetail) {
        self.log(LogLevel::Debug, message, detail);
    }

    fn info(&self, message: &str, detail: LogDetail) {
        self.log(LogLevel::Info, message, detail);
    }

    fn warn(&self, message: &str, detail: LogDetail) {
        self.log(LogLevel::Warn, message, detail);
    }

    fn error(&self, message: &str, detail: LogDetail) {
        self.log(LogLevel::Error, message, detail);
    }
}
