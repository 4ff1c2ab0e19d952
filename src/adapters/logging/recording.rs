//! Recording NotifyLogger for tests.
//!
//! # Panics
//!
//! Methods panic if the internal lock is poisoned.

use std::sync::Mutex;

use crate::ports::{LogDetail, LogLevel, NotifyLogger};

/// One captured record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogEntry {
    pub level: LogLevel,
    pub message: String,
    pub detail: LogDetail,
}

/// Captures records in order for assertions.
#[derive(Debug, Default)]
pub struct RecordingLogger {
    entries: Mutex<Vec<LogEntry>>,
}

impl RecordingLogger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn entries(&self) -> Vec<LogEntry> {
        self.entries
            .lock()
            .expect("RecordingLogger: lock poisoned")
            .clone()
    }

    pub fn entries_at(&self, level: LogLevel) -> Vec<LogEntry> {
        self.entries()
            .into_iter()
            .filter(|e| e.level == level)
            .collect()
    }

    /// Message texts at one level, in order.
    pub fn messages_at(&self, level: LogLevel) -> Vec<String> {
        self.entries_at(level)
            .into_iter()
            .map(|e| e.message)
            .collect()
    }

    pub fn count(&self, level: LogLevel, message: &str) -> usize {
        self.entries_at(level)
            .iter()
            .filter(|e| e.message == message)
            .count()
    }

    pub fn clear(&self) {
        self.entries
            .lock()
            .expect("RecordingLogger: lock poisoned")
            .clear();
    }
}

impl NotifyLogger for RecordingLogger {
    fn log(&self, level: LogLevel, message: &str, detail: LogDetail) {
        self.entries
            .lock()
            .expect("RecordingLogger: lock poisoned")
            .push(LogEntry {
                level,
                message: message.to_string(),
                detail,
            });
    }
}
