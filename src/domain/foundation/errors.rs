//! Error types for the domain layer.

use std::fmt;
use thiserror::Error;

/// Errors that occur during value object construction.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Field '{field}' cannot be empty")]
    EmptyField { field: String },

    #[error("Field '{field}' has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },
}

impl ValidationError {
    /// Creates an empty field validation error.
    pub fn empty_field(field: impl Into<String>) -> Self {
        ValidationError::EmptyField { field: field.into() }
    }

    /// Creates an invalid format validation error.
    pub fn invalid_format(field: impl Into<String>, reason: impl Into<String>) -> Self {
        ValidationError::InvalidFormat {
            field: field.into(),
            reason: reason.into(),
        }
    }
}

/// Which statement batch failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BatchKind {
    Listen,
    Unlisten,
}

impl fmt::Display for BatchKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            BatchKind::Listen => "LISTEN",
            BatchKind::Unlisten => "UNLISTEN",
        };
        write!(f, "{}", s)
    }
}

/// Errors raised by the notification subsystem.
///
/// Connection-scoped errors (`Connect`, `Batch`, `ConnectionLost`,
/// `ReconnectExhausted`) feed the retry and recovery paths. Message-scoped
/// errors (`MalformedPayload`, `Bus`) are absorbed after logging.
///
/// The type is `Clone` so the same error can be handed to the logger and
/// returned to the caller.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NotifyError {
    /// Network, authentication or endpoint failure while opening a session.
    #[error("{0}")]
    Connect(String),

    /// A single statement failed on an open session.
    #[error("{0}")]
    Statement(String),

    /// A LISTEN or UNLISTEN batch failed. `message` is the primary error.
    #[error("{message}")]
    Batch { kind: BatchKind, message: String },

    /// The server ended the session.
    #[error("{0}")]
    ConnectionLost(String),

    /// Every reconnect attempt failed.
    #[error("reconnection failed after {attempts} attempts: {last_error}")]
    ReconnectExhausted {
        attempts: u32,
        last_error: Box<NotifyError>,
    },

    /// Payload on a round channel is not a round number.
    #[error("malformed payload on channel '{channel}': {payload:?}")]
    MalformedPayload { channel: String, payload: String },

    /// The process bus refused a message.
    #[error("bus rejected '{topic}' message: {reason}")]
    Bus { topic: String, reason: String },

    /// Operation requires an active connection.
    #[error("no active notify connection")]
    NotConnected,

    /// Lifecycle operation invoked from a state that does not allow it.
    #[error("invalid lifecycle transition: {0}")]
    InvalidState(String),
}

impl NotifyError {
    /// Creates a batch error for the given statement kind.
    pub fn batch(kind: BatchKind, message: impl Into<String>) -> Self {
        NotifyError::Batch {
            kind,
            message: message.into(),
        }
    }
}

impl From<ValidationError> for NotifyError {
    fn from(err: ValidationError) -> Self {
        NotifyError::InvalidState(err.to_string())
    }
}
