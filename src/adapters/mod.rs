//! Adapters - Implementations of port interfaces.
//!
//! Adapters connect the notify subsystem to external systems:
//! - `events` - Process bus implementations (in-memory, broadcast)
//! - `logging` - `tracing` and recording loggers
//! - `postgres` - sqlx `PgListener` sessions and operator helpers
//! - `process` - Process termination
//! - `scripted` - Channel-driven sessions for tests

pub mod events;
pub mod logging;
pub mod postgres;
pub mod process;
pub mod scripted;

pub use events::{BroadcastMessageBus, InMemoryMessageBus};
pub use logging::{LogEntry, RecordingLogger, TracingLogger};
pub use postgres::{PgListenerConnector, PgListenerSession};
pub use process::{ExitProcessTerminator, RecordingTerminator};
pub use scripted::{ScriptedConnector, ScriptedSession, SessionHandle};
