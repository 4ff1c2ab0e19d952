//! Ports - Interfaces for external dependencies.
//!
//! Following hexagonal architecture, ports define the contracts between
//! the notify subsystem and the outside world. Adapters implement these ports.
//!
//! ## Database Ports
//!
//! - `NotifyConnector` - Opens dedicated notify sessions
//! - `NotifySession` - Batch execution and pushed notifications
//! - `ListenerRegistrar` - LISTEN/UNLISTEN batches
//!
//! ## Process Ports
//!
//! - `MessageBus` - Publishes round finalization triggers
//! - `BusSubscriber` / `MessageHandler` - In-process consumers
//! - `NotifyLogger` - Structured log sink
//! - `ProcessTerminator` - Fatal exit capability

mod bus_subscriber;
mod listener_registrar;
mod message_bus;
mod notify_logger;
mod notify_session;
mod process_terminator;

pub use bus_subscriber::{BusSubscriber, MessageHandler};
pub use listener_registrar::ListenerRegistrar;
pub use message_bus::MessageBus;
pub use notify_logger::{LogDetail, LogLevel, NotifyLogger};
pub use notify_session::{NotifyConnector, NotifySession, SessionEvent};
pub use process_terminator::ProcessTerminator;
