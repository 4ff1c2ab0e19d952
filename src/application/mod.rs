//! Application layer - connection lifecycle and notification dispatch.
//!
//! Orchestrates the domain types through the ports:
//! - `retry` - bounded fixed-delay retry
//! - `registrar` - LISTEN/UNLISTEN batches
//! - `dispatcher` - notification to bus message
//! - `manager` - connect, recover, tear down

mod connection;
mod dispatcher;
pub mod log_messages;
mod manager;
mod registrar;
mod retry;

pub use connection::Connection;
pub use dispatcher::{DispatchOutcome, NotificationDispatcher};
pub use manager::PgNotify;
pub use registrar::{quote_identifier, SqlListenerRegistrar};
pub use retry::{RetryController, RetryFailure, RetryPolicy};
