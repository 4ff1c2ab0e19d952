//! PostgreSQL adapters.
//!
//! - `PgListenerConnector` / `PgListenerSession` - dedicated LISTEN connections
//! - `admin` - NOTIFY and session termination on a regular pool

pub mod admin;
mod listener_session;

pub use listener_session::{PgListenerConnector, PgListenerSession};

/// Server-side primary message for database errors, display text otherwise.
fn describe(error: &sqlx::Error) -> String {
    match error.as_database_error() {
        Some(db) => db.message().to_string(),
        None => error.to_string(),
    }
}
