//! Operator helpers on a regular pool.
//!
//! Used to trigger notifications and to terminate a listener session from
//! outside. The notify subsystem itself never calls these.

use sqlx::PgPool;

use crate::domain::foundation::NotifyError;

use super::describe;

/// Terminate a backend session. Returns false when no such session exists.
pub async fn terminate_session(pool: &PgPool, session_id: i32) -> Result<bool, NotifyError> {
    sqlx::query_scalar::<_, bool>("SELECT pg_terminate_backend($1)")
        .bind(session_id)
        .fetch_one(pool)
        .await
        .map_err(|e| NotifyError::Statement(describe(&e)))
}

/// Send a notification with `pg_notify`.
pub async fn notify(pool: &PgPool, channel: &str, payload: &str) -> Result<(), NotifyError> {
    sqlx::query("SELECT pg_notify($1, $2)")
        .bind(channel)
        .bind(payload)
        .execute(pool)
        .await
        .map_err(|e| NotifyError::Statement(describe(&e)))?;
    Ok(())
}
