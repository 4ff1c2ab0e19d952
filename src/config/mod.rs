//! Application configuration module
//!
//! This module provides type-safe configuration loading from environment variables
//! using the `config` and `dotenvy` crates. Configuration is loaded with the
//! `PG_NOTIFY` prefix and nested values use double underscores as separators.
//!
//! # Example
//!
//! ```no_run
//! use pg_round_notify::config::AppConfig;
//!
//! let config = AppConfig::load().expect("Failed to load configuration");
//! config.validate().expect("Invalid configuration");
//!
//! println!("Listening on {:?}", config.notify.channels);
//! ```

mod database;
mod error;
mod logging;
mod notify;

pub use database::DatabaseConfig;
pub use error::{ConfigError, ValidationError};
pub use logging::LoggingConfig;
pub use notify::NotifyConfig;

use serde::Deserialize;

/// Root application configuration
///
/// Load using [`AppConfig::load()`] which reads from environment variables.
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    /// Database configuration (dedicated listener connection)
    pub database: DatabaseConfig,

    /// Channels and retry policies
    #[serde(default)]
    pub notify: NotifyConfig,

    /// Log filter and format
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl AppConfig {
    /// Load configuration from environment variables
    ///
    /// This function:
    /// 1. Loads `.env` file if present (for development)
    /// 2. Reads environment variables with `PG_NOTIFY` prefix
    /// 3. Uses `__` (double underscore) to separate nested values
    /// 4. Splits `notify.channels` on commas
    ///
    /// # Environment Variable Format
    ///
    /// - `PG_NOTIFY__DATABASE__URL=...` -> `database.url = ...`
    /// - `PG_NOTIFY__NOTIFY__RECONNECT_RETRIES=5` -> `notify.reconnect_retries = 5`
    /// - `PG_NOTIFY__NOTIFY__CHANNELS=round-closed,round-reopened`
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if:
    /// - Required environment variables are missing
    /// - Values cannot be parsed into expected types
    pub fn load() -> Result<Self, ConfigError> {
        // Load .env file if present (development)
        dotenvy::dotenv().ok();

        let config = config::Config::builder()
            .add_source(
                config::Environment::default()
                    .prefix("PG_NOTIFY")
                    .separator("__")
                    .try_parsing(true)
                    .list_separator(",")
                    .with_list_parse_key("notify.channels"),
            )
            .build()?
            .try_deserialize()?;

        Ok(config)
    }

    /// Validate all configuration values
    ///
    /// # Errors
    ///
    /// Returns `ValidationError` if any configuration value is invalid.
    pub fn validate(&self) -> Result<(), ValidationError> {
        self.database.validate()?;
        self.notify.validate()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::RetryPolicy;
    use secrecy::ExposeSecret;
    use std::env;
    use std::sync::Mutex;
    use std::time::Duration;

    // Mutex to ensure tests don't run in parallel (env vars are global)
    static ENV_MUTEX: Mutex<()> = Mutex::new(());

    fn set_minimal_env() {
        env::set_var("PG_NOTIFY__DATABASE__URL", "postgresql://test@localhost/test");
    }

    fn clear_env() {
        env::remove_var("PG_NOTIFY__DATABASE__URL");
        env::remove_var("PG_NOTIFY__DATABASE__CONNECT_TIMEOUT_SECS");
        env::remove_var("PG_NOTIFY__NOTIFY__CHANNELS");
        env::remove_var("PG_NOTIFY__NOTIFY__RECONNECT_RETRIES");
        env::remove_var("PG_NOTIFY__NOTIFY__RECONNECT_DELAY_MS");
        env::remove_var("PG_NOTIFY__LOGGING__JSON");
    }

    #[test]
    fn test_load_from_environment() {
        let _guard = ENV_MUTEX.lock().unwrap();
        set_minimal_env();
        let result = AppConfig::load();
        clear_env();

        assert!(result.is_ok(), "Failed to load config: {:?}", result.err());
        let config = result.unwrap();
        assert_eq!(
            config.database.url.expose_secret(),
            "postgresql://test@localhost/test"
        );
    }

    #[test]
    fn test_defaults_apply() {
        let _guard = ENV_MUTEX.lock().unwrap();
        set_minimal_env();
        let result = AppConfig::load();
        clear_env();

        let config = result.unwrap();
        assert_eq!(config.notify.initial_policy(), RetryPolicy::initial_connect());
        assert_eq!(config.notify.reconnect_policy(), RetryPolicy::reconnect());
        assert_eq!(config.logging.level, "info");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_overrides_from_environment() {
        let _guard = ENV_MUTEX.lock().unwrap();
        set_minimal_env();
        env::set_var("PG_NOTIFY__NOTIFY__CHANNELS", "round-closed,diagnostics");
        env::set_var("PG_NOTIFY__NOTIFY__RECONNECT_RETRIES", "3");
        env::set_var("PG_NOTIFY__NOTIFY__RECONNECT_DELAY_MS", "250");
        env::set_var("PG_NOTIFY__LOGGING__JSON", "true");
        let result = AppConfig::load();
        clear_env();

        let config = result.unwrap();
        assert_eq!(config.notify.channels, vec!["round-closed", "diagnostics"]);
        assert_eq!(
            config.notify.reconnect_policy(),
            RetryPolicy::new(3, Duration::from_millis(250))
        );
        assert!(config.logging.json);
    }

    #[test]
    fn test_missing_database_url_fails() {
        let _guard = ENV_MUTEX.lock().unwrap();
        clear_env();
        let result = AppConfig::load();

        assert!(result.is_err());
    }

    #[test]
    fn test_validate_rejects_non_postgres_url() {
        let _guard = ENV_MUTEX.lock().unwrap();
        env::set_var("PG_NOTIFY__DATABASE__URL", "mysql://test@localhost/test");
        let result = AppConfig::load();
        clear_env();

        let config = result.unwrap();
        assert!(matches!(
            config.validate(),
            Err(ValidationError::InvalidDatabaseUrl)
        ));
    }
}
