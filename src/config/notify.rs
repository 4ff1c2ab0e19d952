//! Notify subsystem configuration

use serde::Deserialize;
use std::time::Duration;

use crate::application::RetryPolicy;
use crate::domain::notify::{ChannelRegistry, ROUND_CLOSED_CHANNEL, ROUND_REOPENED_CHANNEL};

use super::error::ValidationError;

/// Channels and retry policies
#[derive(Debug, Clone, Deserialize)]
pub struct NotifyConfig {
    /// Channels to LISTEN on
    #[serde(default = "default_channels")]
    pub channels: Vec<String>,

    /// Retries after a failed initial connect
    #[serde(default = "default_initial_retries")]
    pub initial_retries: u32,

    /// Delay between initial connect attempts in milliseconds
    #[serde(default = "default_delay_ms")]
    pub initial_delay_ms: u64,

    /// Retries after a failed reconnect
    #[serde(default = "default_reconnect_retries")]
    pub reconnect_retries: u32,

    /// Delay between reconnect attempts in milliseconds
    #[serde(default = "default_delay_ms")]
    pub reconnect_delay_ms: u64,
}

impl NotifyConfig {
    pub fn initial_policy(&self) -> RetryPolicy {
        RetryPolicy::new(
            self.initial_retries,
            Duration::from_millis(self.initial_delay_ms),
        )
    }

    pub fn reconnect_policy(&self) -> RetryPolicy {
        RetryPolicy::new(
            self.reconnect_retries,
            Duration::from_millis(self.reconnect_delay_ms),
        )
    }

    /// Registry for the configured channels
    pub fn registry(&self) -> Result<ChannelRegistry, ValidationError> {
        ChannelRegistry::from_channels(&self.channels)
            .map_err(|e| ValidationError::InvalidChannel(e.to_string()))
    }

    /// Validate notify configuration
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.channels.is_empty() {
            return Err(ValidationError::MissingRequired("NOTIFY_CHANNELS"));
        }
        self.registry()?;
        if self.reconnect_retries > 1000 {
            return Err(ValidationError::RetryLimitTooLarge);
        }
        Ok(())
    }
}

impl Default for NotifyConfig {
    fn default() -> Self {
        Self {
            channels: default_channels(),
            initial_retries: default_initial_retries(),
            initial_delay_ms: default_delay_ms(),
            reconnect_retries: default_reconnect_retries(),
            reconnect_delay_ms: default_delay_ms(),
        }
    }
}

fn default_channels() -> Vec<String> {
    vec![
        ROUND_CLOSED_CHANNEL.to_string(),
        ROUND_REOPENED_CHANNEL.to_string(),
    ]
}

fn default_initial_retries() -> u32 {
    1
}

fn default_reconnect_retries() -> u32 {
    10
}

fn default_delay_ms() -> u64 {
    1000
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_notify_config_defaults() {
        let config = NotifyConfig::default();
        assert_eq!(config.initial_policy(), RetryPolicy::initial_connect());
        assert_eq!(config.reconnect_policy(), RetryPolicy::reconnect());
        assert_eq!(config.registry().unwrap(), ChannelRegistry::default());
    }

    #[test]
    fn test_validation_empty_channels() {
        let config = NotifyConfig {
            channels: Vec::new(),
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validation_blank_channel() {
        let config = NotifyConfig {
            channels: vec!["round-closed".to_string(), "  ".to_string()],
            ..Default::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ValidationError::InvalidChannel(_))
        ));
    }

    #[test]
    fn test_deserialization_with_partial_fields() {
        let json = r#"{ "reconnect_retries": 3, "reconnect_delay_ms": 250 }"#;

        let config: NotifyConfig = serde_json::from_str(json).unwrap();

        assert_eq!(
            config.reconnect_policy(),
            RetryPolicy::new(3, Duration::from_millis(250))
        );
        assert_eq!(config.channels.len(), 2);
    }
}
