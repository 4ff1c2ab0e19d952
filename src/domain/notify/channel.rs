//! Channel registry and the round handlers it routes to.
//!
//! The registry maps a channel name to a handler key. A notification can fail
//! routing in two distinct ways:
//!
//! - the channel is not in the registry at all (invalid channel)
//! - the channel is registered but its key names no known handler
//!   (unsupported channel)

use std::collections::BTreeMap;
use std::fmt;

use crate::domain::foundation::ValidationError;

/// Channel that announces a closed round.
pub const ROUND_CLOSED_CHANNEL: &str = "round-closed";

/// Channel that announces a reopened round.
pub const ROUND_REOPENED_CHANNEL: &str = "round-reopened";

/// Handler routines a channel can be routed to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RoundHandler {
    /// Closing round `n` triggers finalization of round `n + 1`.
    RoundClosed,
    /// Reopening round `n` retries finalization of round `n`.
    RoundReopened,
}

impl RoundHandler {
    /// Resolves a handler key from the registry.
    pub fn from_key(key: &str) -> Option<Self> {
        match key {
            "roundClosed" => Some(RoundHandler::RoundClosed),
            "roundReopened" => Some(RoundHandler::RoundReopened),
            _ => None,
        }
    }

    /// Registry key for this handler.
    pub fn key(&self) -> &'static str {
        match self {
            RoundHandler::RoundClosed => "roundClosed",
            RoundHandler::RoundReopened => "roundReopened",
        }
    }

    /// Production channel routed to this handler.
    pub fn channel(&self) -> &'static str {
        match self {
            RoundHandler::RoundClosed => ROUND_CLOSED_CHANNEL,
            RoundHandler::RoundReopened => ROUND_REOPENED_CHANNEL,
        }
    }

    /// Handler for a production channel name.
    pub fn for_channel(channel: &str) -> Option<Self> {
        match channel {
            ROUND_CLOSED_CHANNEL => Some(RoundHandler::RoundClosed),
            ROUND_REOPENED_CHANNEL => Some(RoundHandler::RoundReopened),
            _ => None,
        }
    }
}

impl fmt::Display for RoundHandler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.key())
    }
}

/// Outcome of looking a channel up in the registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChannelRoute {
    Handler(RoundHandler),
    Unsupported,
    Invalid,
}

/// Mapping from channel name to handler key.
///
/// Every key is issued in the LISTEN batch. Fixed for normal operation;
/// diagnostics may swap the whole registry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChannelRegistry {
    channels: BTreeMap<String, String>,
}

impl ChannelRegistry {
    /// Creates a registry from explicit channel → handler key pairs.
    pub fn new<I, C, K>(entries: I) -> Self
    where
        I: IntoIterator<Item = (C, K)>,
        C: Into<String>,
        K: Into<String>,
    {
        Self {
            channels: entries
                .into_iter()
                .map(|(channel, key)| (channel.into(), key.into()))
                .collect(),
        }
    }

    /// Registry with no channels.
    pub fn empty() -> Self {
        Self {
            channels: BTreeMap::new(),
        }
    }

    /// Builds a registry from channel names.
    ///
    /// Production channels are routed to their handlers. Any other name is
    /// registered under its own name as key, so it is listened to but
    /// reported as unsupported.
    pub fn from_channels<I, C>(channels: I) -> Result<Self, ValidationError>
    where
        I: IntoIterator<Item = C>,
        C: AsRef<str>,
    {
        let mut registry = Self::empty();
        for channel in channels {
            let channel = channel.as_ref().trim();
            if channel.is_empty() {
                return Err(ValidationError::empty_field("channel"));
            }
            let key = RoundHandler::for_channel(channel)
                .map(|h| h.key().to_string())
                .unwrap_or_else(|| channel.to_string());
            registry.channels.insert(channel.to_string(), key);
        }
        Ok(registry)
    }

    /// Routes a channel to its handler.
    pub fn route(&self, channel: &str) -> ChannelRoute {
        match self.channels.get(channel) {
            None => ChannelRoute::Invalid,
            Some(key) => match RoundHandler::from_key(key) {
                Some(handler) => ChannelRoute::Handler(handler),
                None => ChannelRoute::Unsupported,
            },
        }
    }

    /// Handler key registered for a channel.
    pub fn handler_key(&self, channel: &str) -> Option<&str> {
        self.channels.get(channel).map(String::as_str)
    }

    /// Channel names in a stable order.
    pub fn channel_names(&self) -> Vec<String> {
        self.channels.keys().cloned().collect()
    }

    pub fn contains(&self, channel: &str) -> bool {
        self.channels.contains_key(channel)
    }

    pub fn len(&self) -> usize {
        self.channels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.channels.is_empty()
    }
}

impl Default for ChannelRegistry {
    fn default() -> Self {
        Self::new([
            (ROUND_CLOSED_CHANNEL, RoundHandler::RoundClosed.key()),
            (ROUND_REOPENED_CHANNEL, RoundHandler::RoundReopened.key()),
        ])
    }
}
