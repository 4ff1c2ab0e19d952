//! Literal log messages of the notify subsystem.
//!
//! Operational tooling matches on these texts, so they are part of the
//! external contract. `INITIAL_CONNECTION_ESTABLISHED` keeps its historical
//! spelling for the same reason.

pub const NOTIFICATION_RECEIVED: &str = "Notification received";
pub const INVALID_CHANNEL: &str = "Invalid channel";
pub const CHANNEL_NOT_SUPPORTED: &str = "Channel not supported";
pub const ROUND_CLOSED: &str = "Round closed";
pub const ROUND_REOPENED: &str = "Round reopened";
pub const MALFORMED_PAYLOAD: &str = "Malformed notification payload";
pub const BUS_PUBLISH_FAILED: &str = "Failed to publish bus message";

pub const ERROR_CONNECTING: &str = "Error connecting";
pub const INITIAL_CONNECTION_FAILED: &str = "Initial connection failed";
pub const INITIAL_CONNECTION_ESTABLISHED: &str = "Initial connection estabilished";
pub const CONNECTION_LOST: &str = "Connection lost";
pub const CONNECTION_LOSS_IGNORED: &str = "Connection loss ignored during recovery";
pub const RECONNECTED: &str = "Reconnected successfully";
pub const RECONNECT_FAILED: &str = "Failed to reconnect - connection lost";

pub const LISTEN_FAILED: &str = "Failed to execute LISTEN queries";
pub const UNLISTEN_FAILED: &str = "Failed to execute UNLISTEN queries";
