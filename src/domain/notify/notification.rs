//! Raw notification pushed by the database.

/// `{channel, payload}` pair as delivered by NOTIFY.
///
/// Consumed immediately by the dispatcher, never queued or persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawNotification {
    pub channel: String,
    pub payload: String,
}

impl RawNotification {
    pub fn new(channel: impl Into<String>, payload: impl Into<String>) -> Self {
        Self {
            channel: channel.into(),
            payload: payload.into(),
        }
    }
}
