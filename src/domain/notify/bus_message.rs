//! Messages published on the process bus.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::RoundNumber;

/// Topic that asks the node to finalize a round.
pub const FINISH_ROUND: &str = "finishRound";

/// Transient `{topic, argument}` value handed to the process bus.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BusMessage {
    pub topic: String,
    pub argument: RoundNumber,
}

impl BusMessage {
    /// Creates a `finishRound(round)` message.
    pub fn finish_round(round: RoundNumber) -> Self {
        Self {
            topic: FINISH_ROUND.to_string(),
            argument: round,
        }
    }

    /// True if this is a round finalization trigger.
    pub fn is_finish_round(&self) -> bool {
        self.topic == FINISH_ROUND
    }
}

impl fmt::Display for BusMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}({})", self.topic, self.argument)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn finish_round_uses_finish_round_topic() {
        let message = BusMessage::finish_round(RoundNumber::new(124));
        assert_eq!(message.topic, "finishRound");
        assert_eq!(message.argument, RoundNumber::new(124));
        assert!(message.is_finish_round());
    }

    #[test]
    fn displays_as_call() {
        let message = BusMessage::finish_round(RoundNumber::new(9));
        assert_eq!(message.to_string(), "finishRound(9)");
    }

    #[test]
    fn serializes_argument_as_plain_number() {
        let message = BusMessage::finish_round(RoundNumber::new(124));
        assert_eq!(
            serde_json::to_string(&message).unwrap(),
            r#"{"topic":"finishRound","argument":124}"#
        );
    }
}
