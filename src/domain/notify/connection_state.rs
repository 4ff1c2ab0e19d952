//! ConnectionState enum for the dedicated notify connection.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::domain::foundation::StateMachine;

/// Lifecycle of the dedicated LISTEN connection.
///
/// ```text
/// Uninitialized -> Connecting -> Listening -> Lost -> Reconnecting -> Listening
///                      |                                   |
///                      +-> Uninitialized (bootstrap failed) +-> Failed
/// Listening | Lost | Reconnecting -> Closed (shutdown)
/// ```
///
/// `Failed` is fatal for the hosting process. `Closed` is a deliberate stop.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ConnectionState {
    #[default]
    Uninitialized,
    Connecting,
    Listening,
    Lost,
    Reconnecting,
    Failed,
    Closed,
}

impl ConnectionState {
    /// True while notifications are being delivered.
    pub fn is_listening(&self) -> bool {
        matches!(self, ConnectionState::Listening)
    }
}

impl StateMachine for ConnectionState {
    fn can_transition_to(&self, target: &Self) -> bool {
        use ConnectionState::*;
        matches!(
            (self, target),
            (Uninitialized, Connecting)
                | (Connecting, Listening)
                | (Connecting, Uninitialized)
                | (Listening, Lost)
                | (Listening, Closed)
                | (Lost, Reconnecting)
                | (Lost, Closed)
                | (Reconnecting, Listening)
                | (Reconnecting, Failed)
                | (Reconnecting, Closed)
        )
    }

    fn valid_transitions(&self) -> Vec<Self> {
        use ConnectionState::*;
        match self {
            Uninitialized => vec![Connecting],
            Connecting => vec![Listening, Uninitialized],
            Listening => vec![Lost, Closed],
            Lost => vec![Reconnecting, Closed],
            Reconnecting => vec![Listening, Failed, Closed],
            Failed => vec![],
            Closed => vec![],
        }
    }
}

impl fmt::Display for ConnectionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ConnectionState::Uninitialized => "Uninitialized",
            ConnectionState::Connecting => "Connecting",
            ConnectionState::Listening => "Listening",
            ConnectionState::Lost => "Lost",
            ConnectionState::Reconnecting => "Reconnecting",
            ConnectionState::Failed => "Failed",
            ConnectionState::Closed => "Closed",
        };
        write!(f, "{}", s)
    }
}
