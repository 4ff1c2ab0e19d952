//! Notify module - round notifications and the connection lifecycle.

mod bus_message;
mod channel;
mod connection_state;
mod notification;
mod round;

pub use bus_message::{BusMessage, FINISH_ROUND};
pub use channel::{
    ChannelRegistry, ChannelRoute, RoundHandler, ROUND_CLOSED_CHANNEL, ROUND_REOPENED_CHANNEL,
};
pub use connection_state::ConnectionState;
pub use notification::RawNotification;
pub use round::RoundNumber;
