//! Process bus adapters.
//!
//! - `InMemoryMessageBus` - Synchronous, in-process bus with recording
//! - `BroadcastMessageBus` - Fan-out to tokio broadcast receivers

mod broadcast;
mod in_memory;

pub use broadcast::BroadcastMessageBus;
pub use in_memory::InMemoryMessageBus;
