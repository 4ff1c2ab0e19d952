//! Domain layer containing the notification types.
//!
//! # Module Organization
//!
//! - `foundation` - Shared primitives (errors, state machine trait)
//! - `notify` - Round numbers, bus messages, channel registry, connection lifecycle

pub mod foundation;
pub mod notify;
