//! Foundation module - Shared domain primitives.
//!
//! Contains the error types and the state machine trait used across the
//! notification domain.

mod errors;
mod state_machine;

pub use errors::{BatchKind, NotifyError, ValidationError};
pub use state_machine::StateMachine;
