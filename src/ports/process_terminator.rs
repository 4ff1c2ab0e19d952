//! ProcessTerminator port - the fatal capability.
//!
//! Losing the notify connection for good means losing consensus liveness
//! signals. The lifecycle manager then asks the host to stop so external
//! supervision can restart it.

use crate::domain::foundation::NotifyError;

/// Port for terminating the hosting process.
pub trait ProcessTerminator: Send + Sync {
    /// Called once when recovery is exhausted.
    fn terminate(&self, reason: &NotifyError);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[allow(dead_code)]
    fn assert_object_safe(_: &dyn ProcessTerminator) {}
}
