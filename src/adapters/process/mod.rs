//! ProcessTerminator adapters.
//!
//! - `ExitProcessTerminator` - exits with status 1 for the supervisor to restart
//! - `RecordingTerminator` - records calls, for tests

use std::sync::Mutex;

use crate::domain::foundation::NotifyError;
use crate::ports::ProcessTerminator;

/// Exit code used when the notify connection is gone for good.
pub const FATAL_EXIT_CODE: i32 = 1;

#[derive(Debug, Clone, Copy, Default)]
pub struct ExitProcessTerminator;

impl ExitProcessTerminator {
    pub fn new() -> Self {
        Self
    }
}

impl ProcessTerminator for ExitProcessTerminator {
    fn terminate(&self, reason: &NotifyError) {
        tracing::error!(target: "pg_notify", error = %reason, "Terminating process");
        std::process::exit(FATAL_EXIT_CODE);
    }
}

/// Records terminate calls instead of exiting.
///
/// # Panics
///
/// Methods panic if the internal lock is poisoned.
#[derive(Debug, Default)]
pub struct RecordingTerminator {
    calls: Mutex<Vec<NotifyError>>,
}

impl RecordingTerminator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn calls(&self) -> Vec<NotifyError> {
        self.calls
            .lock()
            .expect("RecordingTerminator: lock poisoned")
            .clone()
    }
}

impl ProcessTerminator for RecordingTerminator {
    fn terminate(&self, reason: &NotifyError) {
        self.calls
            .lock()
            .expect("RecordingTerminator: lock poisoned")
            .push(reason.clone());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn recording_terminator_keeps_reasons() {
        let terminator = RecordingTerminator::new();
        terminator.terminate(&NotifyError::NotConnected);

        assert_eq!(terminator.calls(), vec![NotifyError::NotConnected]);
    }
}
