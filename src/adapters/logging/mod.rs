//! NotifyLogger adapters.

mod recording;
mod tracing_logger;

pub use recording::{LogEntry, RecordingLogger};
pub use tracing_logger::{TracingLogger, LOG_TARGET};
