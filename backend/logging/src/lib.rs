//! Structured logging for Docket.
//!
//! Handles log redaction, console and rolling NDJSON output, and pipeline event logging.

pub mod event_logger;
pub mod logger;
pub mod redact;

pub use event_logger::{EventLogEntry, EventLogger, PipelineEvent};
pub use logger::init_logger;
pub use redact::redact_sensitive_data;
