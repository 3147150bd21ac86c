//! Pipeline Event Logger
//!
//! Structured events (stage transitions, failures, batch totals) emitted on the
//! `docket_events` target so they can be filtered or routed to the NDJSON file.

use chrono::{DateTime, Utc};
use docket_core::{BatchSummary, ErrorKind, FileStage};
use serde::Serialize;
use tracing::{info, warn};

use crate::redact::redact_sensitive_data;

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum PipelineEvent {
    BatchStarted {
        total: usize,
        concurrency: usize,
    },
    StageChanged {
        index: usize,
        file_name: String,
        from: FileStage,
        to: FileStage,
    },
    FileFailed {
        index: usize,
        file_name: String,
        kind: ErrorKind,
        error_msg: String,
    },
    BatchCompleted {
        summary: BatchSummary,
        elapsed_ms: u64,
    },
}

#[derive(Debug, Serialize)]
pub struct EventLogEntry {
    pub batch_id: String,
    pub timestamp: DateTime<Utc>,
    pub event: PipelineEvent,
}

pub struct EventLogger;

impl EventLogger {
    /// Redact and emit one pipeline event through the tracing system.
    pub fn log_event(batch_id: &str, mut event: PipelineEvent) -> EventLogEntry {
        if let PipelineEvent::FileFailed { error_msg, .. } = &mut event {
            *error_msg = redact_sensitive_data(error_msg);
        }

        let entry = EventLogEntry {
            batch_id: batch_id.into(),
            timestamp: Utc::now(),
            event,
        };

        let payload = serde_json::to_string(&entry).unwrap_or_default();
        match &entry.event {
            PipelineEvent::FileFailed { .. } => {
                warn!(target: "docket_events", batch_id = %entry.batch_id, event = %payload, "Pipeline event")
            }
            _ => info!(target: "docket_events", batch_id = %entry.batch_id, event = %payload, "Pipeline event"),
        }
        entry
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn failure_messages_are_redacted() {
        let entry = EventLogger::log_event(
            "batch-1",
            PipelineEvent::FileFailed {
                index: 0,
                file_name: "a.pdf".into(),
                kind: ErrorKind::Extraction,
                error_msg: "denied for Bearer abc.def".into(),
            },
        );
        match entry.event {
            PipelineEvent::FileFailed { error_msg, .. } => {
                assert!(!error_msg.contains("abc.def"));
            }
            other => panic!("unexpected event {other:?}"),
        }
    }

    #[test]
    fn events_serialize_with_type_tag() {
        let event = PipelineEvent::StageChanged {
            index: 2,
            file_name: "b.png".into(),
            from: FileStage::Pending,
            to: FileStage::Extracting,
        };
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["type"], "stage_changed");
        assert_eq!(json["to"], "extracting");
    }
}
