use std::sync::Arc;
use std::time::Instant;

use futures::stream::{self, StreamExt};
use tracing::{debug, info, warn};
use uuid::Uuid;

use docket_core::{
    BatchSummary, ClassificationResult, DocumentClassifier, ErrorKind, FileStage, ResultRow,
    TextExtractor, UploadedFile,
};
use docket_logging::{EventLogger, PipelineEvent, redact_sensitive_data};

use crate::intake::Intake;

/// Runs extraction then classification for each file of a batch.
pub struct BatchOrchestrator {
    extractor: Arc<dyn TextExtractor>,
    classifier: Arc<dyn DocumentClassifier>,
    concurrency: usize,
}

impl BatchOrchestrator {
    pub fn new(extractor: Arc<dyn TextExtractor>, classifier: Arc<dyn DocumentClassifier>) -> Self {
        Self {
            extractor,
            classifier,
            concurrency: 1,
        }
    }

    /// Maximum files in flight. Zero is treated as one.
    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency.max(1);
        self
    }

    pub fn concurrency(&self) -> usize {
        self.concurrency
    }

    /// Process a batch. Returns exactly one row per input file, in input order;
    /// per-file failures become error rows.
    pub async fn run(&self, files: Vec<UploadedFile>) -> Vec<ResultRow> {
        self.run_inputs(files.into_iter().map(Intake::from).collect()).await
    }

    /// Like [`run`](Self::run), but rejected inputs take their slot as
    /// extraction failures.
    pub async fn run_inputs(&self, inputs: Vec<Intake>) -> Vec<ResultRow> {
        let batch_id = Uuid::new_v4().to_string();
        let started = Instant::now();
        EventLogger::log_event(
            &batch_id,
            PipelineEvent::BatchStarted {
                total: inputs.len(),
                concurrency: self.concurrency,
            },
        );

        let batch = batch_id.as_str();
        let rows: Vec<ResultRow> = stream::iter(inputs.into_iter().enumerate())
            .map(|(index, input)| self.process(batch, index, input))
            .buffered(self.concurrency)
            .collect()
            .await;

        let summary = BatchSummary::from_rows(&rows);
        info!(
            batch_id = %batch_id,
            total = summary.total,
            classified = summary.classified,
            unclassified = summary.unclassified,
            failed = summary.failed,
            "Batch finished"
        );
        EventLogger::log_event(
            &batch_id,
            PipelineEvent::BatchCompleted {
                summary,
                elapsed_ms: started.elapsed().as_millis() as u64,
            },
        );
        rows
    }

    async fn process(&self, batch_id: &str, index: usize, input: Intake) -> ResultRow {
        let mut stage = StageTracker::new(batch_id, index, input.name());

        stage.advance(FileStage::Extracting);
        let file = match input {
            Intake::Ready(file) => file,
            Intake::Rejected { error, .. } => return stage.fail(ErrorKind::Extraction, &error),
        };
        let text = match self.extractor.extract(&file).await {
            Ok(text) => text,
            Err(e) => return stage.fail(ErrorKind::Extraction, &e),
        };

        if text.trim().is_empty() {
            debug!(file = %file.name, "No text extracted, skipping classifier");
            stage.advance(FileStage::Done);
            return ResultRow::classified(file.name, ClassificationResult::unclassified());
        }

        stage.advance(FileStage::Classifying);
        match self.classifier.classify(&file, &text).await {
            Ok(result) => {
                stage.advance(FileStage::Done);
                ResultRow::classified(file.name, result)
            }
            Err(e) => stage.fail(ErrorKind::Classification, &e),
        }
    }
}

/// Per-file lifecycle: emits a pipeline event for every transition.
struct StageTracker<'a> {
    batch_id: &'a str,
    index: usize,
    file_name: String,
    stage: FileStage,
}

impl<'a> StageTracker<'a> {
    fn new(batch_id: &'a str, index: usize, file_name: &str) -> Self {
        Self {
            batch_id,
            index,
            file_name: file_name.to_string(),
            stage: FileStage::Pending,
        }
    }

    fn advance(&mut self, next: FileStage) {
        debug_assert!(
            self.stage.can_transition_to(next),
            "illegal transition {} -> {}",
            self.stage,
            next
        );
        EventLogger::log_event(
            self.batch_id,
            PipelineEvent::StageChanged {
                index: self.index,
                file_name: self.file_name.clone(),
                from: self.stage,
                to: next,
            },
        );
        self.stage = next;
    }

    fn fail(mut self, kind: ErrorKind, error: &anyhow::Error) -> ResultRow {
        let message = redact_sensitive_data(&format!("{error:#}"));
        warn!(file = %self.file_name, kind = ?kind, error = %message, "File failed");
        self.advance(FileStage::Failed);
        EventLogger::log_event(
            self.batch_id,
            PipelineEvent::FileFailed {
                index: self.index,
                file_name: self.file_name.clone(),
                kind,
                error_msg: message.clone(),
            },
        );
        ResultRow::failed(self.file_name, kind, message)
    }
}
