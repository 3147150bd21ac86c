//! Batch orchestration for Docket.
//!
//! Loads uploaded files, runs each through the configured extractor and
//! classifier, and returns one [`ResultRow`](docket_core::ResultRow) per file.

use std::sync::Arc;

use docket_classifier::build_classifier;
use docket_config::Settings;
use docket_core::{DocketError, TextExtractor};
use docket_understanding::{DocumentIntelligenceClient, build_extractor};
use tracing::info;

pub mod intake;
pub mod orchestrator;

pub use intake::{Intake, detect_format, read_upload, read_uploads};
pub use orchestrator::BatchOrchestrator;

/// Document Intelligence client configured from settings.
pub fn intelligence_client(settings: &Settings) -> Arc<DocumentIntelligenceClient> {
    let di = &settings.document_intelligence;
    Arc::new(
        DocumentIntelligenceClient::new(di.endpoint.clone(), di.api_key.clone())
            .with_api_version(di.api_version.clone())
            .with_read_model(di.read_model.clone())
            .with_polling(di.poll_interval, di.max_poll_attempts),
    )
}

/// Extractor for the configured profile, OCR-ing through Document Intelligence.
pub fn extractor_from_settings(settings: &Settings) -> Arc<dyn TextExtractor> {
    build_extractor(settings.extraction, intelligence_client(settings))
}

/// Wire the concrete extractor and classifier named by `settings`.
pub fn build_orchestrator(settings: &Settings) -> Result<BatchOrchestrator, DocketError> {
    let client = intelligence_client(settings);
    let extractor = build_extractor(settings.extraction, client.clone());
    let classifier = build_classifier(settings, client)?;

    info!(
        extractor = extractor.name(),
        classifier = classifier.name(),
        concurrency = settings.concurrency,
        "Pipeline ready"
    );
    Ok(BatchOrchestrator::new(extractor, classifier).with_concurrency(settings.concurrency))
}
