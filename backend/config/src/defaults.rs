//! Config defaults: applies default values to a parsed config.

use crate::schema::{
    ClassifierConfig, DocketConfig, DocumentIntelligenceConfig, ExtractionConfig, LoggingConfig,
    PipelineConfig,
};

/// Document Intelligence REST API version.
pub const DEFAULT_DI_API_VERSION: &str = "2024-11-30";

/// Prebuilt OCR model.
pub const DEFAULT_READ_MODEL: &str = "prebuilt-read";

/// Wait between operation status polls when the service sends no `Retry-After`.
pub const DEFAULT_POLL_INTERVAL_MS: u64 = 1000;

/// Polls before an operation is abandoned.
pub const DEFAULT_MAX_POLL_ATTEMPTS: u32 = 120;

/// Files processed at once.
pub const DEFAULT_CONCURRENCY: usize = 1;

pub const DEFAULT_LOG_LEVEL: &str = "info";

/// Apply all defaults to a freshly loaded config.
pub fn apply_all_defaults(config: DocketConfig) -> DocketConfig {
    let config = apply_document_intelligence_defaults(config);
    let config = apply_classifier_defaults(config);
    let config = apply_pipeline_defaults(config);
    apply_logging_defaults(config)
}

fn apply_document_intelligence_defaults(mut config: DocketConfig) -> DocketConfig {
    let di = config
        .document_intelligence
        .get_or_insert_with(DocumentIntelligenceConfig::default);
    di.api_version
        .get_or_insert_with(|| DEFAULT_DI_API_VERSION.to_string());
    di.read_model
        .get_or_insert_with(|| DEFAULT_READ_MODEL.to_string());
    di.poll_interval_ms.get_or_insert(DEFAULT_POLL_INTERVAL_MS);
    di.max_poll_attempts.get_or_insert(DEFAULT_MAX_POLL_ATTEMPTS);
    config
}

fn apply_classifier_defaults(mut config: DocketConfig) -> DocketConfig {
    let classifier = config.classifier.get_or_insert_with(ClassifierConfig::default);
    classifier.strategy.get_or_insert_with(Default::default);
    classifier.ingestion.get_or_insert_with(Default::default);
    classifier.labels.get_or_insert_with(Default::default);
    config
}

fn apply_pipeline_defaults(mut config: DocketConfig) -> DocketConfig {
    let extraction = config.extraction.get_or_insert_with(ExtractionConfig::default);
    extraction.profile.get_or_insert_with(Default::default);
    let pipeline = config.pipeline.get_or_insert_with(PipelineConfig::default);
    pipeline.concurrency.get_or_insert(DEFAULT_CONCURRENCY);
    config
}

fn apply_logging_defaults(mut config: DocketConfig) -> DocketConfig {
    let logging = config.logging.get_or_insert_with(LoggingConfig::default);
    logging
        .level
        .get_or_insert_with(|| DEFAULT_LOG_LEVEL.to_string());
    logging.json.get_or_insert(false);
    config
}
