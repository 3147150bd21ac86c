//! Config validation: deep schema checks with user-friendly error messages.

use docket_core::ClassifierStrategy;
use thiserror::Error;

use crate::schema::DocketConfig;

/// A config validation error with field path and message.
#[derive(Debug, Error)]
#[error("Config validation error at '{path}': {message}")]
pub struct ConfigValidationError {
    pub path: String,
    pub message: String,
}

/// A collection of validation errors found in one pass.
#[derive(Debug, Default)]
pub struct ValidationReport {
    pub errors: Vec<ConfigValidationError>,
    pub warnings: Vec<ConfigValidationError>,
}

impl ValidationReport {
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    fn error(&mut self, path: impl Into<String>, message: impl Into<String>) {
        self.errors.push(ConfigValidationError {
            path: path.into(),
            message: message.into(),
        });
    }

    fn warn(&mut self, path: impl Into<String>, message: impl Into<String>) {
        self.warnings.push(ConfigValidationError {
            path: path.into(),
            message: message.into(),
        });
    }

    /// One line per error, for startup failure messages.
    pub fn error_summary(&self) -> String {
        self.errors
            .iter()
            .map(|e| format!("{}: {}", e.path, e.message))
            .collect::<Vec<_>>()
            .join("; ")
    }
}

/// Validate the config and return a report of all errors and warnings.
pub fn validate(config: &DocketConfig) -> ValidationReport {
    let mut report = ValidationReport::default();
    validate_document_intelligence(config, &mut report);
    validate_classifier(config, &mut report);
    validate_pipeline(config, &mut report);
    report
}

fn is_blank(value: Option<&String>) -> bool {
    value.map(|v| v.trim().is_empty()).unwrap_or(true)
}

fn validate_endpoint(report: &mut ValidationReport, path: &str, endpoint: &str) {
    match url::Url::parse(endpoint) {
        Ok(url) if matches!(url.scheme(), "http" | "https") => {
            if url.scheme() == "http" {
                report.warn(path, "Endpoint is not using https; credentials are sent in clear");
            }
        }
        Ok(url) => report.error(path, format!("Unsupported URL scheme '{}'", url.scheme())),
        Err(e) => report.error(path, format!("Invalid URL '{endpoint}': {e}")),
    }
}

/// OCR credentials are required by every pipeline variant.
fn validate_document_intelligence(config: &DocketConfig, report: &mut ValidationReport) {
    let di = config.document_intelligence.as_ref();
    match di.and_then(|d| d.endpoint.as_ref()) {
        Some(endpoint) if !endpoint.trim().is_empty() => {
            validate_endpoint(report, "documentIntelligence.endpoint", endpoint)
        }
        _ => report.error("documentIntelligence.endpoint", "Document Intelligence endpoint is required"),
    }
    if is_blank(di.and_then(|d| d.api_key.as_ref())) {
        report.error("documentIntelligence.apiKey", "Document Intelligence key is required");
    }
    if let Some(0) = di.and_then(|d| d.max_poll_attempts) {
        report.error("documentIntelligence.maxPollAttempts", "maxPollAttempts must be >= 1");
    }
}

/// Strategy-specific requirements.
fn validate_classifier(config: &DocketConfig, report: &mut ValidationReport) {
    let classifier = config.classifier.as_ref();
    let strategy = classifier.and_then(|c| c.strategy).unwrap_or_default();

    match strategy {
        ClassifierStrategy::Model => {
            if is_blank(classifier.and_then(|c| c.classifier_id.as_ref())) {
                report.error(
                    "classifier.classifierId",
                    "A trained classifier ID is required for the model strategy",
                );
            }
            if config.chat.is_some() {
                report.warn("chat", "Chat settings are ignored by the model strategy");
            }
        }
        ClassifierStrategy::Llm => {
            let chat = config.chat.as_ref();
            match chat.and_then(|c| c.endpoint.as_ref()) {
                Some(endpoint) if !endpoint.trim().is_empty() => {
                    validate_endpoint(report, "chat.endpoint", endpoint)
                }
                _ => report.error("chat.endpoint", "Chat endpoint is required for the llm strategy"),
            }
            if is_blank(chat.and_then(|c| c.api_key.as_ref())) {
                report.error("chat.apiKey", "Chat API key is required for the llm strategy");
            }
            if is_blank(chat.and_then(|c| c.model.as_ref())) {
                report.error("chat.model", "Chat model or deployment is required for the llm strategy");
            }
        }
    }
}

fn validate_pipeline(config: &DocketConfig, report: &mut ValidationReport) {
    let Some(pipeline) = &config.pipeline else { return };
    match pipeline.concurrency {
        Some(0) => report.error("pipeline.concurrency", "concurrency must be >= 1"),
        Some(n) if n > 16 => report.warn(
            "pipeline.concurrency",
            format!("concurrency {n} is likely to hit service rate limits"),
        ),
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{ChatConfig, ClassifierConfig, DocumentIntelligenceConfig, PipelineConfig};

    fn base() -> DocketConfig {
        DocketConfig {
            document_intelligence: Some(DocumentIntelligenceConfig {
                endpoint: Some("https://di.example.com".into()),
                api_key: Some("key".into()),
                ..Default::default()
            }),
            classifier: Some(ClassifierConfig {
                classifier_id: Some("judgement-classifier".into()),
                ..Default::default()
            }),
            ..Default::default()
        }
    }

    #[test]
    fn complete_model_config_is_valid() {
        let report = validate(&base());
        assert!(report.is_valid(), "errors: {:?}", report.errors);
    }

    #[test]
    fn empty_config_reports_missing_credentials() {
        let report = validate(&DocketConfig::default());
        let paths: Vec<_> = report.errors.iter().map(|e| e.path.as_str()).collect();
        assert!(paths.contains(&"documentIntelligence.endpoint"));
        assert!(paths.contains(&"documentIntelligence.apiKey"));
        assert!(paths.contains(&"classifier.classifierId"));
    }

    #[test]
    fn llm_strategy_requires_chat() {
        let mut cfg = base();
        cfg.classifier = Some(ClassifierConfig {
            strategy: Some(ClassifierStrategy::Llm),
            ..Default::default()
        });
        let report = validate(&cfg);
        assert!(!report.is_valid());
        assert!(report.errors.iter().any(|e| e.path == "chat.apiKey"));

        cfg.chat = Some(ChatConfig {
            endpoint: Some("https://oai.example.com".into()),
            api_key: Some("k".into()),
            model: Some("gpt-4o".into()),
            ..Default::default()
        });
        assert!(validate(&cfg).is_valid());
    }

    #[test]
    fn rejects_bad_endpoint_and_zero_concurrency() {
        let mut cfg = base();
        cfg.document_intelligence.as_mut().unwrap().endpoint = Some("not a url".into());
        cfg.pipeline = Some(PipelineConfig { concurrency: Some(0) });
        let report = validate(&cfg);
        assert_eq!(report.errors.len(), 2);
        assert!(report.error_summary().contains("pipeline.concurrency"));
    }
}
