//! Typed, validated runtime settings.
//!
//! Built once at process start from a defaulted and validated `DocketConfig`
//! and passed by reference into the extractor and classifier constructors.

use std::path::PathBuf;
use std::time::Duration;

use docket_core::{ClassifierStrategy, ExtractionProfile, IngestionMode, LabelPolicy};

use crate::defaults::{
    DEFAULT_CONCURRENCY, DEFAULT_DI_API_VERSION, DEFAULT_LOG_LEVEL, DEFAULT_MAX_POLL_ATTEMPTS,
    DEFAULT_POLL_INTERVAL_MS, DEFAULT_READ_MODEL,
};
use crate::schema::DocketConfig;
use crate::validation::ConfigValidationError;

#[derive(Debug, Clone)]
pub struct DocumentIntelligenceSettings {
    pub endpoint: String,
    pub api_key: String,
    pub api_version: String,
    pub read_model: String,
    pub poll_interval: Duration,
    pub max_poll_attempts: u32,
}

#[derive(Debug, Clone)]
pub struct ClassifierSettings {
    pub strategy: ClassifierStrategy,
    pub classifier_id: Option<String>,
    pub ingestion: IngestionMode,
    pub labels: LabelPolicy,
}

#[derive(Debug, Clone)]
pub struct ChatSettings {
    pub endpoint: String,
    pub api_key: String,
    pub model: String,
    pub api_version: Option<String>,
    pub max_tokens: Option<u32>,
}

#[derive(Debug, Clone)]
pub struct LoggingSettings {
    pub level: String,
    pub dir: Option<PathBuf>,
    pub json: bool,
}

#[derive(Debug, Clone)]
pub struct Settings {
    pub document_intelligence: DocumentIntelligenceSettings,
    pub classifier: ClassifierSettings,
    /// Present when the llm strategy is selected.
    pub chat: Option<ChatSettings>,
    pub extraction: ExtractionProfile,
    pub concurrency: usize,
    pub logging: LoggingSettings,
}

fn require(value: Option<&String>, path: &str) -> Result<String, ConfigValidationError> {
    value
        .map(|v| v.trim())
        .filter(|v| !v.is_empty())
        .map(str::to_string)
        .ok_or_else(|| ConfigValidationError {
            path: path.to_string(),
            message: "value is required".to_string(),
        })
}

impl Settings {
    /// Convert a validated config into typed settings.
    pub fn from_config(config: &DocketConfig) -> Result<Self, ConfigValidationError> {
        let di = config.document_intelligence.clone().unwrap_or_default();
        let document_intelligence = DocumentIntelligenceSettings {
            endpoint: require(di.endpoint.as_ref(), "documentIntelligence.endpoint")?,
            api_key: require(di.api_key.as_ref(), "documentIntelligence.apiKey")?,
            api_version: di
                .api_version
                .unwrap_or_else(|| DEFAULT_DI_API_VERSION.to_string()),
            read_model: di.read_model.unwrap_or_else(|| DEFAULT_READ_MODEL.to_string()),
            poll_interval: Duration::from_millis(
                di.poll_interval_ms.unwrap_or(DEFAULT_POLL_INTERVAL_MS),
            ),
            max_poll_attempts: di.max_poll_attempts.unwrap_or(DEFAULT_MAX_POLL_ATTEMPTS),
        };

        let c = config.classifier.clone().unwrap_or_default();
        let strategy = c.strategy.unwrap_or_default();
        let classifier_id = match strategy {
            ClassifierStrategy::Model => {
                Some(require(c.classifier_id.as_ref(), "classifier.classifierId")?)
            }
            ClassifierStrategy::Llm => c.classifier_id,
        };
        let classifier = ClassifierSettings {
            strategy,
            classifier_id,
            ingestion: c.ingestion.unwrap_or_default(),
            labels: c.labels.unwrap_or_default(),
        };

        let chat = match strategy {
            ClassifierStrategy::Llm => {
                let chat = config.chat.clone().unwrap_or_default();
                Some(ChatSettings {
                    endpoint: require(chat.endpoint.as_ref(), "chat.endpoint")?,
                    api_key: require(chat.api_key.as_ref(), "chat.apiKey")?,
                    model: require(chat.model.as_ref(), "chat.model")?,
                    api_version: chat.api_version.filter(|v| !v.trim().is_empty()),
                    max_tokens: chat.max_tokens,
                })
            }
            ClassifierStrategy::Model => None,
        };

        let logging = config.logging.clone().unwrap_or_default();

        Ok(Self {
            document_intelligence,
            classifier,
            chat,
            extraction: config
                .extraction
                .as_ref()
                .and_then(|e| e.profile)
                .unwrap_or_default(),
            concurrency: config
                .pipeline
                .as_ref()
                .and_then(|p| p.concurrency)
                .unwrap_or(DEFAULT_CONCURRENCY)
                .max(1),
            logging: LoggingSettings {
                level: logging
                    .level
                    .unwrap_or_else(|| DEFAULT_LOG_LEVEL.to_string()),
                dir: logging.dir.map(PathBuf::from),
                json: logging.json.unwrap_or(false),
            },
        })
    }
}
