//! Docket configuration schema.
//!
//! Every field is optional so a partial YAML file, environment overrides, and
//! defaults can be layered before validation turns the result into `Settings`.

use docket_core::{ClassifierStrategy, ExtractionProfile, IngestionMode, LabelPolicy};
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Top-level config
// ---------------------------------------------------------------------------

/// Root configuration for Docket.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocketConfig {
    /// OCR and trained-classifier service
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub document_intelligence: Option<DocumentIntelligenceConfig>,

    /// Classification strategy selection
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub classifier: Option<ClassifierConfig>,

    /// Chat-completion service for the LLM strategy
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub chat: Option<ChatConfig>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extraction: Option<ExtractionConfig>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pipeline: Option<PipelineConfig>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub logging: Option<LoggingConfig>,
}

// ---------------------------------------------------------------------------
// Document Intelligence
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentIntelligenceConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub endpoint: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_version: Option<String>,
    /// Model used for text recognition (normally `prebuilt-read`)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub read_model: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub poll_interval_ms: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_poll_attempts: Option<u32>,
}

// ---------------------------------------------------------------------------
// Classifier
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClassifierConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub strategy: Option<ClassifierStrategy>,
    /// Trained classifier ID (model strategy)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub classifier_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ingestion: Option<IngestionMode>,
    /// Label handling for LLM answers
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub labels: Option<LabelPolicy>,
}

// ---------------------------------------------------------------------------
// Chat
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub endpoint: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
    /// Model or Azure deployment name
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    /// Azure OpenAI API version; absent means an OpenAI-compatible endpoint
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_version: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,
}

// ---------------------------------------------------------------------------
// Extraction / pipeline / logging
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtractionConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub profile: Option<ExtractionProfile>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PipelineConfig {
    /// Files processed at once
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub concurrency: Option<usize>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoggingConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub level: Option<String>,
    /// Directory for rolling NDJSON logs
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dir: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub json: Option<bool>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_partial_yaml() {
        let yaml = r#"
documentIntelligence:
  endpoint: https://example.cognitiveservices.azure.com
  apiKey: ${AZURE_DOCUMENT_INTELLIGENCE_KEY}
classifier:
  strategy: llm
  labels: strict
pipeline:
  concurrency: 4
"#;
        let cfg: DocketConfig = serde_yaml::from_str(yaml).unwrap();
        let di = cfg.document_intelligence.unwrap();
        assert_eq!(di.api_key.as_deref(), Some("${AZURE_DOCUMENT_INTELLIGENCE_KEY}"));
        let classifier = cfg.classifier.unwrap();
        assert_eq!(classifier.strategy, Some(ClassifierStrategy::Llm));
        assert_eq!(classifier.labels, Some(LabelPolicy::Strict));
        assert_eq!(cfg.pipeline.unwrap().concurrency, Some(4));
        assert!(cfg.chat.is_none());
    }

    #[test]
    fn skips_unset_sections_when_serializing() {
        let json = serde_json::to_value(DocketConfig::default()).unwrap();
        assert_eq!(json, serde_json::json!({}));
    }
}
