use anyhow::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::result::ClassificationResult;
use crate::types::{DocumentFormat, UploadedFile};

/// One recognized line of text.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OcrLine {
    pub content: String,
    /// Bounding polygon as reported by the service. Unused by the pipeline.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub polygon: Vec<f32>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OcrPage {
    pub page_number: u32,
    pub lines: Vec<OcrLine>,
}

/// Full OCR output, pages in document order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OcrDocument {
    pub pages: Vec<OcrPage>,
}

impl OcrDocument {
    /// All lines, page order then line order, joined by newline.
    pub fn to_text(&self) -> String {
        self.pages
            .iter()
            .flat_map(|p| p.lines.iter())
            .map(|l| l.content.as_str())
            .collect::<Vec<_>>()
            .join("\n")
    }

    pub fn line_count(&self) -> usize {
        self.pages.iter().map(|p| p.lines.len()).sum()
    }
}

/// External OCR collaborator ("read" mode).
#[async_trait]
pub trait OcrEngine: Send + Sync {
    fn name(&self) -> &str;

    /// Recognize text in a document or single image.
    async fn read(&self, content: &[u8], content_type: &str) -> Result<OcrDocument>;
}

/// A document assigned to a trained category.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassifiedDocument {
    pub doc_type: String,
    pub confidence: f64,
}

/// External pre-trained document classifier.
#[async_trait]
pub trait ClassifierService: Send + Sync {
    fn name(&self) -> &str;

    /// Classify a document with the classifier identified by `classifier_id`.
    /// An empty result means the service could not classify the document.
    async fn classify(
        &self,
        classifier_id: &str,
        content: &[u8],
        content_type: &str,
    ) -> Result<Vec<ClassifiedDocument>>;
}

/// Trait for chat-completion providers.
#[async_trait]
pub trait LlmProvider: Send + Sync {
    /// Provider name (e.g., "azure-openai").
    fn name(&self) -> &str;

    /// Send a completion request and return the response text.
    async fn complete(&self, request: &LlmRequest) -> Result<LlmResponse>;
}

/// Request to an LLM provider.
#[derive(Debug, Clone)]
pub struct LlmRequest {
    pub model: String,
    pub system_prompt: String,
    pub user_prompt: String,
    pub max_tokens: Option<u32>,
    pub temperature: f32,
}

/// Response from an LLM provider.
#[derive(Debug, Clone)]
pub struct LlmResponse {
    pub content: String,
    pub provider: String,
    pub model: String,
    pub tokens_used: u64,
    pub latency_ms: u64,
}

/// Turns an uploaded file into plain text.
#[async_trait]
pub trait TextExtractor: Send + Sync {
    fn name(&self) -> &str;

    fn supports(&self, format: DocumentFormat) -> bool;

    /// Extract text. Empty output is valid and means nothing was recognized.
    async fn extract(&self, file: &UploadedFile) -> Result<String>;
}

/// Maps extracted text (and the uploaded file) to a category.
#[async_trait]
pub trait DocumentClassifier: Send + Sync {
    fn name(&self) -> &str;

    /// Callers must not pass empty text; see `ClassificationResult::unclassified`.
    async fn classify(&self, file: &UploadedFile, text: &str) -> Result<ClassificationResult>;
}
