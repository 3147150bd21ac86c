use std::sync::Arc;

use anyhow::{Context, Result};
use async_trait::async_trait;
use tracing::{debug, info};

use docket_core::{
    ClassificationResult, Confidence, DocumentClassifier, LabelPolicy, LlmProvider, LlmRequest,
    UploadedFile,
};

use crate::labels::apply_policy;
use crate::prompt::PromptBuilder;

/// Decoding temperature for every classification request.
pub const CLASSIFICATION_TEMPERATURE: f32 = 0.0;

/// Classifier that asks a chat model for the label.
pub struct LlmClassifier {
    provider: Arc<dyn LlmProvider>,
    model: String,
    max_tokens: Option<u32>,
    labels: LabelPolicy,
    system_prompt: String,
}

impl LlmClassifier {
    pub fn new(provider: Arc<dyn LlmProvider>, model: impl Into<String>) -> Self {
        Self {
            provider,
            model: model.into(),
            max_tokens: None,
            labels: LabelPolicy::default(),
            system_prompt: PromptBuilder::build(),
        }
    }

    pub fn with_max_tokens(mut self, max_tokens: Option<u32>) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    pub fn with_label_policy(mut self, labels: LabelPolicy) -> Self {
        self.labels = labels;
        self
    }
}

#[async_trait]
impl DocumentClassifier for LlmClassifier {
    fn name(&self) -> &str {
        "llm"
    }

    async fn classify(&self, file: &UploadedFile, text: &str) -> Result<ClassificationResult> {
        let request = LlmRequest {
            model: self.model.clone(),
            system_prompt: self.system_prompt.clone(),
            user_prompt: text.to_string(),
            max_tokens: self.max_tokens,
            temperature: CLASSIFICATION_TEMPERATURE,
        };
        debug!(file = %file.name, chars = text.len(), model = %self.model, "Asking chat model");

        let response = self
            .provider
            .complete(&request)
            .await
            .with_context(|| format!("{} completion failed", self.provider.name()))?;

        let category = apply_policy(self.labels, &response.content);
        info!(
            file = %file.name,
            category = %category,
            tokens = response.tokens_used,
            latency_ms = response.latency_ms,
            "LLM classification"
        );
        Ok(ClassificationResult::new(category, Confidence::NotAvailable))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::providers::mock::MockProvider;
    use docket_core::{DocumentFormat, UNCLASSIFIED};

    fn file() -> UploadedFile {
        UploadedFile::new("a.pdf", b"%PDF".to_vec(), DocumentFormat::Pdf)
    }

    #[tokio::test]
    async fn sends_text_as_sole_user_turn_at_temperature_zero() {
        let provider = Arc::new(MockProvider::new("mock").with_response("Judgement"));
        let classifier = LlmClassifier::new(provider.clone(), "gpt-4o");

        classifier.classify(&file(), "FINAL JUDGMENT\nCase No. 1").await.unwrap();

        let requests = provider.requests();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].temperature, 0.0);
        assert_eq!(requests[0].model, "gpt-4o");
        assert_eq!(requests[0].user_prompt, "FINAL JUDGMENT\nCase No. 1");
        assert!(requests[0].system_prompt.contains("STIPULATION"));
    }

    #[tokio::test]
    async fn trims_and_passes_answer_through() {
        let provider = Arc::new(MockProvider::new("mock").with_response("  Non-Judgement\n"));
        let classifier = LlmClassifier::new(provider, "m");

        let result = classifier.classify(&file(), "MOTION TO DISMISS").await.unwrap();
        assert_eq!(result.category, "Non-Judgement");
        assert_eq!(result.confidence, Confidence::NotAvailable);
        assert_eq!(result.confidence.to_string(), "N/A");
    }

    #[tokio::test]
    async fn verbatim_policy_keeps_off_taxonomy_answers() {
        let provider = Arc::new(MockProvider::new("mock").with_response("Probably a motion"));
        let classifier = LlmClassifier::new(provider, "m");

        let result = classifier.classify(&file(), "text").await.unwrap();
        assert_eq!(result.category, "Probably a motion");
    }

    #[tokio::test]
    async fn strict_policy_normalizes_answers() {
        let provider = Arc::new(MockProvider::new("mock").with_response("Probably a motion"));
        let classifier = LlmClassifier::new(provider, "m").with_label_policy(LabelPolicy::Strict);

        let result = classifier.classify(&file(), "text").await.unwrap();
        assert_eq!(result.category, UNCLASSIFIED);
    }

    #[tokio::test]
    async fn provider_failure_propagates() {
        let provider = Arc::new(MockProvider::new("mock").with_failure("rate limited"));
        let classifier = LlmClassifier::new(provider, "m");

        let err = classifier.classify(&file(), "text").await.unwrap_err();
        assert!(format!("{err:#}").contains("rate limited"));
    }
}
