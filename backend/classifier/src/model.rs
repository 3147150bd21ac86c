use std::sync::Arc;

use anyhow::{Context, Result};
use async_trait::async_trait;
use tracing::{debug, info};

use docket_core::{
    ClassificationResult, ClassifierService, Confidence, DocumentClassifier, IngestionMode,
    UploadedFile,
};

/// Classifier backed by a trained external document-classification model.
pub struct ModelClassifier {
    service: Arc<dyn ClassifierService>,
    classifier_id: String,
    ingestion: IngestionMode,
}

impl ModelClassifier {
    pub fn new(service: Arc<dyn ClassifierService>, classifier_id: impl Into<String>) -> Self {
        Self {
            service,
            classifier_id: classifier_id.into(),
            ingestion: IngestionMode::default(),
        }
    }

    pub fn with_ingestion(mut self, ingestion: IngestionMode) -> Self {
        self.ingestion = ingestion;
        self
    }
}

#[async_trait]
impl DocumentClassifier for ModelClassifier {
    fn name(&self) -> &str {
        "model"
    }

    async fn classify(&self, file: &UploadedFile, text: &str) -> Result<ClassificationResult> {
        let (content, content_type): (&[u8], &str) = match self.ingestion {
            IngestionMode::RawBytes => (&file.bytes[..], file.format.mime_type()),
            IngestionMode::ExtractedText => (text.as_bytes(), "text/plain"),
        };
        debug!(
            file = %file.name,
            classifier = %self.classifier_id,
            content_type = %content_type,
            "Submitting to document classifier"
        );

        let documents = self
            .service
            .classify(&self.classifier_id, content, content_type)
            .await
            .with_context(|| format!("{} classifier '{}' failed", self.service.name(), self.classifier_id))?;

        let Some(top) = documents.into_iter().next() else {
            info!(file = %file.name, "Classifier returned no documents");
            return Ok(ClassificationResult::unclassified());
        };
        Ok(ClassificationResult::new(
            top.doc_type,
            Confidence::Score(top.confidence),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::anyhow;
    use docket_core::{ClassifiedDocument, DocumentFormat, UNCLASSIFIED};
    use std::sync::Mutex;

    #[derive(Default)]
    struct StubService {
        documents: Vec<ClassifiedDocument>,
        fail: bool,
        seen: Mutex<Vec<(String, Vec<u8>, String)>>,
    }

    #[async_trait]
    impl ClassifierService for StubService {
        fn name(&self) -> &str {
            "stub"
        }

        async fn classify(
            &self,
            classifier_id: &str,
            content: &[u8],
            content_type: &str,
        ) -> Result<Vec<ClassifiedDocument>> {
            self.seen.lock().unwrap().push((
                classifier_id.to_string(),
                content.to_vec(),
                content_type.to_string(),
            ));
            if self.fail {
                return Err(anyhow!("service unavailable"));
            }
            Ok(self.documents.clone())
        }
    }

    fn pdf() -> UploadedFile {
        UploadedFile::new("order.pdf", b"%PDF-1.4 bytes".to_vec(), DocumentFormat::Pdf)
    }

    #[tokio::test]
    async fn first_document_wins_with_percentage_confidence() {
        let service = Arc::new(StubService {
            documents: vec![
                ClassifiedDocument { doc_type: "Judgement".into(), confidence: 0.873 },
                ClassifiedDocument { doc_type: "Non-Judgement".into(), confidence: 0.1 },
            ],
            ..Default::default()
        });
        let classifier = ModelClassifier::new(service, "judgements-v2");

        let result = classifier.classify(&pdf(), "FINAL JUDGMENT").await.unwrap();
        assert_eq!(result.category, "Judgement");
        assert_eq!(result.confidence.to_string(), "87.30%");
    }

    #[tokio::test]
    async fn no_documents_is_unclassified() {
        let service = Arc::new(StubService::default());
        let classifier = ModelClassifier::new(service, "judgements-v2");

        let result = classifier.classify(&pdf(), "text").await.unwrap();
        assert_eq!(result.category, UNCLASSIFIED);
        assert_eq!(result.confidence.to_string(), "N/A");
    }

    #[tokio::test]
    async fn raw_bytes_ingestion_sends_file_content() {
        let service = Arc::new(StubService::default());
        let classifier = ModelClassifier::new(service.clone(), "cls");

        classifier.classify(&pdf(), "ignored").await.unwrap();
        let seen = service.seen.lock().unwrap();
        assert_eq!(seen[0].0, "cls");
        assert_eq!(seen[0].1, b"%PDF-1.4 bytes");
        assert_eq!(seen[0].2, "application/pdf");
    }

    #[tokio::test]
    async fn extracted_text_ingestion_sends_plain_text() {
        let service = Arc::new(StubService::default());
        let classifier = ModelClassifier::new(service.clone(), "cls")
            .with_ingestion(IngestionMode::ExtractedText);

        classifier.classify(&pdf(), "FINAL JUDGMENT").await.unwrap();
        let seen = service.seen.lock().unwrap();
        assert_eq!(seen[0].1, b"FINAL JUDGMENT");
        assert_eq!(seen[0].2, "text/plain");
    }

    #[tokio::test]
    async fn service_errors_propagate() {
        let service = Arc::new(StubService {
            fail: true,
            ..Default::default()
        });
        let classifier = ModelClassifier::new(service, "cls");

        let err = classifier.classify(&pdf(), "x").await.unwrap_err();
        let chain = format!("{err:#}");
        assert!(chain.contains("stub classifier 'cls' failed"));
        assert!(chain.contains("service unavailable"));
    }
}
