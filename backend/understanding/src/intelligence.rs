//! Azure AI Document Intelligence REST client.
//!
//! Both the `prebuilt-read` OCR model and trained document classifiers use the
//! same long-running operation protocol: `POST ...:analyze` answers `202` with an
//! `Operation-Location` header, which is polled until the status is terminal.
use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use reqwest::header::{CONTENT_TYPE, HeaderMap, RETRY_AFTER};
use serde::Deserialize;
use tracing::{debug, info};

use docket_core::{
    ClassifiedDocument, ClassifierService, DocketError, OcrDocument, OcrEngine, OcrLine, OcrPage,
};

pub const SERVICE_NAME: &str = "document-intelligence";
const KEY_HEADER: &str = "Ocp-Apim-Subscription-Key";
const OPERATION_LOCATION: &str = "Operation-Location";

pub struct DocumentIntelligenceClient {
    client: Client,
    endpoint: String,
    api_key: String,
    api_version: String,
    read_model: String,
    poll_interval: Duration,
    max_poll_attempts: u32,
}

impl DocumentIntelligenceClient {
    pub fn new(endpoint: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            endpoint: endpoint.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
            api_version: "2024-11-30".to_string(),
            read_model: "prebuilt-read".to_string(),
            poll_interval: Duration::from_secs(1),
            max_poll_attempts: 120,
        }
    }

    pub fn with_api_version(mut self, version: impl Into<String>) -> Self {
        self.api_version = version.into();
        self
    }

    pub fn with_read_model(mut self, model: impl Into<String>) -> Self {
        self.read_model = model.into();
        self
    }

    pub fn with_polling(mut self, interval: Duration, max_attempts: u32) -> Self {
        self.poll_interval = interval;
        self.max_poll_attempts = max_attempts.max(1);
        self
    }

    fn analyze_url(&self, resource: &str) -> String {
        format!(
            "{}/documentintelligence/{}:analyze?api-version={}",
            self.endpoint, resource, self.api_version
        )
    }

    /// Submit a document and return the operation URL to poll.
    async fn start_analysis(&self, url: &str, content: &[u8], content_type: &str) -> Result<String> {
        debug!(url = %url, bytes = content.len(), content_type = %content_type, "Submitting document");

        let response = self
            .client
            .post(url)
            .header(KEY_HEADER, &self.api_key)
            .header(CONTENT_TYPE, content_type)
            .body(content.to_vec())
            .send()
            .await
            .context("Document Intelligence HTTP request failed")?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(service_error(status.as_u16(), &body).into());
        }

        operation_location(response.headers()).ok_or_else(|| {
            DocketError::OperationFailed {
                service: SERVICE_NAME.to_string(),
                message: format!("response {status} carried no {OPERATION_LOCATION} header"),
            }
            .into()
        })
    }

    /// Poll an operation until it succeeds, fails, or runs out of attempts.
    async fn wait_for_result(&self, operation_url: &str) -> Result<AnalyzeResult> {
        for attempt in 1..=self.max_poll_attempts {
            let response = self
                .client
                .get(operation_url)
                .header(KEY_HEADER, &self.api_key)
                .send()
                .await
                .context("Document Intelligence poll request failed")?;

            let status = response.status();
            let retry_after = retry_after(response.headers());
            if !status.is_success() {
                let body = response.text().await.unwrap_or_default();
                return Err(service_error(status.as_u16(), &body).into());
            }

            let operation: AnalyzeOperation = response
                .json()
                .await
                .context("Failed to parse Document Intelligence operation status")?;

            match operation.outcome()? {
                PollOutcome::Done(result) => {
                    debug!(attempt, "Operation succeeded");
                    return Ok(result);
                }
                PollOutcome::Pending if attempt < self.max_poll_attempts => {
                    tokio::time::sleep(retry_after.unwrap_or(self.poll_interval)).await;
                }
                PollOutcome::Pending => {}
            }
        }

        Err(DocketError::PollTimeout {
            service: SERVICE_NAME.to_string(),
            attempts: self.max_poll_attempts,
        }
        .into())
    }
}

#[async_trait]
impl OcrEngine for DocumentIntelligenceClient {
    fn name(&self) -> &str {
        SERVICE_NAME
    }

    async fn read(&self, content: &[u8], content_type: &str) -> Result<OcrDocument> {
        let url = self.analyze_url(&format!("documentModels/{}", self.read_model));
        let operation = self.start_analysis(&url, content, content_type).await?;
        let result = self.wait_for_result(&operation).await?;
        let document = result.into_ocr_document();
        info!(
            pages = document.pages.len(),
            lines = document.line_count(),
            "OCR completed"
        );
        Ok(document)
    }
}

#[async_trait]
impl ClassifierService for DocumentIntelligenceClient {
    fn name(&self) -> &str {
        SERVICE_NAME
    }

    async fn classify(
        &self,
        classifier_id: &str,
        content: &[u8],
        content_type: &str,
    ) -> Result<Vec<ClassifiedDocument>> {
        let url = self.analyze_url(&format!("documentClassifiers/{classifier_id}"));
        let operation = self.start_analysis(&url, content, content_type).await?;
        let result = self.wait_for_result(&operation).await?;
        info!(
            classifier = %classifier_id,
            documents = result.documents.len(),
            "Classification completed"
        );
        Ok(result.into_classified_documents())
    }
}

fn operation_location(headers: &HeaderMap) -> Option<String> {
    headers
        .get(OPERATION_LOCATION)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string)
}

fn retry_after(headers: &HeaderMap) -> Option<Duration> {
    headers
        .get(RETRY_AFTER)
        .and_then(|v| v.to_str().ok())
        .and_then(|s| s.trim().parse::<u64>().ok())
        .map(Duration::from_secs)
}

fn service_error(status: u16, body: &str) -> DocketError {
    let message = serde_json::from_str::<ErrorEnvelope>(body)
        .ok()
        .map(|e| e.error.to_string())
        .unwrap_or_else(|| body.trim().to_string());
    DocketError::Service {
        service: SERVICE_NAME.to_string(),
        status,
        message,
    }
}

// ---------------------------------------------------------------------------
// Wire types
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ServiceErrorBody,
}

#[derive(Debug, Default, Deserialize)]
struct ServiceErrorBody {
    #[serde(default)]
    code: Option<String>,
    #[serde(default)]
    message: Option<String>,
}

impl std::fmt::Display for ServiceErrorBody {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match (&self.code, &self.message) {
            (Some(code), Some(message)) => write!(f, "{code}: {message}"),
            (None, Some(message)) => f.write_str(message),
            (Some(code), None) => f.write_str(code),
            (None, None) => f.write_str("unknown error"),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AnalyzeOperation {
    status: String,
    #[serde(default)]
    analyze_result: Option<AnalyzeResult>,
    #[serde(default)]
    error: Option<ServiceErrorBody>,
}

enum PollOutcome {
    Pending,
    Done(AnalyzeResult),
}

impl AnalyzeOperation {
    fn outcome(self) -> Result<PollOutcome, DocketError> {
        match self.status.as_str() {
            "succeeded" => Ok(PollOutcome::Done(self.analyze_result.unwrap_or_default())),
            "failed" | "canceled" => Err(DocketError::OperationFailed {
                service: SERVICE_NAME.to_string(),
                message: self
                    .error
                    .map(|e| e.to_string())
                    .unwrap_or_else(|| format!("operation {}", self.status)),
            }),
            _ => Ok(PollOutcome::Pending),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AnalyzeResult {
    #[serde(default)]
    pages: Vec<PageWire>,
    #[serde(default)]
    documents: Vec<DocumentWire>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PageWire {
    page_number: u32,
    #[serde(default)]
    lines: Vec<LineWire>,
}

#[derive(Debug, Deserialize)]
struct LineWire {
    content: String,
    #[serde(default)]
    polygon: Vec<f32>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct DocumentWire {
    doc_type: String,
    #[serde(default)]
    confidence: f64,
}

impl AnalyzeResult {
    fn into_ocr_document(self) -> OcrDocument {
        let mut pages: Vec<OcrPage> = self
            .pages
            .into_iter()
            .map(|p| OcrPage {
                page_number: p.page_number,
                lines: p
                    .lines
                    .into_iter()
                    .map(|l| OcrLine {
                        content: l.content,
                        polygon: l.polygon,
                    })
                    .collect(),
            })
            .collect();
        pages.sort_by_key(|p| p.page_number);
        OcrDocument { pages }
    }

    fn into_classified_documents(self) -> Vec<ClassifiedDocument> {
        self.documents
            .into_iter()
            .map(|d| ClassifiedDocument {
                doc_type: d.doc_type,
                confidence: d.confidence,
            })
            .collect()
    }
}
