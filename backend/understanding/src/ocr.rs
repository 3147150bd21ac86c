//! Optical Character Recognition (OCR)
//!
//! Turns PDFs and raster images into plain text by handing them to an
//! [`OcrEngine`] and flattening the recognized lines in reading order.

use std::sync::Arc;

use anyhow::{Context, Result};
use async_trait::async_trait;
use docket_core::{DocketError, DocumentFormat, OcrEngine, TextExtractor, UploadedFile};
use tracing::debug;

#[derive(Clone)]
pub struct OcrExtractor {
    engine: Arc<dyn OcrEngine>,
}

impl OcrExtractor {
    pub fn new(engine: Arc<dyn OcrEngine>) -> Self {
        Self { engine }
    }

    /// OCR raw bytes and join every recognized line with `\n`.
    pub async fn ocr_text(&self, content: &[u8], content_type: &str) -> Result<String> {
        let document = self
            .engine
            .read(content, content_type)
            .await
            .with_context(|| format!("{} OCR failed", self.engine.name()))?;
        debug!(lines = document.line_count(), content_type = %content_type, "OCR text assembled");
        Ok(document.to_text())
    }
}

#[async_trait]
impl TextExtractor for OcrExtractor {
    fn name(&self) -> &str {
        "ocr"
    }

    fn supports(&self, format: DocumentFormat) -> bool {
        format.is_image_bearing()
    }

    async fn extract(&self, file: &UploadedFile) -> Result<String> {
        if !self.supports(file.format) {
            return Err(DocketError::UnsupportedFormat(format!(
                "{} ({}) needs the office extraction profile",
                file.name, file.format
            ))
            .into());
        }
        self.ocr_text(&file.bytes, file.format.mime_type()).await
    }
}
