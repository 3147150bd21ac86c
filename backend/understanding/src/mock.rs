//! Mock OCR engine for testing.
//!
//! Answers are keyed by the exact bytes submitted so tests can script a batch
//! of files and embedded images without touching the network.

use std::collections::HashMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use anyhow::{Result, anyhow};
use async_trait::async_trait;
use docket_core::{OcrDocument, OcrEngine, OcrLine, OcrPage};

enum Canned {
    Lines(Vec<String>),
    Failure(String),
}

/// A mock OCR engine that returns preconfigured text per input.
#[derive(Default)]
pub struct MockOcrEngine {
    responses: HashMap<Vec<u8>, Canned>,
    calls: AtomicUsize,
    content_types: Mutex<Vec<String>>,
}

impl MockOcrEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Recognize `content` as a single page with the given lines.
    pub fn with_lines(mut self, content: impl Into<Vec<u8>>, lines: &[&str]) -> Self {
        self.responses.insert(
            content.into(),
            Canned::Lines(lines.iter().map(|l| l.to_string()).collect()),
        );
        self
    }

    /// Fail whenever `content` is submitted.
    pub fn with_failure(mut self, content: impl Into<Vec<u8>>, message: impl Into<String>) -> Self {
        self.responses
            .insert(content.into(), Canned::Failure(message.into()));
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Content types seen, in call order.
    pub fn content_types(&self) -> Vec<String> {
        self.content_types
            .lock()
            .map(|seen| seen.clone())
            .unwrap_or_default()
    }
}

#[async_trait]
impl OcrEngine for MockOcrEngine {
    fn name(&self) -> &str {
        "mock"
    }

    async fn read(&self, content: &[u8], content_type: &str) -> Result<OcrDocument> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Ok(mut seen) = self.content_types.lock() {
            seen.push(content_type.to_string());
        }

        match self.responses.get(content) {
            Some(Canned::Lines(lines)) => Ok(OcrDocument {
                pages: vec![OcrPage {
                    page_number: 1,
                    lines: lines
                        .iter()
                        .map(|l| OcrLine {
                            content: l.clone(),
                            polygon: Vec::new(),
                        })
                        .collect(),
                }],
            }),
            Some(Canned::Failure(message)) => Err(anyhow!("{message}")),
            None => Err(anyhow!("no canned OCR response for {} bytes", content.len())),
        }
    }
}
