//! Text extraction for Docket: OCR through Azure Document Intelligence plus
//! native `.docx` parsing with OCR of embedded images.

pub mod doc_parse;
pub mod intelligence;
pub mod mock;
pub mod ocr;

use std::sync::Arc;

use docket_core::{ExtractionProfile, OcrEngine, TextExtractor};

pub use doc_parse::{DocxContent, EmbeddedImage, OfficeExtractor, extract_paragraphs, parse_docx};
pub use intelligence::DocumentIntelligenceClient;
pub use mock::MockOcrEngine;
pub use ocr::OcrExtractor;

/// Build the extractor for a profile on top of a shared OCR engine.
pub fn build_extractor(profile: ExtractionProfile, engine: Arc<dyn OcrEngine>) -> Arc<dyn TextExtractor> {
    let ocr = OcrExtractor::new(engine);
    match profile {
        ExtractionProfile::Ocr => Arc::new(ocr),
        ExtractionProfile::Office => Arc::new(OfficeExtractor::new(ocr)),
    }
}
