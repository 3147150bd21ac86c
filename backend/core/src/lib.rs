pub mod error;
pub mod result;
pub mod traits;
pub mod types;

pub use error::DocketError;
pub use result::{
    BatchSummary, ClassificationResult, Confidence, ErrorKind, FileStage, ResultRow,
    ERROR_CATEGORY, JUDGEMENT, NON_JUDGEMENT, NOT_AVAILABLE, UNCLASSIFIED,
};
pub use traits::{
    ClassifiedDocument, ClassifierService, DocumentClassifier, LlmProvider, LlmRequest,
    LlmResponse, OcrDocument, OcrEngine, OcrLine, OcrPage, TextExtractor,
};
pub use types::{
    ClassifierStrategy, DocumentFormat, ExtractionProfile, IngestionMode, LabelPolicy,
    ParseVariantError, UploadedFile,
};
