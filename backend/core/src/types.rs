use std::fmt;
use std::path::Path;
use std::str::FromStr;

use bytes::Bytes;
use serde::{Deserialize, Serialize};

/// Input formats accepted by the pipeline.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum DocumentFormat {
    Pdf,
    Png,
    Jpeg,
    Docx,
}

const PNG_SIGNATURE: &[u8] = &[0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A];
const JPEG_SOI: &[u8] = &[0xFF, 0xD8, 0xFF];
const ZIP_SIGNATURE: &[u8] = &[0x50, 0x4B, 0x03, 0x04];
/// Zip entry names are stored uncompressed, so the part name shows up verbatim.
const DOCX_MAIN_PART: &[u8] = b"word/document.xml";

impl DocumentFormat {
    /// Map a file extension (case-insensitive, without the dot).
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_ascii_lowercase().as_str() {
            "pdf" => Some(Self::Pdf),
            "png" => Some(Self::Png),
            "jpg" | "jpeg" => Some(Self::Jpeg),
            "docx" => Some(Self::Docx),
            _ => None,
        }
    }

    pub fn from_path(path: &Path) -> Option<Self> {
        path.extension()
            .and_then(|e| e.to_str())
            .and_then(Self::from_extension)
    }

    /// Detect the format from leading magic bytes.
    ///
    /// A zip container only counts as docx when it names a
    /// `word/document.xml` entry.
    pub fn sniff(bytes: &[u8]) -> Option<Self> {
        if bytes.starts_with(b"%PDF") {
            Some(Self::Pdf)
        } else if bytes.starts_with(PNG_SIGNATURE) {
            Some(Self::Png)
        } else if bytes.starts_with(JPEG_SOI) {
            Some(Self::Jpeg)
        } else if bytes.starts_with(ZIP_SIGNATURE)
            && bytes.windows(DOCX_MAIN_PART.len()).any(|w| w == DOCX_MAIN_PART)
        {
            Some(Self::Docx)
        } else {
            None
        }
    }

    pub fn mime_type(&self) -> &'static str {
        match self {
            Self::Pdf => "application/pdf",
            Self::Png => "image/png",
            Self::Jpeg => "image/jpeg",
            Self::Docx => {
                "application/vnd.openxmlformats-officedocument.wordprocessingml.document"
            }
        }
    }

    /// Whether the OCR collaborator can read this format directly.
    pub fn is_image_bearing(&self) -> bool {
        matches!(self, Self::Pdf | Self::Png | Self::Jpeg)
    }
}

impl fmt::Display for DocumentFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Pdf => "pdf",
            Self::Png => "png",
            Self::Jpeg => "jpeg",
            Self::Docx => "docx",
        };
        f.write_str(s)
    }
}

/// A file handed to the pipeline by the upload surface.
#[derive(Debug, Clone)]
pub struct UploadedFile {
    pub name: String,
    pub bytes: Bytes,
    pub format: DocumentFormat,
}

impl UploadedFile {
    pub fn new(name: impl Into<String>, bytes: impl Into<Bytes>, format: DocumentFormat) -> Self {
        Self {
            name: name.into(),
            bytes: bytes.into(),
            format,
        }
    }
}

/// Which classification strategy the pipeline is wired with.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "kebab-case")]
pub enum ClassifierStrategy {
    /// Pre-trained external document classifier.
    #[default]
    Model,
    /// Chat-completion model prompted with classification heuristics.
    Llm,
}

/// Which formats the extractor accepts.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "kebab-case")]
pub enum ExtractionProfile {
    /// PDF and raster images only.
    Ocr,
    /// PDF, raster images, and docx with embedded images.
    #[default]
    Office,
}

/// What the model-based classifier submits to the external classifier.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "kebab-case")]
pub enum IngestionMode {
    #[default]
    RawBytes,
    ExtractedText,
}

/// How free-text LLM answers become categories.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "kebab-case")]
pub enum LabelPolicy {
    #[default]
    Verbatim,
    Strict,
}

/// Error for a string that names no known variant.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown {kind} '{value}' (expected one of: {expected})")]
pub struct ParseVariantError {
    pub kind: &'static str,
    pub value: String,
    pub expected: &'static str,
}

macro_rules! impl_from_str {
    ($ty:ty, $kind:literal, $expected:literal, { $($s:literal => $v:expr),+ $(,)? }) => {
        impl FromStr for $ty {
            type Err = ParseVariantError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s.trim().to_ascii_lowercase().as_str() {
                    $($s => Ok($v),)+
                    other => Err(ParseVariantError {
                        kind: $kind,
                        value: other.to_string(),
                        expected: $expected,
                    }),
                }
            }
        }
    };
}

impl_from_str!(ClassifierStrategy, "classifier strategy", "model, llm", {
    "model" => ClassifierStrategy::Model,
    "llm" => ClassifierStrategy::Llm,
});

impl_from_str!(ExtractionProfile, "extraction profile", "ocr, office", {
    "ocr" => ExtractionProfile::Ocr,
    "office" => ExtractionProfile::Office,
});

impl_from_str!(IngestionMode, "ingestion mode", "raw-bytes, extracted-text", {
    "raw-bytes" => IngestionMode::RawBytes,
    "extracted-text" => IngestionMode::ExtractedText,
});

impl_from_str!(LabelPolicy, "label policy", "verbatim, strict", {
    "verbatim" => LabelPolicy::Verbatim,
    "strict" => LabelPolicy::Strict,
});

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn detects_format_from_extension() {
        assert_eq!(
            DocumentFormat::from_path(&PathBuf::from("ruling.PDF")),
            Some(DocumentFormat::Pdf)
        );
        assert_eq!(
            DocumentFormat::from_path(&PathBuf::from("scan.jpg")),
            Some(DocumentFormat::Jpeg)
        );
        assert_eq!(DocumentFormat::from_path(&PathBuf::from("notes.txt")), None);
    }

    #[test]
    fn sniffs_magic_bytes() {
        assert_eq!(DocumentFormat::sniff(b"%PDF-1.7\n"), Some(DocumentFormat::Pdf));
        assert_eq!(
            DocumentFormat::sniff(&[0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A, 0]),
            Some(DocumentFormat::Png)
        );
        assert_eq!(
            DocumentFormat::sniff(&[0xFF, 0xD8, 0xFF, 0xE0]),
            Some(DocumentFormat::Jpeg)
        );
        assert_eq!(DocumentFormat::sniff(b"plain text"), None);
    }

    #[test]
    fn only_word_containers_sniff_as_docx() {
        let mut docx = b"PK\x03\x04\x14\x00\x00\x00".to_vec();
        docx.extend_from_slice(b"[Content_Types].xml....word/document.xml<w:document/>");
        assert_eq!(DocumentFormat::sniff(&docx), Some(DocumentFormat::Docx));

        let mut other = b"PK\x03\x04\x14\x00\x00\x00".to_vec();
        other.extend_from_slice(b"content.xml....mimetypeapplication/vnd.oasis");
        assert_eq!(DocumentFormat::sniff(&other), None);
    }

    #[test]
    fn parses_strategy_names() {
        assert_eq!("LLM".parse::<ClassifierStrategy>(), Ok(ClassifierStrategy::Llm));
        assert_eq!(
            "extracted-text".parse::<IngestionMode>(),
            Ok(IngestionMode::ExtractedText)
        );
        let err = "svm".parse::<ClassifierStrategy>().unwrap_err();
        assert!(err.to_string().contains("model, llm"));
    }

    #[test]
    fn strategy_serde_is_kebab_case() {
        let json = serde_json::to_string(&IngestionMode::RawBytes).unwrap();
        assert_eq!(json, "\"raw-bytes\"");
    }
}
