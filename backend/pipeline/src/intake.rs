//! Input format detection and file loading.
//!
//! Turns paths given on the command line into [`UploadedFile`]s. Magic bytes
//! decide the format; the extension is only consulted when the content is not
//! recognised. Inputs that cannot be loaded are kept as [`Intake::Rejected`]
//! so they still get a row.

use std::path::Path;

use anyhow::{Context, Result};
use bytes::Bytes;
use docket_core::{DocketError, DocumentFormat, UploadedFile};
use tracing::{debug, warn};

/// One command-line input after loading.
#[derive(Debug)]
pub enum Intake {
    Ready(UploadedFile),
    /// Unreadable or unsupported input; reported as an extraction failure.
    Rejected { name: String, error: anyhow::Error },
}

impl Intake {
    pub fn name(&self) -> &str {
        match self {
            Self::Ready(file) => &file.name,
            Self::Rejected { name, .. } => name,
        }
    }
}

impl From<UploadedFile> for Intake {
    fn from(file: UploadedFile) -> Self {
        Self::Ready(file)
    }
}

/// Detect the document format from magic bytes, falling back to the extension.
pub fn detect_format(path: &Path, bytes: &[u8]) -> Option<DocumentFormat> {
    let by_extension = DocumentFormat::from_path(path);
    match DocumentFormat::sniff(bytes) {
        Some(sniffed) => {
            if by_extension.is_some_and(|ext| ext != sniffed) {
                debug!(path = %path.display(), format = %sniffed, "Content overrides extension");
            }
            Some(sniffed)
        }
        None => by_extension,
    }
}

fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

/// Read one input file. An undetectable format is an error.
pub async fn read_upload(path: &Path) -> Result<UploadedFile> {
    let bytes = tokio::fs::read(path)
        .await
        .with_context(|| format!("failed to read {}", path.display()))?;

    let format = detect_format(path, &bytes).ok_or_else(|| {
        DocketError::UnsupportedFormat(format!(
            "{} is not a PDF, PNG, JPEG or DOCX file",
            path.display()
        ))
    })?;

    Ok(UploadedFile::new(display_name(path), Bytes::from(bytes), format))
}

/// Read every input in order. A path that cannot be loaded becomes
/// [`Intake::Rejected`] in its slot instead of aborting the batch.
pub async fn read_uploads<P: AsRef<Path>>(paths: &[P]) -> Vec<Intake> {
    let mut inputs = Vec::with_capacity(paths.len());
    for path in paths {
        let path = path.as_ref();
        match read_upload(path).await {
            Ok(file) => inputs.push(Intake::Ready(file)),
            Err(error) => {
                warn!(path = %path.display(), error = %format!("{error:#}"), "Input rejected");
                inputs.push(Intake::Rejected {
                    name: display_name(path),
                    error,
                });
            }
        }
    }
    inputs
}
