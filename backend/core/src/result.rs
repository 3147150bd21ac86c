use std::fmt;

use serde::{Deserialize, Serialize};

pub const JUDGEMENT: &str = "Judgement";
pub const NON_JUDGEMENT: &str = "Non-Judgement";
pub const UNCLASSIFIED: &str = "Unclassified";
pub const ERROR_CATEGORY: &str = "Error";
pub const NOT_AVAILABLE: &str = "N/A";

/// Confidence attached to a category.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(into = "String")]
pub enum Confidence {
    /// Score in `[0, 1]` reported by the external classifier.
    Score(f64),
    NotAvailable,
    /// Failure message shown in place of a score.
    Diagnostic(String),
}

impl fmt::Display for Confidence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Score(s) => write!(f, "{:.2}%", s * 100.0),
            Self::NotAvailable => f.write_str(NOT_AVAILABLE),
            Self::Diagnostic(msg) => f.write_str(msg),
        }
    }
}

impl From<Confidence> for String {
    fn from(c: Confidence) -> Self {
        c.to_string()
    }
}

/// Category decided for one document.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClassificationResult {
    pub category: String,
    pub confidence: Confidence,
}

impl ClassificationResult {
    pub fn new(category: impl Into<String>, confidence: Confidence) -> Self {
        Self {
            category: category.into(),
            confidence,
        }
    }

    pub fn unclassified() -> Self {
        Self::new(UNCLASSIFIED, Confidence::NotAvailable)
    }
}

/// Which pipeline stage a failed row died in.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    Extraction,
    Classification,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Extraction => f.write_str("extraction"),
            Self::Classification => f.write_str("classification"),
        }
    }
}

/// Per-file state machine.
///
/// `Pending -> Extracting -> Classifying -> Done`, with `Failed` reachable from
/// either active stage.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum FileStage {
    Pending,
    Extracting,
    Classifying,
    Done,
    Failed,
}

impl FileStage {
    pub fn can_transition_to(&self, next: FileStage) -> bool {
        matches!(
            (self, next),
            (Self::Pending, Self::Extracting)
                | (Self::Extracting, Self::Classifying)
                | (Self::Extracting, Self::Done)
                | (Self::Extracting, Self::Failed)
                | (Self::Classifying, Self::Done)
                | (Self::Classifying, Self::Failed)
        )
    }
}

impl fmt::Display for FileStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Pending => "pending",
            Self::Extracting => "extracting",
            Self::Classifying => "classifying",
            Self::Done => "done",
            Self::Failed => "failed",
        };
        f.write_str(s)
    }
}

/// One output row; every input file yields exactly one.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResultRow {
    pub file_name: String,
    pub category: String,
    pub confidence: Confidence,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<ErrorKind>,
}

impl ResultRow {
    pub fn classified(file_name: impl Into<String>, result: ClassificationResult) -> Self {
        Self {
            file_name: file_name.into(),
            category: result.category,
            confidence: result.confidence,
            error: None,
        }
    }

    pub fn failed(file_name: impl Into<String>, kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            file_name: file_name.into(),
            category: ERROR_CATEGORY.to_string(),
            confidence: Confidence::Diagnostic(message.into()),
            error: Some(kind),
        }
    }

    pub fn is_error(&self) -> bool {
        self.error.is_some()
    }

    pub fn is_unclassified(&self) -> bool {
        !self.is_error() && self.category == UNCLASSIFIED
    }
}

/// Counts over a finished batch.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct BatchSummary {
    pub total: usize,
    pub classified: usize,
    pub unclassified: usize,
    pub failed: usize,
}

impl BatchSummary {
    pub fn from_rows(rows: &[ResultRow]) -> Self {
        let mut summary = Self {
            total: rows.len(),
            ..Default::default()
        };
        for row in rows {
            if row.is_error() {
                summary.failed += 1;
            } else if row.is_unclassified() {
                summary.unclassified += 1;
            } else {
                summary.classified += 1;
            }
        }
        summary
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn formats_score_as_percentage() {
        assert_eq!(Confidence::Score(0.873).to_string(), "87.30%");
        assert_eq!(Confidence::Score(1.0).to_string(), "100.00%");
        assert_eq!(Confidence::NotAvailable.to_string(), "N/A");
    }

    #[test]
    fn failed_row_carries_kind_and_diagnostic() {
        let row = ResultRow::failed("scan.png", ErrorKind::Extraction, "timed out");
        assert_eq!(row.category, ERROR_CATEGORY);
        assert_eq!(row.confidence.to_string(), "timed out");
        assert_eq!(row.error, Some(ErrorKind::Extraction));
    }

    #[test]
    fn row_serializes_confidence_as_string() {
        let row = ResultRow::classified(
            "a.pdf",
            ClassificationResult::new(JUDGEMENT, Confidence::Score(0.5)),
        );
        let json = serde_json::to_value(&row).unwrap();
        assert_eq!(json["confidence"], "50.00%");
        assert!(json.get("error").is_none());
    }

    #[test]
    fn stage_transitions() {
        assert!(FileStage::Pending.can_transition_to(FileStage::Extracting));
        assert!(FileStage::Extracting.can_transition_to(FileStage::Done));
        assert!(!FileStage::Pending.can_transition_to(FileStage::Classifying));
        assert!(!FileStage::Done.can_transition_to(FileStage::Failed));
        assert!(!FileStage::Failed.can_transition_to(FileStage::Extracting));
    }

    #[test]
    fn summary_counts_rows() {
        let rows = vec![
            ResultRow::classified("a", ClassificationResult::new(JUDGEMENT, Confidence::NotAvailable)),
            ResultRow::classified("b", ClassificationResult::unclassified()),
            ResultRow::failed("c", ErrorKind::Classification, "boom"),
        ];
        let summary = BatchSummary::from_rows(&rows);
        assert_eq!(
            summary,
            BatchSummary {
                total: 3,
                classified: 1,
                unclassified: 1,
                failed: 1
            }
        );
    }
}
