use thiserror::Error;

/// Top-level error type for the Docket runtime.
#[derive(Debug, Error)]
pub enum DocketError {
    #[error("configuration error at '{path}': {message}")]
    Config { path: String, message: String },

    #[error("extraction failed: {0}")]
    Extraction(String),

    #[error("unsupported format: {0}")]
    UnsupportedFormat(String),

    #[error("classification failed: {0}")]
    Classification(String),

    #[error("{service} returned {status}: {message}")]
    Service {
        service: String,
        status: u16,
        message: String,
    },

    #[error("{service} operation failed: {message}")]
    OperationFailed { service: String, message: String },

    #[error("{service} operation did not finish after {attempts} polls")]
    PollTimeout { service: String, attempts: u32 },

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl DocketError {
    pub fn config(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Config {
            path: path.into(),
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn service_error_display() {
        let err = DocketError::Service {
            service: "document-intelligence".into(),
            status: 429,
            message: "quota exceeded".into(),
        };
        assert_eq!(
            err.to_string(),
            "document-intelligence returned 429: quota exceeded"
        );
    }

    #[test]
    fn config_error_names_path() {
        let err = DocketError::config("chat.apiKey", "is required");
        assert!(err.to_string().contains("chat.apiKey"));
    }
}
