//! Log Redaction Layer
//!
//! Scrubs API keys and access tokens from strings prior to logging. Service
//! error bodies are echoed into diagnostics, so they pass through here first.

use regex::Regex;
use std::sync::LazyLock;

static BEARER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"Bearer\s+[a-zA-Z0-9\-\._~+/]+=*").unwrap());
static OPENAI_KEY_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"sk-[a-zA-Z0-9_\-]{20,}").unwrap());
static HEADER_KEY_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)(api-key|ocp-apim-subscription-key)(\s*[:=]\s*)[^\s,;&]+").unwrap()
});
// Azure cognitive services keys are 32 hex characters.
static AZURE_KEY_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\b[0-9a-fA-F]{32}\b").unwrap());

/// Redacts sensitive patterns in a string.
pub fn redact_sensitive_data(input: &str) -> String {
    let redacted = BEARER_RE.replace_all(input, "[REDACTED_TOKEN]");
    let redacted = OPENAI_KEY_RE.replace_all(&redacted, "[REDACTED_TOKEN]");
    let redacted = HEADER_KEY_RE.replace_all(&redacted, "${1}${2}[REDACTED_KEY]");
    AZURE_KEY_RE
        .replace_all(&redacted, "[REDACTED_KEY]")
        .into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn redacts_bearer_and_header_keys() {
        let raw = "401 with Bearer eyJhbGciOiJIUzI1NiJ9 and api-key: abc123xyz";
        let clean = redact_sensitive_data(raw);
        assert!(!clean.contains("eyJhbGciOiJIUzI1NiJ9"));
        assert!(!clean.contains("abc123xyz"));
        assert!(clean.contains("api-key: [REDACTED_KEY]"));
    }

    #[test]
    fn redacts_azure_style_key() {
        let clean = redact_sensitive_data("key 0123456789abcdef0123456789ABCDEF rejected");
        assert_eq!(clean, "key [REDACTED_KEY] rejected");
    }

    #[test]
    fn leaves_plain_text_alone() {
        let msg = "Operation failed: InvalidRequest";
        assert_eq!(redact_sensitive_data(msg), msg);
    }
}
