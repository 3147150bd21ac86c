//! Config redaction: produce safe-to-share config snapshots by masking sensitive fields.

use anyhow::{Context, Result};
use serde_json::Value;

use crate::schema::DocketConfig;

/// Keys whose string values are secrets.
static SENSITIVE_KEYS: &[&str] = &[
    "apiKey",
    "api_key",
    "apikey",
    "subscriptionKey",
    "token",
    "accessToken",
    "secret",
    "password",
];

/// Redact a config JSON value, masking every sensitive field.
pub fn redact(value: &Value) -> Value {
    redact_recursive(value, "")
}

/// Serialize a config and redact it in one step.
pub fn redact_config(config: &DocketConfig) -> Result<Value> {
    let value = serde_json::to_value(config).context("Failed to serialize config for display")?;
    Ok(redact(&value))
}

fn is_sensitive_key(key: &str) -> bool {
    SENSITIVE_KEYS.iter().any(|k| k.eq_ignore_ascii_case(key))
}

fn redact_string(s: &str, key: &str) -> Value {
    if !is_sensitive_key(key) || s.is_empty() {
        return Value::String(s.to_string());
    }
    // Keep a short prefix as a hint for long secrets.
    if s.chars().count() > 8 {
        let hint: String = s.chars().take(4).collect();
        Value::String(format!("{hint}***"))
    } else {
        Value::String("***".to_string())
    }
}

fn redact_recursive(value: &Value, key: &str) -> Value {
    match value {
        Value::String(s) => redact_string(s, key),
        Value::Array(arr) => Value::Array(arr.iter().map(|v| redact_recursive(v, key)).collect()),
        Value::Object(map) => {
            let mut result = serde_json::Map::new();
            for (k, v) in map {
                result.insert(k.clone(), redact_recursive(v, k));
            }
            Value::Object(result)
        }
        other => other.clone(),
    }
}

/// Collect all field paths that would be redacted (for diagnostics).
pub fn collect_redacted_paths(value: &Value) -> Vec<String> {
    let mut paths = Vec::new();
    collect_paths_recursive(value, "", &mut paths);
    paths
}

fn collect_paths_recursive(value: &Value, path: &str, out: &mut Vec<String>) {
    match value {
        Value::String(s) if !s.is_empty() => {
            let key = path.rsplit('.').next().unwrap_or("");
            if is_sensitive_key(key) {
                out.push(path.to_string());
            }
        }
        Value::Object(map) => {
            for (k, v) in map {
                let child_path = if path.is_empty() {
                    k.clone()
                } else {
                    format!("{path}.{k}")
                };
                collect_paths_recursive(v, &child_path, out);
            }
        }
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{ChatConfig, DocumentIntelligenceConfig};
    use serde_json::json;

    #[test]
    fn redacts_api_keys() {
        let cfg = DocketConfig {
            document_intelligence: Some(DocumentIntelligenceConfig {
                endpoint: Some("https://di.example.com".into()),
                api_key: Some("0123456789abcdef0123456789abcdef".into()),
                ..Default::default()
            }),
            chat: Some(ChatConfig {
                api_key: Some("short".into()),
                ..Default::default()
            }),
            ..Default::default()
        };
        let redacted = redact_config(&cfg).unwrap();
        assert_eq!(redacted["documentIntelligence"]["apiKey"], "0123***");
        assert_eq!(redacted["chat"]["apiKey"], "***");
        assert_eq!(redacted["documentIntelligence"]["endpoint"], "https://di.example.com");
    }

    #[test]
    fn collects_paths() {
        let v = json!({ "chat": { "apiKey": "abc", "model": "gpt" } });
        assert_eq!(collect_redacted_paths(&v), vec!["chat.apiKey".to_string()]);
    }
}
