//! Environment handling for config values.
//!
//! Two mechanisms:
//! - `${VAR_NAME}` references inside YAML string values, resolved at load time.
//!   Only uppercase `[A-Z_][A-Z0-9_]*` names are matched; `$${VAR}` escapes to a
//!   literal `${VAR}`.
//! - Well-known environment keys (see [`ENV_KEYS`]) that override file values.

use std::collections::HashMap;
use std::str::FromStr;

use anyhow::{bail, Result};
use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;

use crate::schema::{
    ChatConfig, ClassifierConfig, DocketConfig, DocumentIntelligenceConfig, ExtractionConfig,
    LoggingConfig, PipelineConfig,
};
use crate::validation::ConfigValidationError;

/// Matches `${VAR}` and its escaped form `$${VAR}` in one pass.
static ENV_VAR_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(\$?)\$\{([A-Z_][A-Z0-9_]*)\}").unwrap());

pub const ENV_DI_ENDPOINT: &str = "AZURE_DOCUMENT_INTELLIGENCE_ENDPOINT";
pub const ENV_DI_KEY: &str = "AZURE_DOCUMENT_INTELLIGENCE_KEY";
pub const ENV_DI_API_VERSION: &str = "DOCUMENT_INTELLIGENCE_API_VERSION";
pub const ENV_CLASSIFIER_ID: &str = "DOCUMENT_CLASSIFIER_MODEL_ID";
pub const ENV_STRATEGY: &str = "DOCKET_CLASSIFIER";
pub const ENV_INGESTION: &str = "DOCKET_INGESTION";
pub const ENV_LABELS: &str = "DOCKET_LABELS";
pub const ENV_CHAT_ENDPOINT: &str = "AZURE_OPENAI_ENDPOINT";
pub const ENV_CHAT_KEY: &str = "AZURE_OPENAI_API_KEY";
pub const ENV_CHAT_MODEL: &str = "AZURE_OPENAI_DEPLOYMENT";
pub const ENV_CHAT_API_VERSION: &str = "AZURE_OPENAI_API_VERSION";
pub const ENV_EXTRACTION: &str = "DOCKET_EXTRACTION";
pub const ENV_CONCURRENCY: &str = "DOCKET_CONCURRENCY";
pub const ENV_LOG_LEVEL: &str = "DOCKET_LOG_LEVEL";
pub const ENV_LOG_DIR: &str = "DOCKET_LOG_DIR";

/// Recognized environment keys and the config path each one overrides.
pub const ENV_KEYS: &[(&str, &str)] = &[
    (ENV_DI_ENDPOINT, "documentIntelligence.endpoint"),
    (ENV_DI_KEY, "documentIntelligence.apiKey"),
    (ENV_DI_API_VERSION, "documentIntelligence.apiVersion"),
    (ENV_CLASSIFIER_ID, "classifier.classifierId"),
    (ENV_STRATEGY, "classifier.strategy"),
    (ENV_INGESTION, "classifier.ingestion"),
    (ENV_LABELS, "classifier.labels"),
    (ENV_CHAT_ENDPOINT, "chat.endpoint"),
    (ENV_CHAT_KEY, "chat.apiKey"),
    (ENV_CHAT_MODEL, "chat.model"),
    (ENV_CHAT_API_VERSION, "chat.apiVersion"),
    (ENV_EXTRACTION, "extraction.profile"),
    (ENV_CONCURRENCY, "pipeline.concurrency"),
    (ENV_LOG_LEVEL, "logging.level"),
    (ENV_LOG_DIR, "logging.dir"),
];

/// Error returned for missing env vars.
#[derive(Debug, thiserror::Error)]
#[error("Missing env var \"{var_name}\" referenced at config path: {config_path}")]
pub struct MissingEnvVarError {
    pub var_name: String,
    pub config_path: String,
}

/// Snapshot of the process environment.
pub fn process_env() -> HashMap<String, String> {
    std::env::vars().collect()
}

/// Substitute `${VAR}` references in a config JSON value tree from `env`.
///
/// Walks the entire value tree recursively; only string leaves are processed.
/// Returns an error if any referenced env var is not set or is empty.
pub fn resolve_env_vars_with(value: &Value, env: &HashMap<String, String>) -> Result<Value> {
    substitute_value(value, env, "")
}

fn substitute_value(value: &Value, env: &HashMap<String, String>, path: &str) -> Result<Value> {
    match value {
        Value::String(s) => Ok(Value::String(substitute_string(s, env, path)?)),
        Value::Array(arr) => {
            let result: Result<Vec<_>> = arr
                .iter()
                .enumerate()
                .map(|(i, v)| substitute_value(v, env, &format!("{path}[{i}]")))
                .collect();
            Ok(Value::Array(result?))
        }
        Value::Object(map) => {
            let mut result = serde_json::Map::new();
            for (k, v) in map {
                let child_path = if path.is_empty() {
                    k.clone()
                } else {
                    format!("{path}.{k}")
                };
                result.insert(k.clone(), substitute_value(v, env, &child_path)?);
            }
            Ok(Value::Object(result))
        }
        // Primitives pass through unchanged.
        other => Ok(other.clone()),
    }
}

fn substitute_string(s: &str, env: &HashMap<String, String>, path: &str) -> Result<String> {
    if !s.contains('$') {
        return Ok(s.to_string());
    }

    let mut error: Option<MissingEnvVarError> = None;
    let substituted = ENV_VAR_PATTERN.replace_all(s, |caps: &regex::Captures| {
        let var_name = &caps[2];
        if !caps[1].is_empty() {
            return format!("${{{var_name}}}");
        }
        match env.get(var_name) {
            Some(val) if !val.is_empty() => val.clone(),
            _ => {
                if error.is_none() {
                    error = Some(MissingEnvVarError {
                        var_name: var_name.to_string(),
                        config_path: path.to_string(),
                    });
                }
                String::new()
            }
        }
    });

    if let Some(err) = error {
        bail!(err);
    }
    Ok(substituted.into_owned())
}

/// Overlay well-known environment keys onto a config.
///
/// Empty values are ignored. Unparseable enum or number values are reported
/// with the config path they target.
pub fn apply_env_overrides(
    mut config: DocketConfig,
    env: &HashMap<String, String>,
) -> Result<DocketConfig, ConfigValidationError> {
    let get = |key: &str| env.get(key).map(|v| v.trim()).filter(|v| !v.is_empty());

    {
        let di = config
            .document_intelligence
            .get_or_insert_with(DocumentIntelligenceConfig::default);
        set_string(&mut di.endpoint, get(ENV_DI_ENDPOINT));
        set_string(&mut di.api_key, get(ENV_DI_KEY));
        set_string(&mut di.api_version, get(ENV_DI_API_VERSION));
    }

    {
        let classifier = config.classifier.get_or_insert_with(ClassifierConfig::default);
        set_string(&mut classifier.classifier_id, get(ENV_CLASSIFIER_ID));
        set_parsed(&mut classifier.strategy, get(ENV_STRATEGY), "classifier.strategy")?;
        set_parsed(&mut classifier.ingestion, get(ENV_INGESTION), "classifier.ingestion")?;
        set_parsed(&mut classifier.labels, get(ENV_LABELS), "classifier.labels")?;
    }

    if [ENV_CHAT_ENDPOINT, ENV_CHAT_KEY, ENV_CHAT_MODEL, ENV_CHAT_API_VERSION]
        .iter()
        .any(|k| get(*k).is_some())
    {
        let chat = config.chat.get_or_insert_with(ChatConfig::default);
        set_string(&mut chat.endpoint, get(ENV_CHAT_ENDPOINT));
        set_string(&mut chat.api_key, get(ENV_CHAT_KEY));
        set_string(&mut chat.model, get(ENV_CHAT_MODEL));
        set_string(&mut chat.api_version, get(ENV_CHAT_API_VERSION));
    }

    {
        let extraction = config.extraction.get_or_insert_with(ExtractionConfig::default);
        set_parsed(&mut extraction.profile, get(ENV_EXTRACTION), "extraction.profile")?;
    }

    {
        let pipeline = config.pipeline.get_or_insert_with(PipelineConfig::default);
        set_parsed(&mut pipeline.concurrency, get(ENV_CONCURRENCY), "pipeline.concurrency")?;
    }

    {
        let logging = config.logging.get_or_insert_with(LoggingConfig::default);
        set_string(&mut logging.level, get(ENV_LOG_LEVEL));
        set_string(&mut logging.dir, get(ENV_LOG_DIR));
    }

    Ok(config)
}

fn set_string(slot: &mut Option<String>, value: Option<&str>) {
    if let Some(v) = value {
        *slot = Some(v.to_string());
    }
}

fn set_parsed<T>(
    slot: &mut Option<T>,
    value: Option<&str>,
    path: &str,
) -> Result<(), ConfigValidationError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    if let Some(v) = value {
        let parsed = v.parse::<T>().map_err(|e| ConfigValidationError {
            path: path.to_string(),
            message: e.to_string(),
        })?;
        *slot = Some(parsed);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use docket_core::{ClassifierStrategy, ExtractionProfile};
    use serde_json::json;

    fn env(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect()
    }

    #[test]
    fn substitutes_simple_var() {
        let v = json!({"apiKey": "${AZURE_DOCUMENT_INTELLIGENCE_KEY}"});
        let env = env(&[("AZURE_DOCUMENT_INTELLIGENCE_KEY", "abc123")]);
        let result = resolve_env_vars_with(&v, &env).unwrap();
        assert_eq!(result["apiKey"], "abc123");
    }

    #[test]
    fn error_on_missing_var() {
        let v = json!({"chat": {"apiKey": "${MISSING_VAR}"}});
        let err = resolve_env_vars_with(&v, &HashMap::new()).unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("MISSING_VAR"));
        assert!(msg.contains("chat.apiKey"));
    }

    #[test]
    fn escaped_reference_is_kept_literal() {
        let v = json!({"note": "literal $${NOT_A_VAR}"});
        let result = resolve_env_vars_with(&v, &HashMap::new()).unwrap();
        assert_eq!(result["note"], "literal ${NOT_A_VAR}");
    }

    #[test]
    fn passthrough_non_var_strings() {
        let v = json!({"key": "plain-string", "n": 3});
        let result = resolve_env_vars_with(&v, &HashMap::new()).unwrap();
        assert_eq!(result, v);
    }

    #[test]
    fn env_overrides_fill_config() {
        let env = env(&[
            (ENV_DI_ENDPOINT, "https://di.example.com"),
            (ENV_DI_KEY, "secret"),
            (ENV_STRATEGY, "llm"),
            (ENV_CHAT_MODEL, "gpt-4o"),
            (ENV_EXTRACTION, "ocr"),
            (ENV_CONCURRENCY, "3"),
        ]);
        let cfg = apply_env_overrides(DocketConfig::default(), &env).unwrap();
        let di = cfg.document_intelligence.unwrap();
        assert_eq!(di.endpoint.as_deref(), Some("https://di.example.com"));
        assert_eq!(cfg.classifier.unwrap().strategy, Some(ClassifierStrategy::Llm));
        assert_eq!(cfg.chat.unwrap().model.as_deref(), Some("gpt-4o"));
        assert_eq!(cfg.extraction.unwrap().profile, Some(ExtractionProfile::Ocr));
        assert_eq!(cfg.pipeline.unwrap().concurrency, Some(3));
    }

    #[test]
    fn env_does_not_clear_file_values() {
        let mut cfg = DocketConfig::default();
        cfg.document_intelligence = Some(DocumentIntelligenceConfig {
            endpoint: Some("https://from-file".into()),
            ..Default::default()
        });
        let cfg = apply_env_overrides(cfg, &env(&[(ENV_DI_ENDPOINT, "  ")])).unwrap();
        assert_eq!(
            cfg.document_intelligence.unwrap().endpoint.as_deref(),
            Some("https://from-file")
        );
    }

    #[test]
    fn invalid_env_value_names_path() {
        let err = apply_env_overrides(DocketConfig::default(), &env(&[(ENV_CONCURRENCY, "many")]))
            .unwrap_err();
        assert_eq!(err.path, "pipeline.concurrency");
    }
}
