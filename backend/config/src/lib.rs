//! `docket-config`: runtime configuration for the Docket classifier.
//!
//! Provides:
//! - Typed config schema (Document Intelligence, classifier, chat, pipeline, logging)
//! - YAML loading with `${ENV_VAR}` substitution
//! - Environment-key overrides
//! - Default value application
//! - Validation with path-qualified errors
//! - Conversion into typed `Settings`
//! - Config redaction for safe display

pub mod defaults;
pub mod env;
pub mod io;
pub mod redact;
pub mod schema;
pub mod settings;
pub mod validation;

// Re-export most-used types at crate root.
pub use defaults::apply_all_defaults;
pub use env::{
    apply_env_overrides, process_env, resolve_env_vars_with, MissingEnvVarError, ENV_KEYS,
};
pub use io::{config_dir, config_file_path, load_config};
pub use redact::{collect_redacted_paths, redact, redact_config};
pub use schema::DocketConfig;
pub use settings::{ChatSettings, ClassifierSettings, DocumentIntelligenceSettings, LoggingSettings, Settings};
pub use validation::{validate, ConfigValidationError, ValidationReport};

use std::collections::HashMap;
use std::path::Path;

use anyhow::{Context, Result};
use docket_core::DocketError;
use serde_json::Value;

/// Load a config file, substitute `${VAR}` references, overlay the environment,
/// and apply defaults. Does not validate.
pub async fn load_and_prepare(path: &Path, env: &HashMap<String, String>) -> Result<DocketConfig> {
    let raw_config = load_config(path).await?;

    let value: Value =
        serde_json::to_value(&raw_config).context("Failed to serialize config for processing")?;
    let value = resolve_env_vars_with(&value, env).context("Failed to resolve env vars in config")?;
    let config: DocketConfig =
        serde_json::from_value(value).context("Failed to deserialize config after processing")?;

    let config = apply_env_overrides(config, env)
        .map_err(|e| DocketError::config(e.path, e.message))?;

    Ok(apply_all_defaults(config))
}

/// Validate a prepared config and convert it into `Settings`.
///
/// Any validation error is a startup failure; warnings are only logged.
pub fn finalize(config: &DocketConfig) -> Result<Settings, DocketError> {
    let report = validate(config);
    for warning in &report.warnings {
        tracing::warn!(path = %warning.path, message = %warning.message, "Config warning");
    }
    for error in &report.errors {
        tracing::error!(path = %error.path, message = %error.message, "Config error");
    }
    if let Some(first) = report.errors.first() {
        let path = if report.errors.len() == 1 {
            first.path.clone()
        } else {
            format!("{} (+{} more)", first.path, report.errors.len() - 1)
        };
        return Err(DocketError::config(path, report.error_summary()));
    }
    Settings::from_config(config).map_err(|e| DocketError::config(e.path, e.message))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn env(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect()
    }

    #[tokio::test]
    async fn env_only_setup_produces_settings() {
        let dir = tempfile::tempdir().unwrap();
        let env = env(&[
            (env::ENV_DI_ENDPOINT, "https://di.example.com"),
            (env::ENV_DI_KEY, "key"),
            (env::ENV_CLASSIFIER_ID, "judgements"),
        ]);
        let cfg = load_and_prepare(&dir.path().join("config.yaml"), &env)
            .await
            .unwrap();
        let settings = finalize(&cfg).unwrap();
        assert_eq!(settings.classifier.classifier_id.as_deref(), Some("judgements"));
        assert_eq!(settings.document_intelligence.api_version, defaults::DEFAULT_DI_API_VERSION);
    }

    #[tokio::test]
    async fn file_references_are_resolved() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.yaml");
        tokio::fs::write(
            &path,
            "documentIntelligence:\n  endpoint: https://di.example.com\n  apiKey: ${MY_DI_KEY}\nclassifier:\n  classifierId: judgements\n",
        )
        .await
        .unwrap();
        let cfg = load_and_prepare(&path, &env(&[("MY_DI_KEY", "from-env")]))
            .await
            .unwrap();
        let settings = finalize(&cfg).unwrap();
        assert_eq!(settings.document_intelligence.api_key, "from-env");
    }

    #[tokio::test]
    async fn missing_credentials_fail_at_startup() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = load_and_prepare(&dir.path().join("config.yaml"), &HashMap::new())
            .await
            .unwrap();
        let err = finalize(&cfg).unwrap_err();
        assert!(matches!(err, DocketError::Config { .. }));
        assert!(err.to_string().contains("documentIntelligence.endpoint"));
    }
}
