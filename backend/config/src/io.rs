//! Config file loading.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tokio::fs;
use tracing::{debug, info};

use crate::schema::DocketConfig;

/// Default config file name within the config directory.
const CONFIG_FILE_NAME: &str = "config.yaml";

/// Resolve the Docket config directory.
/// Priority: `DOCKET_CONFIG_DIR` env > `~/.docket/`
pub fn config_dir() -> PathBuf {
    if let Ok(dir) = std::env::var("DOCKET_CONFIG_DIR") {
        return PathBuf::from(dir);
    }
    match dirs::home_dir() {
        Some(home) => home.join(".docket"),
        None => PathBuf::from(".docket"),
    }
}

/// Resolve the full path to the main config file.
pub fn config_file_path(config_dir: &Path) -> PathBuf {
    config_dir.join(CONFIG_FILE_NAME)
}

/// Load and parse the config from disk.
///
/// Returns `Ok(Default::default())` if the file doesn't exist, so a purely
/// environment-driven setup needs no file at all.
pub async fn load_config(path: &Path) -> Result<DocketConfig> {
    if !path.exists() {
        debug!(path = %path.display(), "Config file does not exist; using defaults");
        return Ok(DocketConfig::default());
    }

    let raw = fs::read_to_string(path)
        .await
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;

    // An empty file parses to YAML null.
    if raw.trim().is_empty() {
        return Ok(DocketConfig::default());
    }

    let config: DocketConfig = serde_yaml::from_str(&raw)
        .with_context(|| format!("Failed to parse config YAML at: {}", path.display()))?;

    info!(path = %path.display(), "Loaded config");
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn missing_file_yields_default() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = load_config(&dir.path().join("nope.yaml")).await.unwrap();
        assert!(cfg.document_intelligence.is_none());
    }

    #[tokio::test]
    async fn loads_yaml_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = config_file_path(dir.path());
        tokio::fs::write(&path, "extraction:\n  profile: ocr\n")
            .await
            .unwrap();
        let cfg = load_config(&path).await.unwrap();
        assert_eq!(
            cfg.extraction.unwrap().profile,
            Some(docket_core::ExtractionProfile::Ocr)
        );
    }

    #[tokio::test]
    async fn malformed_yaml_names_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.yaml");
        tokio::fs::write(&path, "pipeline: [unclosed").await.unwrap();
        let err = load_config(&path).await.unwrap_err();
        assert!(err.to_string().contains("bad.yaml"));
    }
}
