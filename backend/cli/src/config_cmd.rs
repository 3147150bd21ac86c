//! `docket config`: print the effective configuration with secrets masked.

use anyhow::{Context, Result};
use docket_config::{collect_redacted_paths, redact_config, validate, DocketConfig};

use crate::terminal_output::{note_error, note_info, note_success, note_warn};

pub fn run(config: &DocketConfig) -> Result<()> {
    let redacted = redact_config(config)?;
    let yaml = serde_yaml::to_string(&redacted).context("Failed to render config as YAML")?;
    println!("{yaml}");

    let masked = collect_redacted_paths(&redacted);
    if !masked.is_empty() {
        note_info(&format!("masked: {}", masked.join(", ")));
    }

    let report = validate(config);
    for warning in &report.warnings {
        note_warn(&format!("{}: {}", warning.path, warning.message));
    }
    for error in &report.errors {
        note_error(&format!("{}: {}", error.path, error.message));
    }
    if report.is_valid() {
        note_success("configuration is valid");
    }
    Ok(())
}
