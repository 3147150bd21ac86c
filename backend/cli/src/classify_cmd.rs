//! `docket classify`: run the full pipeline and print one row per file.

use std::path::PathBuf;

use anyhow::{Context, Result};
use docket_config::Settings;
use docket_core::BatchSummary;
use docket_pipeline::{build_orchestrator, read_uploads};

use crate::terminal_output::{note_info, note_success, note_warn, render_results};

pub async fn run(settings: &Settings, paths: &[PathBuf], json: bool) -> Result<()> {
    let inputs = read_uploads(paths).await;
    let orchestrator = build_orchestrator(settings)?;

    note_info(&format!(
        "Classifying {} file(s) with the {:?} strategy",
        inputs.len(),
        settings.classifier.strategy
    ));
    let rows = orchestrator.run_inputs(inputs).await;

    if json {
        println!(
            "{}",
            serde_json::to_string_pretty(&rows).context("Failed to serialize results")?
        );
    } else {
        print!("{}", render_results(&rows));
    }

    let summary = BatchSummary::from_rows(&rows);
    let line = format!(
        "{} classified, {} unclassified, {} failed",
        summary.classified, summary.unclassified, summary.failed
    );
    if summary.failed > 0 {
        note_warn(&line);
    } else {
        note_success(&line);
    }
    Ok(())
}
