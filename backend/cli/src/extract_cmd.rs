//! `docket extract`: print the text the configured extractor produces.

use std::path::PathBuf;

use anyhow::Result;
use docket_config::Settings;
use docket_pipeline::{Intake, extractor_from_settings, read_uploads};

use crate::terminal_output::note_error;

pub async fn run(settings: &Settings, paths: &[PathBuf]) -> Result<()> {
    let inputs = read_uploads(paths).await;
    let extractor = extractor_from_settings(settings);

    for input in &inputs {
        let file = match input {
            Intake::Ready(file) => file,
            Intake::Rejected { name, error } => {
                note_error(&format!("{name}: {error:#}"));
                continue;
            }
        };
        println!("== {} ({}) ==", file.name, file.format);
        match extractor.extract(file).await {
            Ok(text) if text.trim().is_empty() => println!("(no text recognized)"),
            Ok(text) => println!("{text}"),
            Err(e) => note_error(&format!("{}: {e:#}", file.name)),
        }
        println!();
    }
    Ok(())
}
