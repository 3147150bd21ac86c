mod classify_cmd;
mod config_cmd;
mod doctor_cmd;
mod extract_cmd;
mod terminal_output;

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use tracing::debug;

use docket_config::defaults::DEFAULT_LOG_LEVEL;
use docket_config::schema::{ClassifierConfig, ExtractionConfig, LoggingConfig, PipelineConfig};
use docket_config::{config_dir, config_file_path, finalize, load_and_prepare, process_env, DocketConfig, Settings};
use docket_core::{ClassifierStrategy, ExtractionProfile, LabelPolicy};
use docket_logging::init_logger;

use terminal_output::note_error;

#[derive(Parser)]
#[command(name = "docket")]
#[command(about = "Docket: classify legal documents as Judgement or Non-Judgement")]
#[command(version)]
struct Cli {
    /// Path to a YAML config file (default: ~/.docket/config.yaml)
    #[arg(short, long, global = true, env = "DOCKET_CONFIG")]
    config: Option<PathBuf>,

    /// Log level or tracing filter (overrides logging.level)
    #[arg(long, global = true)]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

/// Pipeline settings that can be overridden per invocation.
#[derive(Args, Debug, Default, Clone)]
struct PipelineFlags {
    /// Classification strategy: model or llm
    #[arg(long)]
    strategy: Option<ClassifierStrategy>,

    /// Extraction profile: ocr (pdf/png/jpeg) or office (adds docx)
    #[arg(long)]
    extraction: Option<ExtractionProfile>,

    /// Label policy for LLM answers: verbatim or strict
    #[arg(long)]
    labels: Option<LabelPolicy>,

    /// Files processed concurrently
    #[arg(short = 'j', long)]
    concurrency: Option<usize>,
}

#[derive(Subcommand)]
enum Commands {
    /// Extract text from each file and classify it
    Classify {
        /// Input files (pdf, png, jpg/jpeg, docx)
        #[arg(required = true)]
        files: Vec<PathBuf>,

        #[command(flatten)]
        flags: PipelineFlags,

        /// Print rows as JSON instead of a table
        #[arg(long)]
        json: bool,
    },
    /// Print the text extracted from each file
    Extract {
        #[arg(required = true)]
        files: Vec<PathBuf>,

        /// Extraction profile: ocr or office
        #[arg(long)]
        extraction: Option<ExtractionProfile>,
    },
    /// Show the effective configuration with secrets masked
    Config,
    /// Check environment keys and configuration
    Doctor,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    match run(cli).await {
        Ok(code) => code,
        Err(e) => {
            note_error(&format!("{e:#}"));
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<ExitCode> {
    let env = process_env();
    let path = cli
        .config
        .clone()
        .unwrap_or_else(|| config_file_path(&config_dir()));
    let mut config = load_and_prepare(&path, &env).await?;

    if let Some(level) = &cli.log_level {
        config.logging.get_or_insert_with(LoggingConfig::default).level = Some(level.clone());
    }
    match &cli.command {
        Commands::Classify { flags, .. } => apply_flags(&mut config, flags),
        Commands::Extract { extraction, .. } => apply_flags(
            &mut config,
            &PipelineFlags {
                extraction: *extraction,
                ..Default::default()
            },
        ),
        Commands::Config | Commands::Doctor => {}
    }
    init_logging(&config);
    debug!(path = %path.display(), "Configuration loaded");

    match cli.command {
        Commands::Config => {
            config_cmd::run(&config)?;
            Ok(ExitCode::SUCCESS)
        }
        Commands::Doctor => {
            let healthy = doctor_cmd::run(&config, &env)?;
            Ok(if healthy { ExitCode::SUCCESS } else { ExitCode::FAILURE })
        }
        Commands::Classify { files, json, .. } => {
            let settings = finalize(&config)?;
            classify_cmd::run(&settings, &files, json).await?;
            Ok(ExitCode::SUCCESS)
        }
        Commands::Extract { files, .. } => {
            let settings: Settings = finalize(&config)?;
            extract_cmd::run(&settings, &files).await?;
            Ok(ExitCode::SUCCESS)
        }
    }
}

fn apply_flags(config: &mut DocketConfig, flags: &PipelineFlags) {
    if flags.strategy.is_some() || flags.labels.is_some() {
        let classifier = config.classifier.get_or_insert_with(ClassifierConfig::default);
        if let Some(strategy) = flags.strategy {
            classifier.strategy = Some(strategy);
        }
        if let Some(labels) = flags.labels {
            classifier.labels = Some(labels);
        }
    }
    if let Some(profile) = flags.extraction {
        config.extraction.get_or_insert_with(ExtractionConfig::default).profile = Some(profile);
    }
    if let Some(concurrency) = flags.concurrency {
        config.pipeline.get_or_insert_with(PipelineConfig::default).concurrency = Some(concurrency);
    }
}

fn init_logging(config: &DocketConfig) {
    let logging = config.logging.clone().unwrap_or_default();
    let level = logging.level.unwrap_or_else(|| DEFAULT_LOG_LEVEL.to_string());
    let dir = logging.dir.map(PathBuf::from);
    init_logger(&level, dir.as_deref(), logging.json.unwrap_or(false));
}
