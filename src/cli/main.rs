//! Image batch conversion CLI
//!
//! Command-line interface that drives the batch processor over an input folder.

use super::config::CliConfigBuilder;
use super::progress::create_cli_progress_reporter;
use crate::{
    pipeline::{BatchProcessor, BatchSummary},
    tracing_config::{init_cli_tracing, TracingFormat},
};
use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use std::process::ExitCode;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Compress images and/or remove their background through remote APIs
///
/// API keys are read from the TINIFY_API_KEY and REMOVE_BG_API_KEY
/// environment variables. Without --compress or --remove-bg, every image
/// is compressed, freed of its background and compressed again.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about)]
#[command(name = "image-batch-convert")]
#[allow(clippy::struct_excessive_bools)]
pub struct Cli {
    /// Only compress images
    #[arg(long, conflicts_with = "remove_bg")]
    pub compress: bool,

    /// Only remove the background
    #[arg(long)]
    pub remove_bg: bool,

    /// Directory containing the images to convert (not searched recursively)
    #[arg(long, value_name = "DIR", default_value = crate::config::DEFAULT_INPUT_DIR)]
    pub input_path: String,

    /// Directory receiving converted images; must already exist
    #[arg(short, long, value_name = "DIR", default_value = crate::config::DEFAULT_OUTPUT_DIR)]
    pub output_path: String,

    /// Only process input files whose name matches this glob (e.g. "*.jpg")
    #[arg(long)]
    pub pattern: Option<String>,

    /// Reprocess images whose output file already exists
    #[arg(long)]
    pub force: bool,

    /// List what would be converted without calling any API or writing files
    #[arg(long)]
    pub dry_run: bool,

    /// Timeout in seconds for each HTTP request (0 = no timeout)
    #[arg(long, default_value_t = 300)]
    pub timeout_secs: u64,

    /// Show a progress bar instead of per-file log lines
    #[arg(long)]
    pub progress: bool,

    /// Print the final summary as JSON on stdout
    #[arg(long)]
    pub json_summary: bool,

    /// Log output format
    #[arg(long, value_enum, default_value_t = CliLogFormat::Console)]
    pub log_format: CliLogFormat,

    /// Enable verbose logging (-v: DEBUG, -vv: TRACE)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,
}

#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, ValueEnum, Debug)]
pub enum CliLogFormat {
    Console,
    Compact,
    #[cfg(feature = "tracing-json")]
    Json,
}

impl From<CliLogFormat> for TracingFormat {
    fn from(format: CliLogFormat) -> Self {
        match format {
            CliLogFormat::Console => TracingFormat::Console,
            CliLogFormat::Compact => TracingFormat::Compact,
            #[cfg(feature = "tracing-json")]
            CliLogFormat::Json => TracingFormat::Json,
        }
    }
}

/// Parse arguments, run the batch and map the result to an exit code
///
/// Exits with 1 when at least one image failed; configuration errors are
/// returned as `Err` before any image is touched.
pub async fn main() -> Result<ExitCode> {
    let cli = Cli::parse();

    let session_id =
        init_cli_tracing(cli.verbose, cli.log_format.into()).context("Failed to initialize tracing")?;
    debug!(session_id = %session_id, "Starting image batch conversion");

    let config = CliConfigBuilder::from_cli(&cli).context("Failed to build configuration")?;

    info!("Mode: {}", config.mode);
    info!(
        "Input: {}, Output: {}",
        config.input_dir.display(),
        config.output_dir.display()
    );
    if config.dry_run {
        warn!("Dry run: no API calls will be made and nothing will be written");
    }

    let processor = BatchProcessor::new(config)
        .context("Failed to create batch processor")?
        .with_reporter(create_cli_progress_reporter(cli.progress, cli.verbose > 0));

    let summary = processor.run().await.context("Batch conversion failed")?;

    if cli.json_summary {
        let json = serde_json::to_string_pretty(&summary).context("Failed to serialize summary")?;
        println!("{}", json);
    } else {
        log_summary(&summary);
    }

    Ok(ExitCode::from(exit_status(&summary)))
}

fn log_summary(summary: &BatchSummary) {
    info!(
        "Processed {} file(s) in {:.2}s: {} converted, {} skipped, {} failed",
        summary.total,
        elapsed_secs(summary),
        summary.converted,
        summary.skipped,
        summary.failed
    );
    if summary.pending > 0 {
        info!("{} file(s) would be converted", summary.pending);
    }
    for failure in &summary.failures {
        warn!("  • {}: {}", failure.input.display(), failure.reason);
    }
}

fn elapsed_secs(summary: &BatchSummary) -> f64 {
    Duration::from_millis(summary.elapsed_ms).as_secs_f64()
}

fn exit_status(summary: &BatchSummary) -> u8 {
    u8::from(summary.has_failures())
}
