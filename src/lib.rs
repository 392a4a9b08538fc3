#![allow(clippy::missing_errors_doc)]
#![allow(clippy::uninlined_format_args)]

//! # Image Batch Converter
//!
//! Batch image compression and background removal through remote APIs.
//!
//! Images are read from an input directory, optionally compressed with the
//! [Tinify](https://tinypng.com/developers) API and/or freed of their
//! background with the [remove.bg](https://www.remove.bg/api) API, and the
//! results are written to an output directory as PNG files. A file whose
//! output already exists is skipped, so an interrupted run can simply be
//! started again.
//!
//! ## Features
//!
//! - **Three modes**: compress only, remove background only, or both
//!   (compress → remove background → compress again, the default)
//! - **Resumable**: the output directory is the record of finished work
//! - **Fail-soft**: a failure on one image is logged and the batch continues;
//!   nothing is written for the failed image
//! - **Pluggable services**: both APIs sit behind async traits, with mocks
//!   for testing
//! - **CLI Integration**: optional command-line interface (enable with `cli` feature)
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use image_batch_converter::{ApiCredentials, BatchProcessor, ConverterConfig, ProcessingMode};
//!
//! # async fn example() -> anyhow::Result<()> {
//! let config = ConverterConfig::builder()
//!     .input_dir("images_not_converted")
//!     .output_dir("images_converted")
//!     .mode(ProcessingMode::Both)
//!     .credentials(ApiCredentials::from_env())
//!     .build()?;
//!
//! let summary = BatchProcessor::new(config)?.run().await?;
//! println!("{} converted, {} skipped", summary.converted, summary.skipped);
//! # Ok(())
//! # }
//! ```
//!
//! ## Credentials
//!
//! API keys are never compiled in. They are read from `TINIFY_API_KEY` and
//! `REMOVE_BG_API_KEY`; only the keys the selected mode needs are required.

#[cfg(feature = "cli")]
pub mod cli;
pub mod config;
pub mod error;
pub mod naming;
pub mod pipeline;
pub mod services;
#[cfg(test)]
mod testing;
pub mod tracing_config;

// Public API exports
pub use config::{ApiCredentials, ConverterConfig, ConverterConfigBuilder, Endpoints, ProcessingMode};
pub use error::{ConvertError, Result};
pub use naming::output_file_name;
pub use pipeline::{BatchProcessor, BatchSummary, FailedFile, FileOutcome, ImageJob};
pub use services::{
    BackgroundRemovalService, CompressionService, ConsoleProgressReporter, InputEnumerator,
    NoOpProgressReporter, OutputWriter, ProcessingStage, ProgressReporter, RemoveBgClient,
    TinifyClient,
};

#[cfg(feature = "cli")]
pub use tracing_config::init_cli_tracing;
pub use tracing_config::{spans, TracingConfig, TracingFormat};
