//! Batch conversion driver
//!
//! This module provides the `BatchProcessor` that walks the input directory
//! and pushes every image through the configured remote stages. The output
//! directory is the only record of completed work: an image whose output
//! name already exists there is skipped without contacting any service.
//!
//! Per-file failures never abort the batch and never leave output behind.

use crate::{
    config::{ConverterConfig, ProcessingMode},
    error::{ConvertError, Result},
    naming::output_file_name,
    services::{
        build_http_client, io::read_input, BackgroundRemovalService, CompressionService,
        InputEnumerator, NoOpProgressReporter, OutputWriter, ProcessingStage, ProgressReporter,
        RemoveBgClient, TinifyClient,
    },
    tracing_config::spans,
};
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::{debug, error, info, warn, Instrument};

/// One input image and the name its result will get
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageJob {
    pub input: PathBuf,
    pub output_name: String,
}

impl ImageJob {
    #[must_use]
    pub fn new<P: Into<PathBuf>>(input: P) -> Self {
        let input = input.into();
        let output_name = output_file_name(&input);
        Self { input, output_name }
    }
}

/// What happened to a single input file
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum FileOutcome {
    /// Result written to `output`
    Converted { output: PathBuf },
    /// `output` already existed, nothing was sent anywhere
    Skipped { output: PathBuf },
    /// Dry run: the file would have been converted to `output`
    Pending { output: PathBuf },
    /// Nothing was written
    Failed {
        stage: Option<ProcessingStage>,
        reason: String,
    },
}

impl FileOutcome {
    /// Log the failure against its input file and turn it into an outcome
    fn failed(input: &Path, stage: ProcessingStage, error: &ConvertError) -> Self {
        error!(
            file = %input.display(),
            stage = %stage,
            "Failed to convert {}: {}",
            input.display(),
            error
        );
        Self::Failed {
            stage: Some(stage),
            reason: error.to_string(),
        }
    }
}

/// A failed file as recorded in the summary
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FailedFile {
    pub input: PathBuf,
    pub stage: Option<ProcessingStage>,
    pub reason: String,
}

/// Totals for a finished batch
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BatchSummary {
    pub mode: ProcessingMode,
    pub total: usize,
    pub converted: usize,
    pub skipped: usize,
    pub pending: usize,
    pub failed: usize,
    pub failures: Vec<FailedFile>,
    pub elapsed_ms: u64,
}

impl BatchSummary {
    fn new(mode: ProcessingMode, total: usize) -> Self {
        Self {
            mode,
            total,
            converted: 0,
            skipped: 0,
            pending: 0,
            failed: 0,
            failures: Vec::new(),
            elapsed_ms: 0,
        }
    }

    fn record(&mut self, input: &Path, outcome: &FileOutcome) {
        match outcome {
            FileOutcome::Converted { .. } => self.converted += 1,
            FileOutcome::Skipped { .. } => self.skipped += 1,
            FileOutcome::Pending { .. } => self.pending += 1,
            FileOutcome::Failed { stage, reason } => {
                self.failed += 1;
                self.failures.push(FailedFile {
                    input: input.to_path_buf(),
                    stage: *stage,
                    reason: reason.clone(),
                });
            },
        }
    }

    #[must_use]
    pub fn has_failures(&self) -> bool {
        self.failed > 0
    }
}

type StageResult<T> = std::result::Result<T, (ProcessingStage, ConvertError)>;

/// Sequential batch driver
pub struct BatchProcessor {
    config: ConverterConfig,
    enumerator: InputEnumerator,
    writer: OutputWriter,
    compressor: Option<Box<dyn CompressionService>>,
    remover: Option<Box<dyn BackgroundRemovalService>>,
    reporter: Box<dyn ProgressReporter>,
}

impl BatchProcessor {
    /// Create a processor talking to the real remote services
    ///
    /// Only the clients the configured mode needs are created; dry runs
    /// create none.
    ///
    /// # Errors
    /// - Invalid configuration or missing credentials
    /// - Failed to create HTTP client
    pub fn new(config: ConverterConfig) -> Result<Self> {
        config.validate()?;

        let (compressor, remover) = if config.dry_run {
            (None, None)
        } else {
            let client = build_http_client(config.request_timeout)?;

            let compressor: Option<Box<dyn CompressionService>> =
                if config.mode.uses_compression() {
                    Some(Box::new(TinifyClient::from_config(client.clone(), &config)?))
                } else {
                    None
                };
            let remover: Option<Box<dyn BackgroundRemovalService>> =
                if config.mode.uses_background_removal() {
                    Some(Box::new(RemoveBgClient::from_config(client, &config)?))
                } else {
                    None
                };
            (compressor, remover)
        };

        Self::with_services(config, compressor, remover)
    }

    /// Create a processor with injected services
    ///
    /// # Errors
    /// - A service required by the configured mode is missing (unless dry run)
    /// - The file name pattern is invalid
    pub fn with_services(
        config: ConverterConfig,
        compressor: Option<Box<dyn CompressionService>>,
        remover: Option<Box<dyn BackgroundRemovalService>>,
    ) -> Result<Self> {
        if !config.dry_run {
            if config.mode.uses_compression() && compressor.is_none() {
                return Err(ConvertError::invalid_config(format!(
                    "Mode '{}' needs a compression service",
                    config.mode
                )));
            }
            if config.mode.uses_background_removal() && remover.is_none() {
                return Err(ConvertError::invalid_config(format!(
                    "Mode '{}' needs a background-removal service",
                    config.mode
                )));
            }
        }

        let enumerator = InputEnumerator::new(&config.input_dir, config.pattern.as_deref())?;
        let writer = OutputWriter::new(&config.output_dir);

        Ok(Self {
            config,
            enumerator,
            writer,
            compressor,
            remover,
            reporter: Box::new(NoOpProgressReporter),
        })
    }

    /// Replace the progress reporter
    #[must_use]
    pub fn with_reporter(mut self, reporter: Box<dyn ProgressReporter>) -> Self {
        self.reporter = reporter;
        self
    }

    /// Process every file in the input directory, one at a time
    ///
    /// # Errors
    /// - The input directory cannot be listed. Per-file failures are
    ///   reported in the summary instead.
    pub async fn run(&self) -> Result<BatchSummary> {
        let files = self.enumerator.list()?;
        let span = spans::batch_processing(files.len(), self.config.mode);

        async move {
            let start = Instant::now();
            let total = files.len();
            let mut summary = BatchSummary::new(self.config.mode, total);

            if total == 0 {
                warn!(
                    "No input files found in {}",
                    self.enumerator.dir().display()
                );
            }
            self.reporter.report_batch_start(total);

            for (index, input) in files.iter().enumerate() {
                let outcome = self.process_file(input).await;
                self.reporter
                    .report_file_done(index, total, input, &outcome);
                summary.record(input, &outcome);
            }

            self.reporter.report_batch_end();
            summary.elapsed_ms = u64::try_from(start.elapsed().as_millis()).unwrap_or(u64::MAX);

            info!(
                converted = summary.converted,
                skipped = summary.skipped,
                failed = summary.failed,
                elapsed_ms = summary.elapsed_ms,
                "Batch finished"
            );
            Ok(summary)
        }
        .instrument(span)
        .await
    }

    /// Process a single input file
    ///
    /// Never returns an error: failures are folded into
    /// [`FileOutcome::Failed`] and leave the output directory untouched.
    pub async fn process_file(&self, input: &Path) -> FileOutcome {
        let job = ImageJob::new(input);
        let span = spans::file_processing(&job.input, &job.output_name);
        self.process_job(job).instrument(span).await
    }

    async fn process_job(&self, job: ImageJob) -> FileOutcome {
        let output = self.writer.path_for(&job.output_name);

        if self.writer.exists(&job.output_name) {
            if !self.config.force {
                debug!(output = %output.display(), "Output exists, skipping");
                return FileOutcome::Skipped { output };
            }
            debug!(output = %output.display(), "Output exists, reprocessing (--force)");
        }

        if self.config.dry_run {
            return FileOutcome::Pending { output };
        }

        info!("Processing image: {}", job.input.display());

        self.reporter
            .report_stage(&job.input, ProcessingStage::Reading);
        let data = match read_input(&job.input).await {
            Ok(data) => data,
            Err(e) => return FileOutcome::failed(&job.input, ProcessingStage::Reading, &e),
        };

        let converted = match self.convert(&job.input, &data).await {
            Ok(bytes) => bytes,
            Err((stage, e)) => return FileOutcome::failed(&job.input, stage, &e),
        };

        self.reporter
            .report_stage(&job.input, ProcessingStage::Saving);
        match self.writer.write(&job.output_name, &converted).await {
            Ok(output) => FileOutcome::Converted { output },
            Err(e) => FileOutcome::failed(&job.input, ProcessingStage::Saving, &e),
        }
    }

    /// Run the stages of the configured mode, stopping at the first failure
    async fn convert(&self, input: &Path, data: &[u8]) -> StageResult<Vec<u8>> {
        match self.config.mode {
            ProcessingMode::Compress => {
                self.compress(input, data, ProcessingStage::Compressing)
                    .await
            },
            ProcessingMode::RemoveBackground => self.remove_background(input, data).await,
            ProcessingMode::Both => {
                let compressed = self
                    .compress(input, data, ProcessingStage::Compressing)
                    .await?;
                let without_background = self.remove_background(input, &compressed).await?;
                self.compress(input, &without_background, ProcessingStage::Recompressing)
                    .await
            },
        }
    }

    async fn compress(
        &self,
        input: &Path,
        data: &[u8],
        stage: ProcessingStage,
    ) -> StageResult<Vec<u8>> {
        let compressor = self.compressor.as_ref().ok_or_else(|| {
            (
                stage,
                ConvertError::invalid_config("No compression service configured"),
            )
        })?;

        self.reporter.report_stage(input, stage);
        debug!(service = compressor.name(), bytes = data.len(), "{}", stage);
        compressor.compress(data).await.map_err(|e| (stage, e))
    }

    async fn remove_background(&self, input: &Path, data: &[u8]) -> StageResult<Vec<u8>> {
        let stage = ProcessingStage::RemovingBackground;
        let remover = self.remover.as_ref().ok_or_else(|| {
            (
                stage,
                ConvertError::invalid_config("No background-removal service configured"),
            )
        })?;

        self.reporter.report_stage(input, stage);
        debug!(service = remover.name(), bytes = data.len(), "{}", stage);
        remover.remove_background(data).await.map_err(|e| (stage, e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ApiCredentials;
    use crate::services::mock::{MockBackgroundRemover, MockBehavior, MockCompressor};
    use std::fs;
    use tempfile::TempDir;

    struct Dirs {
        input: TempDir,
        output: TempDir,
    }

    fn dirs_with(files: &[&str]) -> Dirs {
        let dirs = Dirs {
            input: TempDir::new().unwrap(),
            output: TempDir::new().unwrap(),
        };
        for name in files {
            fs::write(dirs.input.path().join(name), b"raw").unwrap();
        }
        dirs
    }

    fn config(dirs: &Dirs, mode: ProcessingMode) -> ConverterConfig {
        ConverterConfig::builder()
            .input_dir(dirs.input.path())
            .output_dir(dirs.output.path())
            .mode(mode)
            .credentials(ApiCredentials {
                tinify_api_key: Some("k".to_string()),
                remove_bg_api_key: Some("k".to_string()),
            })
            .build()
            .unwrap()
    }

    #[test]
    fn test_image_job_naming() {
        let job = ImageJob::new("in/My Photo.JPG");
        assert_eq!(job.output_name, "my_photo.png");
        assert_eq!(job.input, PathBuf::from("in/My Photo.JPG"));
    }

    #[tokio::test]
    async fn test_both_mode_runs_three_stages() {
        let dirs = dirs_with(&["My Photo.JPG"]);
        let compressor = MockCompressor::succeeding();
        let remover = MockBackgroundRemover::succeeding();
        let (c_calls, r_calls) = (compressor.calls(), remover.calls());

        let processor = BatchProcessor::with_services(
            config(&dirs, ProcessingMode::Both),
            Some(Box::new(compressor)),
            Some(Box::new(remover)),
        )
        .unwrap();

        let outcome = processor
            .process_file(&dirs.input.path().join("My Photo.JPG"))
            .await;
        let expected = dirs.output.path().join("my_photo.png");
        assert_eq!(
            outcome,
            FileOutcome::Converted {
                output: expected.clone()
            }
        );
        assert_eq!(fs::read(expected).unwrap(), b"raw+c+bg+c");
        assert_eq!(c_calls.get(), 2);
        assert_eq!(r_calls.get(), 1);
    }

    #[tokio::test]
    async fn test_single_stage_modes() {
        let dirs = dirs_with(&["a.jpg"]);
        let processor = BatchProcessor::with_services(
            config(&dirs, ProcessingMode::Compress),
            Some(Box::new(MockCompressor::succeeding())),
            None,
        )
        .unwrap();
        processor.run().await.unwrap();
        assert_eq!(fs::read(dirs.output.path().join("a.png")).unwrap(), b"raw+c");

        let dirs = dirs_with(&["b.jpg"]);
        let processor = BatchProcessor::with_services(
            config(&dirs, ProcessingMode::RemoveBackground),
            None,
            Some(Box::new(MockBackgroundRemover::succeeding())),
        )
        .unwrap();
        processor.run().await.unwrap();
        assert_eq!(fs::read(dirs.output.path().join("b.png")).unwrap(), b"raw+bg");
    }

    #[tokio::test]
    async fn test_second_compression_failure_writes_nothing() {
        let dirs = dirs_with(&["a.jpg"]);
        let processor = BatchProcessor::with_services(
            config(&dirs, ProcessingMode::Both),
            Some(Box::new(MockCompressor::new(MockBehavior::FailOnCall(
                2,
                b"+c".to_vec(),
            )))),
            Some(Box::new(MockBackgroundRemover::succeeding())),
        )
        .unwrap();

        let outcome = processor.process_file(&dirs.input.path().join("a.jpg")).await;
        assert!(matches!(
            outcome,
            FileOutcome::Failed {
                stage: Some(ProcessingStage::Recompressing),
                ..
            }
        ));
        assert_eq!(fs::read_dir(dirs.output.path()).unwrap().count(), 0);
    }

    #[tokio::test]
    async fn test_missing_service_is_rejected() {
        let dirs = dirs_with(&[]);
        let result = BatchProcessor::with_services(
            config(&dirs, ProcessingMode::Both),
            Some(Box::new(MockCompressor::succeeding())),
            None,
        );
        assert!(matches!(result, Err(ConvertError::InvalidConfig(_))));
    }

    #[tokio::test]
    async fn test_unreadable_input_fails_at_reading() {
        let dirs = dirs_with(&[]);
        let processor = BatchProcessor::with_services(
            config(&dirs, ProcessingMode::Compress),
            Some(Box::new(MockCompressor::succeeding())),
            None,
        )
        .unwrap();

        let outcome = processor
            .process_file(&dirs.input.path().join("vanished.jpg"))
            .await;
        assert!(matches!(
            outcome,
            FileOutcome::Failed {
                stage: Some(ProcessingStage::Reading),
                ..
            }
        ));
    }

    #[tokio::test]
    async fn test_failure_is_logged_with_file_name() {
        let logs = crate::testing::LogCapture::default();
        let _guard = logs.install();

        let dirs = dirs_with(&["Failing Shot.jpg"]);
        let processor = BatchProcessor::with_services(
            config(&dirs, ProcessingMode::Compress),
            Some(Box::new(MockCompressor::new(MockBehavior::FailWithStatus(500)))),
            None,
        )
        .unwrap();

        let summary = processor.run().await.unwrap();
        assert_eq!(summary.failed, 1);

        let errors = logs.lines_at("ERROR");
        assert_eq!(errors.len(), 1, "captured: {}", logs.contents());
        assert!(errors[0].contains("Failing Shot.jpg"));
        assert!(errors[0].contains("500"));
        assert!(logs.contents().contains("mock-compressor"));
    }

    #[test]
    fn test_summary_serializes() {
        let mut summary = BatchSummary::new(ProcessingMode::Both, 2);
        summary.record(
            Path::new("in/a.jpg"),
            &FileOutcome::Converted {
                output: PathBuf::from("out/a.png"),
            },
        );
        summary.record(
            Path::new("in/b.jpg"),
            &FileOutcome::Failed {
                stage: Some(ProcessingStage::RemovingBackground),
                reason: "remove.bg returned HTTP 402".to_string(),
            },
        );

        assert!(summary.has_failures());
        let json = serde_json::to_value(&summary).unwrap();
        assert_eq!(json["mode"], "both");
        assert_eq!(json["converted"], 1);
        assert_eq!(json["failures"][0]["stage"], "removing_background");
    }
}
