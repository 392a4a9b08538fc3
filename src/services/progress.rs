//! Progress reporting service
//!
//! This module separates progress reporting concerns from the pipeline,
//! allowing the CLI to show a progress bar while tests and library users
//! stay silent.

use crate::pipeline::FileOutcome;
use serde::Serialize;
use std::path::Path;
use tracing::{info, warn};

/// Stages a single image goes through
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ProcessingStage {
    /// Reading the input file
    Reading,
    /// First (or only) compression pass
    Compressing,
    /// Background removal
    RemovingBackground,
    /// Compression of the background-free image
    Recompressing,
    /// Writing the result to the output directory
    Saving,
}

impl ProcessingStage {
    /// Get a human-readable description of the processing stage
    #[must_use]
    pub fn description(&self) -> &'static str {
        match self {
            ProcessingStage::Reading => "Reading image",
            ProcessingStage::Compressing => "Compressing image",
            ProcessingStage::RemovingBackground => "Removing background",
            ProcessingStage::Recompressing => "Compressing image again",
            ProcessingStage::Saving => "Saving image",
        }
    }
}

impl std::fmt::Display for ProcessingStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.description())
    }
}

/// Trait for reporting progress while a batch runs
pub trait ProgressReporter: Send + Sync {
    /// Called once before the first file with the number of files found
    fn report_batch_start(&self, _total: usize) {}

    /// A file entered a new stage
    fn report_stage(&self, input: &Path, stage: ProcessingStage);

    /// A file finished, successfully or not
    ///
    /// `index` is zero-based.
    fn report_file_done(&self, index: usize, total: usize, input: &Path, outcome: &FileOutcome);

    /// Called once after the last file
    fn report_batch_end(&self) {}
}

/// No-op progress reporter that discards all progress updates
pub struct NoOpProgressReporter;

impl ProgressReporter for NoOpProgressReporter {
    fn report_stage(&self, _input: &Path, _stage: ProcessingStage) {}

    fn report_file_done(
        &self,
        _index: usize,
        _total: usize,
        _input: &Path,
        _outcome: &FileOutcome,
    ) {
    }
}

/// Console progress reporter that logs progress through tracing
pub struct ConsoleProgressReporter {
    verbose: bool,
}

impl ConsoleProgressReporter {
    /// Create a new console progress reporter
    ///
    /// # Arguments
    /// * `verbose` - Whether to log every stage, not just file results
    #[must_use]
    pub fn new(verbose: bool) -> Self {
        Self { verbose }
    }
}

impl ProgressReporter for ConsoleProgressReporter {
    fn report_batch_start(&self, total: usize) {
        info!("Found {} file(s) to consider", total);
    }

    fn report_stage(&self, input: &Path, stage: ProcessingStage) {
        if self.verbose {
            info!(file = %input.display(), "{}...", stage);
        }
    }

    fn report_file_done(&self, index: usize, total: usize, input: &Path, outcome: &FileOutcome) {
        let position = format!("[{}/{}]", index + 1, total);
        match outcome {
            FileOutcome::Converted { output } => info!(
                "{} Finished processing image: {} -> {}",
                position,
                input.display(),
                output.display()
            ),
            FileOutcome::Skipped { .. } => info!(
                "{} Skipping already converted file: {}",
                position,
                input.display()
            ),
            FileOutcome::Pending { output } => info!(
                "{} Would convert {} -> {}",
                position,
                input.display(),
                output.display()
            ),
            FileOutcome::Failed { stage, .. } => match stage {
                Some(stage) => warn!(
                    "{} Not converted: {} (failed while {})",
                    position,
                    input.display(),
                    stage.description().to_lowercase()
                ),
                None => warn!("{} Not converted: {}", position, input.display()),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;
    use std::sync::{Arc, Mutex};

    /// Test progress reporter that captures reports for verification
    #[derive(Default)]
    struct TestProgressReporter {
        stages: Arc<Mutex<Vec<ProcessingStage>>>,
        done: Arc<Mutex<Vec<(usize, usize)>>>,
    }

    impl ProgressReporter for TestProgressReporter {
        fn report_stage(&self, _input: &Path, stage: ProcessingStage) {
            self.stages.lock().unwrap().push(stage);
        }

        fn report_file_done(
            &self,
            index: usize,
            total: usize,
            _input: &Path,
            _outcome: &FileOutcome,
        ) {
            self.done.lock().unwrap().push((index, total));
        }
    }

    #[test]
    fn test_processing_stage_descriptions() {
        assert_eq!(ProcessingStage::Compressing.description(), "Compressing image");
        assert_eq!(
            ProcessingStage::Recompressing.to_string(),
            "Compressing image again"
        );
        assert_eq!(
            ProcessingStage::RemovingBackground.description(),
            "Removing background"
        );
    }

    #[test]
    fn test_reporter_default_hooks() {
        let reporter = TestProgressReporter::default();
        let input = PathBuf::from("in/a.jpg");
        let outcome = FileOutcome::Skipped {
            output: PathBuf::from("out/a.png"),
        };

        reporter.report_batch_start(1);
        reporter.report_stage(&input, ProcessingStage::Reading);
        reporter.report_file_done(0, 1, &input, &outcome);
        reporter.report_batch_end();

        assert_eq!(*reporter.stages.lock().unwrap(), vec![ProcessingStage::Reading]);
        assert_eq!(*reporter.done.lock().unwrap(), vec![(0, 1)]);
    }

    #[test]
    fn test_console_reporter_lines() {
        let logs = crate::testing::LogCapture::default();
        let _guard = logs.install();

        let input = PathBuf::from("in/a.jpg");
        let outcomes = [
            FileOutcome::Converted {
                output: PathBuf::from("out/a.png"),
            },
            FileOutcome::Pending {
                output: PathBuf::from("out/a.png"),
            },
            FileOutcome::Failed {
                stage: Some(ProcessingStage::Compressing),
                reason: "HTTP 500".to_string(),
            },
        ];

        let console = ConsoleProgressReporter::new(false);
        console.report_stage(&input, ProcessingStage::Reading);
        for (index, outcome) in outcomes.iter().enumerate() {
            console.report_file_done(index, outcomes.len(), &input, outcome);
            NoOpProgressReporter.report_file_done(index, outcomes.len(), &input, outcome);
        }

        let output = logs.contents();
        assert!(output.contains("[1/3] Finished processing image: in/a.jpg -> out/a.png"));
        assert!(output.contains("[2/3] Would convert in/a.jpg -> out/a.png"));
        assert!(!output.contains("Reading image"), "stages only logged when verbose");

        let warnings = logs.lines_at("WARN");
        assert_eq!(warnings.len(), 1);
        assert!(warnings[0].contains("[3/3] Not converted: in/a.jpg (failed while compressing image)"));
        assert!(logs.lines_at("ERROR").is_empty());
    }
}
