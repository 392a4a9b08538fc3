//! Progress bar reporting for the CLI

use crate::pipeline::FileOutcome;
use crate::services::{ConsoleProgressReporter, ProcessingStage, ProgressReporter};
use indicatif::{ProgressBar, ProgressStyle};
use std::path::Path;

/// Reports through an `indicatif` bar, forwarding log lines above it
pub(crate) struct IndicatifProgressReporter {
    bar: ProgressBar,
    console: ConsoleProgressReporter,
}

impl IndicatifProgressReporter {
    pub(crate) fn new(verbose: bool) -> Self {
        let bar = ProgressBar::new(0);
        let style = ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {msg}")
            .map_or_else(|_| ProgressStyle::default_bar(), |s| s.progress_chars("#>-"));
        bar.set_style(style);

        Self {
            bar,
            console: ConsoleProgressReporter::new(verbose),
        }
    }
}

impl ProgressReporter for IndicatifProgressReporter {
    fn report_batch_start(&self, total: usize) {
        self.bar.set_length(total as u64);
    }

    fn report_stage(&self, input: &Path, stage: ProcessingStage) {
        let name = input
            .file_name()
            .map_or_else(|| input.display().to_string(), |n| n.to_string_lossy().to_string());
        self.bar.set_message(format!("{}: {}", stage, name));
        self.bar.suspend(|| self.console.report_stage(input, stage));
    }

    fn report_file_done(&self, index: usize, total: usize, input: &Path, outcome: &FileOutcome) {
        self.bar
            .suspend(|| self.console.report_file_done(index, total, input, outcome));
        self.bar.inc(1);
    }

    fn report_batch_end(&self) {
        self.bar.finish_with_message("done");
    }
}

/// Pick the reporter for the CLI flags
pub(crate) fn create_cli_progress_reporter(
    show_progress_bar: bool,
    verbose: bool,
) -> Box<dyn ProgressReporter> {
    if show_progress_bar {
        Box::new(IndicatifProgressReporter::new(verbose))
    } else {
        Box::new(ConsoleProgressReporter::new(verbose))
    }
}
