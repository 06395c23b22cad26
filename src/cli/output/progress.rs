//! Progress bar for a running sweep using indicatif
//!
//! The bar counts planned cells. Cells skipped by resume are counted as done
//! up front; the message shows the pair being solved or the last result.

use std::time::Duration;

use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};

use crate::domain::errors::CaseResult;
use crate::domain::models::{ProjectIdentifier, ResultRecord, SamplePair, SweepReport};
use crate::services::SweepObserver;

/// Style template for the sweep bar
const PROGRESS_TEMPLATE: &str =
    "[{elapsed_precise}] {bar:40.cyan/blue} {pos}/{len} {msg} (ETA: {eta})";

/// Progress bar characters for visual effect
const PROGRESS_CHARS: &str = "█▓▒░ ";

/// Create a standard progress bar with ETA calculation
pub fn create_progress_bar(total: u64) -> ProgressBar {
    let pb = ProgressBar::new(total);
    let style = ProgressStyle::default_bar()
        .template(PROGRESS_TEMPLATE)
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars(PROGRESS_CHARS);
    pb.set_style(style);
    pb.enable_steady_tick(Duration::from_millis(100));
    pb
}

/// Extension trait for ProgressBar to add common utility methods
pub trait ProgressBarExt {
    /// Finish with a success message (green checkmark)
    fn finish_success(&self, message: impl Into<String>);

    /// Finish with a warning message (yellow !)
    fn finish_warning(&self, message: impl Into<String>);
}

impl ProgressBarExt for ProgressBar {
    fn finish_success(&self, message: impl Into<String>) {
        self.finish_with_message(format!("✓ {}", message.into()));
    }

    fn finish_warning(&self, message: impl Into<String>) {
        self.finish_with_message(format!("! {}", message.into()));
    }
}

/// [`SweepObserver`] that drives a terminal progress bar
pub struct SweepProgress {
    bar: ProgressBar,
}

impl SweepProgress {
    pub fn new() -> Self {
        Self {
            bar: create_progress_bar(0),
        }
    }

    /// Bar that draws nothing (for testing)
    pub fn hidden() -> Self {
        let bar = ProgressBar::with_draw_target(Some(0), ProgressDrawTarget::hidden());
        Self { bar }
    }

    pub fn bar(&self) -> &ProgressBar {
        &self.bar
    }
}

impl Default for SweepProgress {
    fn default() -> Self {
        Self::new()
    }
}

impl SweepObserver for SweepProgress {
    fn on_start(&self, planned: usize, already_logged: usize) {
        self.bar.set_length(planned as u64);
        self.bar.set_position(already_logged as u64);
        if already_logged > 0 {
            self.bar
                .set_message(format!("{already_logged} already in the result log"));
        }
    }

    fn on_case_started(&self, pair: &SamplePair, project: &ProjectIdentifier) {
        self.bar.set_message(format!("{project} {pair}"));
    }

    fn on_case_finished(&self, pair: &SamplePair, outcome: &CaseResult<ResultRecord>) {
        self.bar.inc(1);
        match outcome {
            Ok(record) => self.bar.set_message(format!(
                "{pair} CL={:.4} CD={:.5}",
                record.lift, record.drag
            )),
            Err(e) => self
                .bar
                .set_message(format!("{pair} failed at {}", e.stage())),
        }
    }

    fn on_finish(&self, report: &SweepReport) {
        let summary = format!(
            "{} succeeded, {} failed, {} resumed",
            report.succeeded,
            report.failed(),
            report.resumed
        );
        if report.failures.is_empty() {
            self.bar.finish_success(summary);
        } else {
            self.bar.finish_warning(summary);
        }
    }
}
