//! Drives a full density sweep: plan, run each cell, log results.

use std::collections::HashSet;
use std::path::PathBuf;
use std::sync::Arc;

use tracing::{info, warn};

use crate::domain::errors::{CaseError, CaseResult, SweepResult};
use crate::domain::models::{
    AxisSpec, CaseFailure, Config, ParameterGrid, ProjectIdentifier, ResultRecord, SamplePair,
    SweepReport,
};
use crate::domain::ports::{CaseContext, CaseRunner, ResultStore};
use crate::services::workspace::ProjectWorkspace;

/// The part of the configuration a sweep run needs.
#[derive(Debug, Clone)]
pub struct SweepSettings {
    pub working_dir: PathBuf,
    pub project_prefix: String,
    pub inner: AxisSpec,
    pub outer: AxisSpec,
    pub resume: bool,
}

impl From<&Config> for SweepSettings {
    fn from(config: &Config) -> Self {
        Self {
            working_dir: config.working_dir.clone(),
            project_prefix: config.project_prefix.clone(),
            inner: config.sweep.inner_axis(),
            outer: config.sweep.outer_axis(),
            resume: config.resume,
        }
    }
}

/// Progress callbacks; all methods default to doing nothing.
pub trait SweepObserver: Send + Sync {
    /// `already_logged` cells are skipped by resume.
    fn on_start(&self, _planned: usize, _already_logged: usize) {}

    fn on_case_started(&self, _pair: &SamplePair, _project: &ProjectIdentifier) {}

    fn on_case_finished(&self, _pair: &SamplePair, _outcome: &CaseResult<ResultRecord>) {}

    fn on_finish(&self, _report: &SweepReport) {}
}

/// Observer that ignores every event.
#[derive(Debug, Default)]
pub struct NoopObserver;

impl SweepObserver for NoopObserver {}

/// Runs every cell of the plan in order and appends each success to the log.
pub struct ConvergenceRunner {
    settings: SweepSettings,
    runner: Arc<dyn CaseRunner>,
    store: Box<dyn ResultStore>,
    observer: Arc<dyn SweepObserver>,
}

impl ConvergenceRunner {
    pub fn new(
        settings: SweepSettings,
        runner: Arc<dyn CaseRunner>,
        store: Box<dyn ResultStore>,
    ) -> Self {
        Self {
            settings,
            runner,
            store,
            observer: Arc::new(NoopObserver),
        }
    }

    pub fn with_observer(mut self, observer: Arc<dyn SweepObserver>) -> Self {
        self.observer = observer;
        self
    }

    /// Execute the sweep.
    ///
    /// Case failures are recorded in the report and the sweep continues.
    /// Invalid plans, identifier collisions, workspace failures and result
    /// log I/O errors end the run with an error.
    pub async fn run(&mut self) -> SweepResult<SweepReport> {
        let grid = ParameterGrid::new(&self.settings.inner, &self.settings.outer)?;
        let mut workspace =
            ProjectWorkspace::new(&self.settings.working_dir, &self.settings.project_prefix);
        workspace.check_unique(&grid)?;
        workspace.ensure_root().await?;

        let logged = if self.settings.resume {
            self.logged_pairs().await?
        } else {
            HashSet::new()
        };

        let mut report = SweepReport::start(grid.len());
        let mut pending = Vec::with_capacity(grid.len());
        for pair in grid.pairs() {
            if logged.contains(&(pair.inner.to_bits(), pair.outer.to_bits())) {
                report.resumed += 1;
            } else {
                pending.push(pair);
            }
        }

        info!(
            run_id = %report.run_id,
            planned = report.planned,
            resumed = report.resumed,
            inner = grid.inner_values().len(),
            outer = grid.outer_values().len(),
            working_dir = %workspace.root().display(),
            result_log = %self.store.location().display(),
            "sweep starting"
        );
        self.observer.on_start(report.planned, report.resumed);

        for pair in pending {
            let project = workspace.identifier_for(&pair);
            let dir = workspace.ensure(&project).await?;
            let case = CaseContext::new(pair, project, dir);

            self.observer.on_case_started(&pair, &case.project);
            report.attempted += 1;

            let outcome = self
                .runner
                .run_case(&case)
                .await
                .and_then(|record| belongs_to(record, &pair));
            match &outcome {
                Ok(record) => {
                    self.store.append(record).await?;
                    report.succeeded += 1;
                }
                Err(e) => {
                    warn!(
                        pair = %pair,
                        project = %case.project,
                        stage = %e.stage(),
                        error = e.detail(),
                        "case failed, continuing with next pair"
                    );
                    report
                        .failures
                        .push(CaseFailure::new(pair, case.project.clone(), e));
                }
            }
            self.observer.on_case_finished(&pair, &outcome);
        }

        report.finish();
        info!(
            run_id = %report.run_id,
            succeeded = report.succeeded,
            failed = report.failed(),
            resumed = report.resumed,
            duration_secs = report.duration_secs().unwrap_or_default(),
            "sweep finished"
        );
        self.observer.on_finish(&report);
        Ok(report)
    }

    async fn logged_pairs(&self) -> SweepResult<HashSet<(u64, u64)>> {
        let records = self.store.read_all().await?;
        Ok(records
            .iter()
            .map(|r| (r.inner.to_bits(), r.outer.to_bits()))
            .collect())
    }
}

/// Only records for the cell's own pair may enter the log.
fn belongs_to(record: ResultRecord, pair: &SamplePair) -> CaseResult<ResultRecord> {
    if record.matches(pair.inner, pair.outer) {
        Ok(record)
    } else {
        Err(CaseError::ResultParse(format!(
            "case produced a record for ({}, {}) instead of {pair}",
            record.inner, record.outer
        )))
    }
}
