//! Summary of one sweep run.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::errors::{CaseError, CaseStage};
use crate::domain::models::sample::{ProjectIdentifier, SamplePair};

/// A cell that was attempted and skipped because a stage failed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CaseFailure {
    pub pair: SamplePair,
    pub project: ProjectIdentifier,
    pub stage: CaseStage,
    pub message: String,
}

impl CaseFailure {
    pub fn new(pair: SamplePair, project: ProjectIdentifier, error: &CaseError) -> Self {
        Self {
            pair,
            project,
            stage: error.stage(),
            message: error.detail().to_string(),
        }
    }
}

/// Outcome counts and failures of a completed run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SweepReport {
    pub run_id: Uuid,
    pub started_at: DateTime<Utc>,
    pub finished_at: Option<DateTime<Utc>>,
    pub planned: usize,
    pub attempted: usize,
    pub succeeded: usize,
    pub resumed: usize,
    pub failures: Vec<CaseFailure>,
}

impl SweepReport {
    pub fn start(planned: usize) -> Self {
        Self {
            run_id: Uuid::new_v4(),
            started_at: Utc::now(),
            finished_at: None,
            planned,
            attempted: 0,
            succeeded: 0,
            resumed: 0,
            failures: Vec::new(),
        }
    }

    pub fn finish(&mut self) {
        self.finished_at = Some(Utc::now());
    }

    pub fn failed(&self) -> usize {
        self.failures.len()
    }

    /// True when every planned cell either succeeded now or was already logged.
    pub fn is_complete(&self) -> bool {
        self.succeeded + self.resumed == self.planned
    }

    pub fn duration_secs(&self) -> Option<i64> {
        self.finished_at
            .map(|end| end.signed_duration_since(self.started_at).num_seconds())
    }
}
