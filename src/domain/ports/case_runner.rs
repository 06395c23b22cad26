//! Case runner port - executes one sample pair end to end.

use std::path::PathBuf;

use async_trait::async_trait;

use crate::domain::errors::CaseResult;
use crate::domain::models::{ProjectIdentifier, ResultRecord, SamplePair};

/// Everything a case needs to know about where it runs.
#[derive(Debug, Clone, PartialEq)]
pub struct CaseContext {
    pub pair: SamplePair,
    pub project: ProjectIdentifier,
    /// Existing directory owned by this case.
    pub workspace: PathBuf,
}

impl CaseContext {
    pub fn new(pair: SamplePair, project: ProjectIdentifier, workspace: PathBuf) -> Self {
        Self {
            pair,
            project,
            workspace,
        }
    }

    /// Path of a file named after the project inside the workspace.
    pub fn artifact(&self, extension: &str) -> PathBuf {
        self.workspace
            .join(format!("{}.{extension}", self.project.as_str()))
    }
}

/// Runs one cell of the sweep.
///
/// Implementations report every failure as a [`CaseError`](crate::domain::CaseError);
/// the caller decides whether to continue. Any parallelism (e.g. MPI ranks
/// inside the solver) is hidden behind this single blocking call.
#[async_trait]
pub trait CaseRunner: Send + Sync {
    async fn run_case(&self, case: &CaseContext) -> CaseResult<ResultRecord>;
}
