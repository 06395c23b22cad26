//! Collaborator ports for the individual case stages.
//!
//! Each stage of the case pipeline is a separate trait so a test can replace
//! one stage (for example the solver) while keeping the real ones around it.

use std::path::{Path, PathBuf};

use async_trait::async_trait;

use crate::domain::errors::CaseResult;
use crate::domain::models::{Airfoil, Coefficients, SolverConfig};
use crate::domain::ports::case_runner::CaseContext;

/// Loads the airfoil profile. Fails with `CaseError::GeometryLoad`.
#[async_trait]
pub trait GeometryLoader: Send + Sync {
    async fn load(&self) -> CaseResult<Airfoil>;
}

/// Produces a mesh at the case's densities. Fails with `CaseError::MeshGeneration`.
#[async_trait]
pub trait MeshGenerator: Send + Sync {
    /// Returns the path of the mesh artifact inside the case workspace.
    async fn generate(&self, case: &CaseContext, airfoil: &Airfoil) -> CaseResult<PathBuf>;
}

/// Conditions a generated mesh for the solver. Fails with `CaseError::MeshRepair`.
#[async_trait]
pub trait MeshRepairer: Send + Sync {
    /// Returns the path of the mesh the solver should read.
    async fn repair(&self, case: &CaseContext, mesh: &Path) -> CaseResult<PathBuf>;
}

/// Runs the flow solver. Fails with `CaseError::Solver`.
#[async_trait]
pub trait FlowSolver: Send + Sync {
    /// Returns the path of the output artifact results are read from.
    async fn solve(
        &self,
        case: &CaseContext,
        config: &SolverConfig,
        mesh: &Path,
    ) -> CaseResult<PathBuf>;
}

/// Reads the scalar outputs. Fails with `CaseError::ResultParse`.
#[async_trait]
pub trait ResultExtractor: Send + Sync {
    async fn extract(&self, case: &CaseContext, output: &Path) -> CaseResult<Coefficients>;
}
