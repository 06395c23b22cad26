//! Production case runner: an ordered pipeline of stage collaborators.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

use async_trait::async_trait;
use tracing::{debug, info, instrument};

use crate::domain::errors::{CaseError, CaseResult, CaseStage};
use crate::domain::models::{Airfoil, Coefficients, ResultRecord, SolverConfig};
use crate::domain::ports::{
    CaseContext, CaseRunner, FlowSolver, GeometryLoader, MeshGenerator, MeshRepairer,
    ResultExtractor,
};

/// Stage order of every case.
pub const PIPELINE: [CaseStage; 5] = [
    CaseStage::GeometryLoad,
    CaseStage::MeshGeneration,
    CaseStage::MeshRepair,
    CaseStage::Solve,
    CaseStage::ResultExtraction,
];

/// What the previous stage handed on.
enum Artifact {
    Pending,
    Geometry(Airfoil),
    Mesh(PathBuf),
    Output(PathBuf),
    Coefficients(Coefficients),
}

/// Runs one case through geometry, meshing, repair, solve and extraction.
pub struct PipelineCaseRunner {
    geometry: Arc<dyn GeometryLoader>,
    mesher: Arc<dyn MeshGenerator>,
    repairer: Arc<dyn MeshRepairer>,
    solver: Arc<dyn FlowSolver>,
    extractor: Arc<dyn ResultExtractor>,
    solver_config: Arc<SolverConfig>,
}

impl PipelineCaseRunner {
    pub fn new(
        geometry: Arc<dyn GeometryLoader>,
        mesher: Arc<dyn MeshGenerator>,
        repairer: Arc<dyn MeshRepairer>,
        solver: Arc<dyn FlowSolver>,
        extractor: Arc<dyn ResultExtractor>,
        solver_config: Arc<SolverConfig>,
    ) -> Self {
        Self {
            geometry,
            mesher,
            repairer,
            solver,
            extractor,
            solver_config,
        }
    }

    async fn advance(
        &self,
        stage: CaseStage,
        case: &CaseContext,
        artifact: Artifact,
    ) -> CaseResult<Artifact> {
        let next = match (stage, artifact) {
            (CaseStage::GeometryLoad, Artifact::Pending) => {
                Artifact::Geometry(self.geometry.load().await?)
            }
            (CaseStage::MeshGeneration, Artifact::Geometry(airfoil)) => {
                Artifact::Mesh(self.mesher.generate(case, &airfoil).await?)
            }
            (CaseStage::MeshRepair, Artifact::Mesh(mesh)) => {
                Artifact::Mesh(self.repairer.repair(case, &mesh).await?)
            }
            (CaseStage::Solve, Artifact::Mesh(mesh)) => Artifact::Output(
                self.solver
                    .solve(case, &self.solver_config, &mesh)
                    .await?,
            ),
            (CaseStage::ResultExtraction, Artifact::Output(output)) => {
                Artifact::Coefficients(self.extractor.extract(case, &output).await?)
            }
            (stage, _) => return Err(out_of_order(stage)),
        };
        Ok(next)
    }
}

fn out_of_order(stage: CaseStage) -> CaseError {
    let msg = format!("stage {stage} reached without its input");
    match stage {
        CaseStage::GeometryLoad => CaseError::GeometryLoad(msg),
        CaseStage::MeshGeneration => CaseError::MeshGeneration(msg),
        CaseStage::MeshRepair => CaseError::MeshRepair(msg),
        CaseStage::Solve => CaseError::Solver(msg),
        CaseStage::ResultExtraction => CaseError::ResultParse(msg),
    }
}

#[async_trait]
impl CaseRunner for PipelineCaseRunner {
    #[instrument(skip(self, case), fields(project = %case.project, pair = %case.pair))]
    async fn run_case(&self, case: &CaseContext) -> CaseResult<ResultRecord> {
        let started = Instant::now();
        let mut artifact = Artifact::Pending;

        for stage in PIPELINE {
            let stage_started = Instant::now();
            artifact = self.advance(stage, case, artifact).await.inspect_err(|e| {
                debug!(
                    stage = %stage,
                    elapsed_ms = stage_started.elapsed().as_millis(),
                    error = %e,
                    "stage failed"
                );
            })?;
            debug!(
                stage = %stage,
                elapsed_ms = stage_started.elapsed().as_millis(),
                "stage complete"
            );
        }

        let Artifact::Coefficients(coefficients) = artifact else {
            return Err(out_of_order(CaseStage::ResultExtraction));
        };

        info!(
            lift = coefficients.lift,
            drag = coefficients.drag,
            elapsed_ms = started.elapsed().as_millis(),
            "case complete"
        );
        Ok(ResultRecord::new(&case.pair, coefficients))
    }
}
