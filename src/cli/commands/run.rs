//! Implementation of the `meshsweep run` command.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Args;
use serde::Serialize;

use crate::adapters::{
    CsvAirfoilLoader, FileResultStore, GmshMeshGenerator, ResolvedToolchain, Su2BreakdownExtractor,
    Su2MeshConditioner, Su2Solver, ToolchainCheck,
};
use crate::cli::output::{output, CommandOutput, SweepProgress, TableFormatter};
use crate::domain::models::{Config, SweepReport};
use crate::domain::ports::CaseRunner;
use crate::services::{
    ConvergenceRunner, NoopObserver, PipelineCaseRunner, SweepObserver, SweepSettings,
};

#[derive(Args, Debug)]
pub struct RunArgs {
    /// Skip pairs already present in the result log
    #[arg(long)]
    pub resume: bool,

    /// Do not draw a progress bar
    #[arg(long)]
    pub no_progress: bool,
}

#[derive(Debug, Serialize)]
pub struct RunOutput {
    pub report: SweepReport,
    pub result_log: PathBuf,
}

impl CommandOutput for RunOutput {
    fn to_human(&self) -> String {
        let report = &self.report;
        let mut lines = vec![
            format!("Sweep {} finished", report.run_id),
            format!("  planned:   {}", report.planned),
            format!("  succeeded: {}", report.succeeded),
            format!("  failed:    {}", report.failed()),
        ];
        if report.resumed > 0 {
            lines.push(format!("  resumed:   {}", report.resumed));
        }
        if let Some(secs) = report.duration_secs() {
            lines.push(format!("  duration:  {secs}s"));
        }
        lines.push(format!("  results:   {}", self.result_log.display()));
        if !report.failures.is_empty() {
            lines.push(String::new());
            lines.push(TableFormatter::new().format_failures(&report.failures));
        }
        lines.join("\n")
    }

    fn to_json(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or_default()
    }
}

/// Wire the Gmsh/SU2 adapters into a case pipeline.
pub fn build_case_runner(config: &Config, toolchain: &ResolvedToolchain) -> Arc<dyn CaseRunner> {
    let mut required_markers = config.solver.marker_names();
    for marker in [&config.mesh.airfoil_marker, &config.mesh.farfield_marker] {
        if !required_markers.contains(marker) {
            required_markers.push(marker.clone());
        }
    }

    Arc::new(PipelineCaseRunner::new(
        Arc::new(CsvAirfoilLoader::new(&config.geometry_file)),
        Arc::new(GmshMeshGenerator::new(
            &toolchain.gmsh,
            config.mesh.clone(),
            toolchain.mesh_timeout,
        )),
        Arc::new(Su2MeshConditioner::new(required_markers)),
        Arc::new(Su2Solver::new(
            &toolchain.su2_cfd,
            toolchain.launcher.clone(),
            toolchain.cores,
            toolchain.solver_timeout,
        )),
        Arc::new(Su2BreakdownExtractor::new()),
        Arc::new(config.solver.clone()),
    ))
}

pub async fn execute(args: RunArgs, mut config: Config, json_mode: bool) -> Result<()> {
    if args.resume {
        config.resume = true;
    }

    let toolchain = ToolchainCheck::new(&config.toolchain).resolve()?;
    let case_runner = build_case_runner(&config, &toolchain);

    let result_log = config.result_log_path();
    let store = FileResultStore::open(&result_log)
        .await
        .with_context(|| format!("Failed to open result log {}", result_log.display()))?;

    let observer: Arc<dyn SweepObserver> = if json_mode || args.no_progress {
        Arc::new(NoopObserver)
    } else {
        Arc::new(SweepProgress::new())
    };

    let mut sweep = ConvergenceRunner::new(SweepSettings::from(&config), case_runner, Box::new(store))
        .with_observer(observer);
    let report = sweep.run().await.context("Sweep aborted")?;

    output(&RunOutput { report, result_log }, json_mode);
    Ok(())
}
