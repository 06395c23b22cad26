//! SU2_CFD flow solver adapter.

use std::fmt::Write as _;
use std::path::{Path, PathBuf};
use std::time::Duration;

use async_trait::async_trait;
use tracing::{info, instrument};

use crate::adapters::process::{remove_stale, ExternalCommand};
use crate::domain::errors::{CaseError, CaseResult};
use crate::domain::models::SolverConfig;
use crate::domain::ports::{CaseContext, FlowSolver};

/// File SU2 writes the integrated force coefficients to.
pub const BREAKDOWN_FILE: &str = "forces_breakdown.dat";

/// Options the adapter owns per case; same-named sweep options are ignored.
const CASE_OWNED_KEYS: [&str; 3] = ["MESH_FILENAME", "MESH_FORMAT", "BREAKDOWN_FILENAME"];

/// Name of the solver binary for the host platform.
pub fn su2_cfd_binary(bin_dir: &Path) -> PathBuf {
    bin_dir.join(format!("SU2_CFD{}", std::env::consts::EXE_SUFFIX))
}

/// Launches SU2_CFD, through an MPI launcher when more than one core is used.
pub struct Su2Solver {
    su2_cfd: PathBuf,
    launcher: Option<PathBuf>,
    cores: u32,
    timeout: Duration,
}

impl Su2Solver {
    pub fn new(
        su2_cfd: impl Into<PathBuf>,
        launcher: Option<PathBuf>,
        cores: u32,
        timeout: Duration,
    ) -> Self {
        Self {
            su2_cfd: su2_cfd.into(),
            launcher,
            cores,
            timeout,
        }
    }

    /// Render the case configuration file.
    pub fn render_cfg(config: &SolverConfig, project: &str, mesh_file: &str) -> String {
        let mut cfg = String::new();
        let _ = writeln!(cfg, "% {project}");
        for (key, value) in config.iter() {
            if CASE_OWNED_KEYS.contains(&key) {
                continue;
            }
            let _ = writeln!(cfg, "{key}= {value}");
        }
        let _ = writeln!(cfg, "MESH_FILENAME= {mesh_file}");
        let _ = writeln!(cfg, "MESH_FORMAT= SU2");
        let _ = writeln!(cfg, "BREAKDOWN_FILENAME= {BREAKDOWN_FILE}");
        cfg
    }

    /// Command line for one case; `cfg_file` is relative to the workspace.
    pub fn command(&self, cfg_file: &str) -> ExternalCommand {
        match &self.launcher {
            Some(launcher) if self.cores > 1 => ExternalCommand::new(launcher)
                .arg("-n")
                .arg(self.cores.to_string())
                .arg(&self.su2_cfd)
                .arg(cfg_file),
            _ => ExternalCommand::new(&self.su2_cfd).arg(cfg_file),
        }
    }
}

#[async_trait]
impl FlowSolver for Su2Solver {
    #[instrument(skip(self, case, config), fields(project = %case.project, cores = self.cores))]
    async fn solve(
        &self,
        case: &CaseContext,
        config: &SolverConfig,
        mesh: &Path,
    ) -> CaseResult<PathBuf> {
        let mesh_ref = if mesh.parent() == Some(case.workspace.as_path()) {
            mesh.file_name()
                .map_or_else(|| mesh.display().to_string(), |n| n.to_string_lossy().into_owned())
        } else {
            mesh.display().to_string()
        };

        let cfg_path = case.artifact("cfg");
        let cfg_name = format!("{}.cfg", case.project);
        tokio::fs::write(&cfg_path, Self::render_cfg(config, case.project.as_str(), &mesh_ref))
            .await
            .map_err(|e| CaseError::Solver(format!("cannot write {}: {e}", cfg_path.display())))?;

        let breakdown = case.workspace.join(BREAKDOWN_FILE);
        remove_stale(&breakdown).await.map_err(|e| {
            CaseError::Solver(format!(
                "cannot remove stale {}: {e}",
                breakdown.display()
            ))
        })?;

        let outcome = self
            .command(&cfg_name)
            .current_dir(&case.workspace)
            .timeout(self.timeout)
            .transcript(case.workspace.join("su2.log"))
            .run()
            .await
            .map_err(|e| CaseError::Solver(e.to_string()))?;

        if !outcome.success() {
            return Err(CaseError::Solver(format!(
                "SU2_CFD exited with {}: {}",
                outcome.status,
                outcome.last_diagnostic().unwrap_or("no output")
            )));
        }

        if !tokio::fs::try_exists(&breakdown).await.unwrap_or(false) {
            return Err(CaseError::Solver(format!(
                "solver finished but {} is missing",
                breakdown.display()
            )));
        }

        info!(elapsed_ms = outcome.elapsed.as_millis(), "solver finished");
        Ok(breakdown)
    }
}
