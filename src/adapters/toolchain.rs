//! Startup check for the external executables a sweep needs.

use std::path::{Path, PathBuf};
use std::time::Duration;

use tracing::{debug, info};

use crate::adapters::su2::su2_cfd_binary;
use crate::domain::errors::{SweepError, SweepResult};
use crate::domain::models::ToolchainConfig;

/// Executables resolved to absolute paths.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedToolchain {
    pub gmsh: PathBuf,
    pub su2_cfd: PathBuf,
    /// Present only when the solver runs on more than one core.
    pub launcher: Option<PathBuf>,
    pub cores: u32,
    pub mesh_timeout: Duration,
    pub solver_timeout: Duration,
}

/// Resolves and validates every configured executable before any case runs.
pub struct ToolchainCheck<'a> {
    config: &'a ToolchainConfig,
}

impl<'a> ToolchainCheck<'a> {
    pub fn new(config: &'a ToolchainConfig) -> Self {
        Self { config }
    }

    /// Resolve all executables, collecting every problem into one error.
    pub fn resolve(&self) -> SweepResult<ResolvedToolchain> {
        let mut problems = Vec::new();

        let gmsh = resolve_executable(&self.config.gmsh_path)
            .map_err(|e| problems.push(format!("gmsh: {e}")))
            .ok();
        let su2_cfd = resolve_executable(&su2_cfd_binary(&self.config.su2_bin_dir))
            .map_err(|e| problems.push(format!("SU2_CFD: {e}")))
            .ok();

        let launcher = match (&self.config.mpi_launcher, self.config.cores) {
            (Some(name), cores) if cores > 1 => resolve_executable(Path::new(name))
                .map_err(|e| problems.push(format!("MPI launcher: {e}")))
                .ok(),
            (None, cores) if cores > 1 => {
                problems.push(format!("{cores} cores requested but no mpi_launcher is set"));
                None
            }
            _ => None,
        };

        if !problems.is_empty() {
            return Err(SweepError::StartupConfig(problems.join("; ")));
        }
        let (Some(gmsh), Some(su2_cfd)) = (gmsh, su2_cfd) else {
            return Err(SweepError::StartupConfig("toolchain unresolved".to_string()));
        };

        info!(
            gmsh = %gmsh.display(),
            su2_cfd = %su2_cfd.display(),
            launcher = ?launcher,
            cores = self.config.cores,
            "toolchain resolved"
        );

        Ok(ResolvedToolchain {
            gmsh,
            su2_cfd,
            launcher,
            cores: self.config.cores,
            mesh_timeout: Duration::from_secs(self.config.mesh_timeout_secs),
            solver_timeout: Duration::from_secs(self.config.solver_timeout_secs),
        })
    }
}

/// Find `program` as given (when it has a directory part) or on `PATH`.
pub fn resolve_executable(program: &Path) -> Result<PathBuf, String> {
    let has_dir = program.components().count() > 1 || program.is_absolute();
    if has_dir {
        return checked(program)
            .ok_or_else(|| format!("{} is not an executable file", program.display()));
    }

    let path_var = std::env::var_os("PATH").unwrap_or_default();
    for dir in std::env::split_paths(&path_var) {
        let candidate = dir.join(program);
        if let Some(found) = checked(&candidate) {
            debug!(program = %program.display(), found = %found.display(), "found on PATH");
            return Ok(found);
        }
        if !std::env::consts::EXE_SUFFIX.is_empty() {
            let with_suffix =
                dir.join(format!("{}{}", program.display(), std::env::consts::EXE_SUFFIX));
            if let Some(found) = checked(&with_suffix) {
                return Ok(found);
            }
        }
    }
    Err(format!("{} not found on PATH", program.display()))
}

fn checked(candidate: &Path) -> Option<PathBuf> {
    let metadata = std::fs::metadata(candidate).ok()?;
    if !metadata.is_file() || !is_executable(&metadata) {
        return None;
    }
    std::fs::canonicalize(candidate).ok()
}

#[cfg(unix)]
fn is_executable(metadata: &std::fs::Metadata) -> bool {
    use std::os::unix::fs::PermissionsExt;
    metadata.permissions().mode() & 0o111 != 0
}

#[cfg(not(unix))]
fn is_executable(_metadata: &std::fs::Metadata) -> bool {
    true
}
