use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::domain::models::grid::AxisSpec;
use crate::domain::models::solver_config::SolverConfig;

/// Main configuration structure for a sweep
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct Config {
    /// Root directory for per-case workspaces and the result log
    #[serde(default = "default_working_dir")]
    pub working_dir: PathBuf,

    /// Airfoil coordinate file (CSV of x,y pairs)
    #[serde(default = "default_geometry_file")]
    pub geometry_file: PathBuf,

    /// Result log file name, relative to `working_dir`
    #[serde(default = "default_result_file")]
    pub result_file: String,

    /// Prefix of every case workspace name
    #[serde(default = "default_project_prefix")]
    pub project_prefix: String,

    /// Skip pairs already present in the result log
    #[serde(default)]
    pub resume: bool,

    /// External executables
    #[serde(default)]
    pub toolchain: ToolchainConfig,

    /// Density axes
    #[serde(default)]
    pub sweep: SweepConfig,

    /// Mesh generation options
    #[serde(default)]
    pub mesh: MeshConfig,

    /// Solver options shared by all cases
    #[serde(default)]
    pub solver: SolverConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

fn default_working_dir() -> PathBuf {
    PathBuf::from("dataOut")
}

fn default_geometry_file() -> PathBuf {
    PathBuf::from("dataIn/naca641-212.csv")
}

fn default_result_file() -> String {
    "convergenceResult.txt".to_string()
}

fn default_project_prefix() -> String {
    "nacaMesh".to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            working_dir: default_working_dir(),
            geometry_file: default_geometry_file(),
            result_file: default_result_file(),
            project_prefix: default_project_prefix(),
            resume: false,
            toolchain: ToolchainConfig::default(),
            sweep: SweepConfig::default(),
            mesh: MeshConfig::default(),
            solver: SolverConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

impl Config {
    /// Full path of the result log.
    pub fn result_log_path(&self) -> PathBuf {
        self.working_dir.join(&self.result_file)
    }
}

/// External tool locations and limits
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct ToolchainConfig {
    /// Path to the gmsh executable
    #[serde(default = "default_gmsh_path")]
    pub gmsh_path: PathBuf,

    /// Directory containing `SU2_CFD`
    #[serde(default = "default_su2_bin_dir")]
    pub su2_bin_dir: PathBuf,

    /// MPI launcher used when `cores > 1` (e.g. `mpiexec`); `None` runs serial
    #[serde(default = "default_mpi_launcher")]
    pub mpi_launcher: Option<String>,

    /// Solver worker processes
    #[serde(default = "default_cores")]
    pub cores: u32,

    /// Mesh generation time limit in seconds
    #[serde(default = "default_mesh_timeout_secs")]
    pub mesh_timeout_secs: u64,

    /// Solver time limit in seconds
    #[serde(default = "default_solver_timeout_secs")]
    pub solver_timeout_secs: u64,
}

fn default_gmsh_path() -> PathBuf {
    PathBuf::from("gmsh/gmsh")
}

fn default_su2_bin_dir() -> PathBuf {
    PathBuf::from("su2/bin")
}

#[allow(clippy::unnecessary_wraps)]
fn default_mpi_launcher() -> Option<String> {
    Some("mpiexec".to_string())
}

const fn default_cores() -> u32 {
    4
}

const fn default_mesh_timeout_secs() -> u64 {
    600
}

const fn default_solver_timeout_secs() -> u64 {
    7200
}

impl Default for ToolchainConfig {
    fn default() -> Self {
        Self {
            gmsh_path: default_gmsh_path(),
            su2_bin_dir: default_su2_bin_dir(),
            mpi_launcher: default_mpi_launcher(),
            cores: default_cores(),
            mesh_timeout_secs: default_mesh_timeout_secs(),
            solver_timeout_secs: default_solver_timeout_secs(),
        }
    }
}

/// Density axes of the sweep
///
/// An unset axis falls back to the reference study. Axes are optional so a
/// configured axis replaces the default as a whole instead of being merged
/// key by key with it.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct SweepConfig {
    /// Mesh size at the airfoil surface
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub inner: Option<AxisSpec>,

    /// Mesh size at the far-field boundary
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub outer: Option<AxisSpec>,
}

fn default_inner_axis() -> AxisSpec {
    AxisSpec::linear(0.001, 0.1, 21).reversed()
}

fn default_outer_axis() -> AxisSpec {
    AxisSpec::linear(0.1, 2.0, 21).reversed()
}

impl SweepConfig {
    /// Both axes spelled out, as written by `init`.
    pub fn reference() -> Self {
        Self {
            inner: Some(default_inner_axis()),
            outer: Some(default_outer_axis()),
        }
    }

    pub fn inner_axis(&self) -> AxisSpec {
        self.inner.clone().unwrap_or_else(default_inner_axis)
    }

    pub fn outer_axis(&self) -> AxisSpec {
        self.outer.clone().unwrap_or_else(default_outer_axis)
    }
}

/// Geometry of the generated mesh
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct MeshConfig {
    /// Far-field radius in chord lengths
    #[serde(default = "default_farfield_radius")]
    pub farfield_radius: f64,

    /// Physical name of the airfoil wall
    #[serde(default = "default_airfoil_marker")]
    pub airfoil_marker: String,

    /// Physical name of the far-field boundary
    #[serde(default = "default_farfield_marker")]
    pub farfield_marker: String,
}

const fn default_farfield_radius() -> f64 {
    20.0
}

fn default_airfoil_marker() -> String {
    "airfoil".to_string()
}

fn default_farfield_marker() -> String {
    "farfield".to_string()
}

impl Default for MeshConfig {
    fn default() -> Self {
        Self {
            farfield_radius: default_farfield_radius(),
            airfoil_marker: default_airfoil_marker(),
            farfield_marker: default_farfield_marker(),
        }
    }
}

/// Log output format
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    Json,
    Pretty,
}

/// Rotation of the optional log file
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum RotationPolicy {
    #[default]
    Daily,
    Hourly,
    Never,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct LoggingConfig {
    /// Log level: trace, debug, info, warn, error
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Log format: json or pretty
    #[serde(default = "default_log_format")]
    pub format: LogFormat,

    /// Directory for rolling log files (stderr only when unset)
    #[serde(default)]
    pub log_dir: Option<PathBuf>,

    /// Log file rotation
    #[serde(default)]
    pub rotation: RotationPolicy,
}

fn default_log_level() -> String {
    "info".to_string()
}

const fn default_log_format() -> LogFormat {
    LogFormat::Pretty
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
            log_dir: None,
            rotation: RotationPolicy::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_reproduce_reference_study() {
        let config = Config::default();
        assert_eq!(config.result_log_path(), PathBuf::from("dataOut/convergenceResult.txt"));
        assert_eq!(config.toolchain.cores, 4);
        assert_eq!(config.sweep.inner_axis().values().len(), 21);
        assert_eq!(config.sweep.inner_axis().values()[0], 0.1);
        assert_eq!(config.sweep.outer_axis().values()[20], 0.1);
        assert!(!config.resume);
    }

    #[test]
    fn partial_yaml_keeps_defaults() {
        let yaml = "
working_dir: /tmp/sweep
toolchain:
  cores: 8
sweep:
  inner:
    values: [0.01, 0.05]
";
        let config: Config = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(config.working_dir, PathBuf::from("/tmp/sweep"));
        assert_eq!(config.toolchain.cores, 8);
        assert_eq!(config.toolchain.mpi_launcher.as_deref(), Some("mpiexec"));
        assert_eq!(config.sweep.inner_axis().values(), vec![0.01, 0.05]);
        assert_eq!(config.sweep.outer_axis().values().len(), 21);
        assert_eq!(config.logging.format, LogFormat::Pretty);
    }

    #[test]
    fn reference_sweep_matches_fallback() {
        let reference = SweepConfig::reference();
        let unset = SweepConfig::default();
        assert_eq!(reference.inner_axis(), unset.inner_axis());
        assert_eq!(reference.outer_axis(), unset.outer_axis());
        assert!(unset.inner.is_none());
    }

    #[test]
    fn serial_solver_is_expressible() {
        let config: Config = serde_yaml::from_str("toolchain:\n  mpi_launcher: null\n").unwrap();
        assert!(config.toolchain.mpi_launcher.is_none());
    }
}
