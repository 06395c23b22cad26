use std::path::Path;

use anyhow::{Context, Result};
use figment::providers::{Env, Format, Serialized, Yaml};
use figment::Figment;
use thiserror::Error;

use crate::domain::models::config::Config;
use crate::domain::models::ParameterGrid;

/// Project configuration file, created by `init`
pub const CONFIG_FILE: &str = "meshsweep.yaml";

/// Optional local overrides, not meant to be committed
pub const LOCAL_CONFIG_FILE: &str = "meshsweep.local.yaml";

/// Prefix of environment variable overrides; nesting uses `__`
pub const ENV_PREFIX: &str = "MESHSWEEP_";

/// Configuration error types
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("{0} cannot be empty")]
    EmptyField(&'static str),

    #[error("Invalid project_prefix '{0}': must not contain path separators")]
    InvalidProjectPrefix(String),

    #[error("Invalid cores: {0}. Must be at least 1")]
    InvalidCores(u32),

    #[error("Invalid {0}: must be at least 1 second")]
    InvalidTimeout(&'static str),

    #[error("Invalid log level: {0}. Must be one of: trace, debug, info, warn, error")]
    InvalidLogLevel(String),

    #[error("Invalid farfield_radius: {0}. Must be a finite number above 1")]
    InvalidFarfieldRadius(f64),

    #[error("Invalid sweep: {0}")]
    InvalidSweep(String),

    #[error("Solver option keys cannot be empty")]
    EmptySolverKey,
}

/// Configuration loader with hierarchical merging
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration with hierarchical merging
    ///
    /// Precedence (lowest to highest):
    /// 1. Programmatic defaults (Serialized)
    /// 2. meshsweep.yaml (project config, created by init)
    /// 3. meshsweep.local.yaml (local overrides, optional)
    /// 4. Environment variables (MESHSWEEP_* prefix, highest priority)
    pub fn load() -> Result<Config> {
        let config: Config = Figment::new()
            .merge(Serialized::defaults(Config::default()))
            .merge(Yaml::file(CONFIG_FILE))
            .merge(Yaml::file(LOCAL_CONFIG_FILE))
            .merge(Env::prefixed(ENV_PREFIX).split("__"))
            .extract()
            .context("Failed to extract configuration from figment")?;

        Self::validate(&config)?;
        Ok(config)
    }

    /// Load configuration from a specific file, still honouring environment overrides
    pub fn load_from_file(path: impl AsRef<Path>) -> Result<Config> {
        let path = path.as_ref();
        if !path.exists() {
            anyhow::bail!("Config file {} does not exist", path.display());
        }
        let config: Config = Figment::new()
            .merge(Serialized::defaults(Config::default()))
            .merge(Yaml::file(path))
            .merge(Env::prefixed(ENV_PREFIX).split("__"))
            .extract()
            .with_context(|| format!("Failed to load config from {}", path.display()))?;

        Self::validate(&config)?;
        Ok(config)
    }

    /// Explicit file when given, the default hierarchy otherwise
    pub fn resolve(path: Option<&Path>) -> Result<Config> {
        match path {
            Some(path) => Self::load_from_file(path),
            None => Self::load(),
        }
    }

    /// Validate configuration after loading
    pub fn validate(config: &Config) -> Result<(), ConfigError> {
        if config.working_dir.as_os_str().is_empty() {
            return Err(ConfigError::EmptyField("working_dir"));
        }
        if config.geometry_file.as_os_str().is_empty() {
            return Err(ConfigError::EmptyField("geometry_file"));
        }
        if config.result_file.trim().is_empty() {
            return Err(ConfigError::EmptyField("result_file"));
        }
        if config.project_prefix.is_empty() {
            return Err(ConfigError::EmptyField("project_prefix"));
        }
        if config.project_prefix.contains(['/', '\\']) {
            return Err(ConfigError::InvalidProjectPrefix(
                config.project_prefix.clone(),
            ));
        }

        // Toolchain
        if config.toolchain.gmsh_path.as_os_str().is_empty() {
            return Err(ConfigError::EmptyField("toolchain.gmsh_path"));
        }
        if config.toolchain.cores == 0 {
            return Err(ConfigError::InvalidCores(config.toolchain.cores));
        }
        if config.toolchain.mesh_timeout_secs == 0 {
            return Err(ConfigError::InvalidTimeout("mesh_timeout_secs"));
        }
        if config.toolchain.solver_timeout_secs == 0 {
            return Err(ConfigError::InvalidTimeout("solver_timeout_secs"));
        }

        // Mesh
        let radius = config.mesh.farfield_radius;
        if !radius.is_finite() || radius <= 1.0 {
            return Err(ConfigError::InvalidFarfieldRadius(radius));
        }
        if config.mesh.airfoil_marker.is_empty() {
            return Err(ConfigError::EmptyField("mesh.airfoil_marker"));
        }
        if config.mesh.farfield_marker.is_empty() {
            return Err(ConfigError::EmptyField("mesh.farfield_marker"));
        }

        ParameterGrid::new(&config.sweep.inner_axis(), &config.sweep.outer_axis())
            .map_err(|e| ConfigError::InvalidSweep(e.to_string()))?;

        if config.solver.iter().any(|(key, _)| key.trim().is_empty()) {
            return Err(ConfigError::EmptySolverKey);
        }

        let valid_log_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_log_levels.contains(&config.logging.level.to_lowercase().as_str()) {
            return Err(ConfigError::InvalidLogLevel(config.logging.level.clone()));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;
    use std::path::PathBuf;

    use tempfile::NamedTempFile;

    use super::*;
    use crate::domain::models::config::LogFormat;
    use crate::domain::models::AxisSpec;

    fn yaml_file(contents: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, "{contents}").unwrap();
        file.flush().unwrap();
        file
    }

    #[test]
    fn test_default_config_is_valid() {
        let config = Config::default();
        ConfigLoader::validate(&config).expect("Default config should be valid");
    }

    #[test]
    fn test_load_from_file_merges_over_defaults() {
        let file = yaml_file(
            "working_dir: /scratch/sweep
toolchain:
  cores: 16
solver:
  MACH_NUMBER: 0.78
logging:
  format: json
",
        );
        let config = ConfigLoader::load_from_file(file.path()).unwrap();
        assert_eq!(config.working_dir, PathBuf::from("/scratch/sweep"));
        assert_eq!(config.toolchain.cores, 16);
        assert_eq!(config.toolchain.solver_timeout_secs, 7200);
        assert_eq!(config.solver.get("MACH_NUMBER"), Some("0.78"));
        assert_eq!(config.solver.get("PHYSICAL_PROBLEM"), Some("EULER"));
        assert_eq!(config.logging.format, LogFormat::Json);
    }

    #[test]
    fn test_env_override() {
        let file = yaml_file("toolchain:\n  cores: 2\n");
        temp_env::with_vars(
            [
                ("MESHSWEEP_TOOLCHAIN__CORES", Some("8")),
                ("MESHSWEEP_RESUME", Some("true")),
                ("MESHSWEEP_LOGGING__LEVEL", Some("debug")),
            ],
            || {
                let config = ConfigLoader::load_from_file(file.path()).unwrap();
                assert_eq!(config.toolchain.cores, 8, "Environment should win");
                assert!(config.resume);
                assert_eq!(config.logging.level, "debug");
            },
        );
    }

    #[test]
    fn test_configured_axis_replaces_default() {
        let file = yaml_file("sweep:\n  inner:\n    values: [0.05, 0.01]\n");
        let config = ConfigLoader::load_from_file(file.path()).unwrap();
        assert_eq!(config.sweep.inner_axis().values(), vec![0.05, 0.01]);
        assert_eq!(config.sweep.outer_axis().values().len(), 21);
    }

    #[test]
    fn test_missing_explicit_file_is_an_error() {
        let err = ConfigLoader::load_from_file("/nonexistent/meshsweep.yaml").unwrap_err();
        assert!(err.to_string().contains("does not exist"));
    }

    #[test]
    fn test_unknown_log_format_fails_to_load() {
        let file = yaml_file("logging:\n  format: xml\n");
        assert!(ConfigLoader::load_from_file(file.path()).is_err());
    }

    #[test]
    fn test_hierarchical_merging() {
        let base = yaml_file("project_prefix: base\nlogging:\n  level: info\n  format: json\n");
        let local = yaml_file("project_prefix: local\nlogging:\n  level: debug\n");

        let config: Config = Figment::new()
            .merge(Serialized::defaults(Config::default()))
            .merge(Yaml::file(base.path()))
            .merge(Yaml::file(local.path()))
            .extract()
            .unwrap();

        assert_eq!(config.project_prefix, "local", "Override should win");
        assert_eq!(config.logging.level, "debug");
        assert_eq!(
            config.logging.format,
            LogFormat::Json,
            "Base value should persist when not overridden"
        );
    }

    #[test]
    fn test_validate_empty_working_dir() {
        let config = Config {
            working_dir: PathBuf::new(),
            ..Default::default()
        };
        assert!(matches!(
            ConfigLoader::validate(&config),
            Err(ConfigError::EmptyField("working_dir"))
        ));
    }

    #[test]
    fn test_validate_empty_result_file() {
        let mut config = Config::default();
        config.result_file = "  ".to_string();
        assert!(matches!(
            ConfigLoader::validate(&config),
            Err(ConfigError::EmptyField("result_file"))
        ));
    }

    #[test]
    fn test_validate_prefix_with_separator() {
        let mut config = Config::default();
        config.project_prefix = "a/b".to_string();
        assert!(matches!(
            ConfigLoader::validate(&config),
            Err(ConfigError::InvalidProjectPrefix(_))
        ));
    }

    #[test]
    fn test_validate_zero_cores() {
        let mut config = Config::default();
        config.toolchain.cores = 0;
        assert!(matches!(
            ConfigLoader::validate(&config),
            Err(ConfigError::InvalidCores(0))
        ));
    }

    #[test]
    fn test_validate_zero_timeout() {
        let mut config = Config::default();
        config.toolchain.solver_timeout_secs = 0;
        assert!(matches!(
            ConfigLoader::validate(&config),
            Err(ConfigError::InvalidTimeout("solver_timeout_secs"))
        ));
    }

    #[test]
    fn test_validate_invalid_log_level() {
        let mut config = Config::default();
        config.logging.level = "loud".to_string();
        match ConfigLoader::validate(&config) {
            Err(ConfigError::InvalidLogLevel(level)) => assert_eq!(level, "loud"),
            other => panic!("Expected InvalidLogLevel error, got {other:?}"),
        }
    }

    #[test]
    fn test_validate_inverted_axis() {
        let mut config = Config::default();
        config.sweep.inner = Some(AxisSpec::linear(0.1, 0.001, 5));
        match ConfigLoader::validate(&config) {
            Err(ConfigError::InvalidSweep(msg)) => assert!(msg.contains("inner")),
            other => panic!("Expected InvalidSweep error, got {other:?}"),
        }
    }

    #[test]
    fn test_validate_small_farfield() {
        let mut config = Config::default();
        config.mesh.farfield_radius = 0.5;
        assert!(matches!(
            ConfigLoader::validate(&config),
            Err(ConfigError::InvalidFarfieldRadius(_))
        ));
    }

    #[test]
    fn test_validate_empty_solver_key() {
        let mut config = Config::default();
        config.solver = config.solver.clone().with("", "1");
        assert!(matches!(
            ConfigLoader::validate(&config),
            Err(ConfigError::EmptySolverKey)
        ));
    }
}
