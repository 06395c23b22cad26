//! Domain errors for the sweep harness.
//!
//! Two families live here. [`SweepError`] is fatal and terminates a run.
//! [`CaseError`] belongs to a single sample pair: the runner records it and
//! moves on to the next cell.

use std::fmt;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Pipeline stage a case was executing when it failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CaseStage {
    GeometryLoad,
    MeshGeneration,
    MeshRepair,
    Solve,
    ResultExtraction,
}

impl CaseStage {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::GeometryLoad => "geometry_load",
            Self::MeshGeneration => "mesh_generation",
            Self::MeshRepair => "mesh_repair",
            Self::Solve => "solve",
            Self::ResultExtraction => "result_extraction",
        }
    }
}

impl fmt::Display for CaseStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Per-cell failure. Never aborts the sweep.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum CaseError {
    #[error("Geometry load failed: {0}")]
    GeometryLoad(String),

    #[error("Mesh generation failed: {0}")]
    MeshGeneration(String),

    #[error("Mesh repair failed: {0}")]
    MeshRepair(String),

    #[error("Solver failed: {0}")]
    Solver(String),

    #[error("Result parse failed: {0}")]
    ResultParse(String),
}

impl CaseError {
    /// Stage that produced this error.
    pub fn stage(&self) -> CaseStage {
        match self {
            Self::GeometryLoad(_) => CaseStage::GeometryLoad,
            Self::MeshGeneration(_) => CaseStage::MeshGeneration,
            Self::MeshRepair(_) => CaseStage::MeshRepair,
            Self::Solver(_) => CaseStage::Solve,
            Self::ResultParse(_) => CaseStage::ResultExtraction,
        }
    }

    /// Message without the stage prefix.
    pub fn detail(&self) -> &str {
        match self {
            Self::GeometryLoad(m)
            | Self::MeshGeneration(m)
            | Self::MeshRepair(m)
            | Self::Solver(m)
            | Self::ResultParse(m) => m,
        }
    }
}

/// Run-level errors. Any of these terminates the sweep.
#[derive(Debug, Error)]
pub enum SweepError {
    #[error("Startup configuration error: {0}")]
    StartupConfig(String),

    #[error("Invalid parameter grid: {0}")]
    InvalidGrid(String),

    #[error("Project identifier collision: {identifier} is produced by {first} and {second}")]
    IdentifierCollision {
        identifier: String,
        first: String,
        second: String,
    },

    #[error("Failed to prepare workspace {path}: {source}")]
    Workspace {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Result log I/O failed on {path}: {source}")]
    ResultStoreIo {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Malformed result log {path} at line {line}: {reason}")]
    ResultLogParse {
        path: PathBuf,
        line: usize,
        reason: String,
    },
}

pub type SweepResult<T> = Result<T, SweepError>;

pub type CaseResult<T> = Result<T, CaseError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn case_error_maps_to_stage() {
        assert_eq!(
            CaseError::GeometryLoad("x".into()).stage(),
            CaseStage::GeometryLoad
        );
        assert_eq!(
            CaseError::MeshGeneration("x".into()).stage(),
            CaseStage::MeshGeneration
        );
        assert_eq!(CaseError::MeshRepair("x".into()).stage(), CaseStage::MeshRepair);
        assert_eq!(CaseError::Solver("x".into()).stage(), CaseStage::Solve);
        assert_eq!(
            CaseError::ResultParse("x".into()).stage(),
            CaseStage::ResultExtraction
        );
    }

    #[test]
    fn case_error_detail_strips_prefix() {
        let err = CaseError::Solver("exit status 1".into());
        assert_eq!(err.detail(), "exit status 1");
        assert_eq!(err.to_string(), "Solver failed: exit status 1");
    }

    #[test]
    fn collision_message_names_both_pairs() {
        let err = SweepError::IdentifierCollision {
            identifier: "case_i000001000_o000500000".into(),
            first: "(0.001, 0.5)".into(),
            second: "(0.0010000001, 0.5)".into(),
        };
        let msg = err.to_string();
        assert!(msg.contains("(0.001, 0.5)"));
        assert!(msg.contains("(0.0010000001, 0.5)"));
    }
}
