//! meshsweep - mesh-convergence sweeps for an airfoil
//!
//! Runs one Gmsh + SU2 case per (inner, outer) mesh density pair and
//! appends the resulting lift, drag, moment and efficiency to a durable
//! result log that can be reshaped into coefficient matrices.
//!
//! # Architecture
//!
//! This crate follows Hexagonal Architecture principles:
//!
//! - **Domain Layer** (`domain`): grid, sample and record models, errors and port traits
//! - **Adapters** (`adapters`): Gmsh, SU2, geometry files and the result log
//! - **Service Layer** (`services`): sweep orchestration and result reshaping
//! - **Infrastructure Layer** (`infrastructure`): configuration and logging
//! - **CLI Layer** (`cli`): Command-line interface
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use meshsweep::{ConvergenceRunner, FileResultStore, SweepSettings};
//!
//! let store = FileResultStore::open(config.result_log_path()).await?;
//! let mut sweep = ConvergenceRunner::new(SweepSettings::from(&config), case_runner, Box::new(store));
//! let report = sweep.run().await?;
//! ```

pub mod adapters;
pub mod cli;
pub mod domain;
pub mod infrastructure;
pub mod services;

// Re-export commonly used types for convenience
pub use adapters::{FileResultStore, ToolchainCheck};
pub use domain::models::{
    AxisSpec, Config, ParameterGrid, ProjectIdentifier, ResultRecord, SamplePair, SweepReport,
};
pub use domain::{CaseError, CaseStage, SweepError};
pub use infrastructure::config::ConfigLoader;
pub use services::{ConvergenceRunner, ResultGrid, ResultGridBuilder, SweepSettings};
