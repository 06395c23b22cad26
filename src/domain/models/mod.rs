pub mod airfoil;
pub mod config;
pub mod grid;
pub mod report;
pub mod result;
pub mod sample;
pub mod solver_config;

pub use airfoil::Airfoil;
pub use config::{
    Config, LogFormat, LoggingConfig, MeshConfig, RotationPolicy, SweepConfig, ToolchainConfig,
};
pub use grid::{linspace, AxisSpec, ParameterGrid};
pub use report::{CaseFailure, SweepReport};
pub use result::{Coefficients, ResultRecord, RECORD_FIELDS};
pub use sample::{ProjectIdentifier, SamplePair, IDENTIFIER_SCALE};
pub use solver_config::SolverConfig;
