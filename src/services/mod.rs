//! Sweep orchestration services.

pub mod case_runner;
pub mod convergence_runner;
pub mod result_grid;
pub mod workspace;

pub use case_runner::{PipelineCaseRunner, PIPELINE};
pub use convergence_runner::{ConvergenceRunner, NoopObserver, SweepObserver, SweepSettings};
pub use result_grid::{Matrix, Metric, ResultGrid, ResultGridBuilder};
pub use workspace::ProjectWorkspace;
