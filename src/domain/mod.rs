//! Domain layer for the sweep harness
//!
//! Core models (grid, samples, records), error types and the port traits
//! that external collaborators implement.

pub mod errors;
pub mod models;
pub mod ports;

// Re-export error types for convenient access
pub use errors::{CaseError, CaseResult, CaseStage, SweepError, SweepResult};
