//! Port trait definitions (Hexagonal Architecture)
//!
//! This module defines async trait interfaces that adapters must implement:
//! - CaseRunner: one sample pair end to end
//! - GeometryLoader, MeshGenerator, MeshRepairer, FlowSolver, ResultExtractor:
//!   the individual case stages
//! - ResultStore: the durable result log
//!
//! These traits keep the orchestration independent of Gmsh, SU2 and the
//! file layout they use.

pub mod case_runner;
pub mod case_stages;
pub mod result_store;

pub use case_runner::{CaseContext, CaseRunner};
pub use case_stages::{FlowSolver, GeometryLoader, MeshGenerator, MeshRepairer, ResultExtractor};
pub use result_store::ResultStore;
