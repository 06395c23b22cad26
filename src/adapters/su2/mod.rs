//! SU2 adapters: mesh conditioning, solver launch and result extraction.

pub mod breakdown;
pub mod conditioner;
pub mod solver;

pub use breakdown::Su2BreakdownExtractor;
pub use conditioner::{ConditionedMesh, Su2MeshConditioner};
pub use solver::{su2_cfd_binary, Su2Solver, BREAKDOWN_FILE};
