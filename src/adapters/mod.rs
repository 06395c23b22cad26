//! Adapters for the filesystem and the external Gmsh/SU2 toolchain.

pub mod geometry;
pub mod gmsh;
pub mod process;
pub mod result_log;
pub mod su2;
pub mod toolchain;

pub use geometry::CsvAirfoilLoader;
pub use gmsh::GmshMeshGenerator;
pub use process::{ExternalCommand, ProcessError, ProcessOutcome};
pub use result_log::FileResultStore;
pub use su2::{Su2BreakdownExtractor, Su2MeshConditioner, Su2Solver};
pub use toolchain::{resolve_executable, ResolvedToolchain, ToolchainCheck};
