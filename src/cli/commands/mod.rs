//! CLI command implementations.

pub mod check;
pub mod grid;
pub mod init;
pub mod run;
