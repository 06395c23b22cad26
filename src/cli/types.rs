//! CLI type definitions
//!
//! This module contains clap command structures that define the CLI interface.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::cli::commands::{check::CheckArgs, grid::GridArgs, init::InitArgs, run::RunArgs};

#[derive(Parser, Debug)]
#[command(name = "meshsweep")]
#[command(about = "Mesh-convergence sweeps of an airfoil with Gmsh and SU2", long_about = None)]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Output in JSON format
    #[arg(short, long, global = true)]
    pub json: bool,

    /// Configuration file (default: meshsweep.yaml, meshsweep.local.yaml, MESHSWEEP_* env)
    #[arg(short, long, global = true, env = "MESHSWEEP_CONFIG")]
    pub config: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Write a default meshsweep.yaml
    Init(InitArgs),

    /// Verify that gmsh, SU2_CFD and the MPI launcher can be found
    Check(CheckArgs),

    /// Run the full density sweep
    Run(RunArgs),

    /// Show the result log as coefficient matrices
    Grid(GridArgs),
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::commands::grid::MetricArg;

    #[test]
    fn cli_definition_is_consistent() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }

    #[test]
    fn run_flags_parse() {
        let cli = Cli::parse_from(["meshsweep", "run", "--resume", "--no-progress"]);
        match cli.command {
            Commands::Run(args) => {
                assert!(args.resume);
                assert!(args.no_progress);
            }
            other => panic!("expected run, got {other:?}"),
        }
    }

    #[test]
    fn global_flags_follow_subcommand() {
        let cli = Cli::parse_from(["meshsweep", "grid", "--json", "--config", "alt.yaml"]);
        assert!(cli.json);
        assert_eq!(cli.config, Some(PathBuf::from("alt.yaml")));
    }

    #[test]
    fn grid_metric_defaults_to_all() {
        let cli = Cli::parse_from(["meshsweep", "grid"]);
        let Commands::Grid(args) = cli.command else {
            panic!("expected grid");
        };
        assert_eq!(args.metric, MetricArg::All);
        assert!(!args.plan);
    }

    #[test]
    fn unknown_metric_is_rejected() {
        assert!(Cli::try_parse_from(["meshsweep", "grid", "--metric", "pressure"]).is_err());
    }
}
