//! Implementation of the `meshsweep check` command.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use serde::Serialize;

use crate::adapters::{CsvAirfoilLoader, ToolchainCheck};
use crate::cli::output::{output, CommandOutput};
use crate::domain::models::{Config, ParameterGrid};
use crate::domain::ports::GeometryLoader;

#[derive(Args, Debug)]
pub struct CheckArgs {
    /// Also load and validate the airfoil geometry file
    #[arg(long)]
    pub geometry: bool,
}

#[derive(Debug, Serialize)]
pub struct CheckOutput {
    pub gmsh: PathBuf,
    pub su2_cfd: PathBuf,
    pub launcher: Option<PathBuf>,
    pub cores: u32,
    pub planned_cases: usize,
    pub result_log: PathBuf,
    pub geometry_points: Option<usize>,
}

impl CommandOutput for CheckOutput {
    fn to_human(&self) -> String {
        let mut lines = vec![
            "Toolchain OK".to_string(),
            format!("  gmsh:     {}", self.gmsh.display()),
            format!("  SU2_CFD:  {}", self.su2_cfd.display()),
        ];
        match &self.launcher {
            Some(launcher) => lines.push(format!(
                "  launcher: {} ({} cores)",
                launcher.display(),
                self.cores
            )),
            None => lines.push("  launcher: none (serial solver)".to_string()),
        }
        if let Some(points) = self.geometry_points {
            lines.push(format!("  geometry: {points} points"));
        }
        lines.push(format!(
            "\n{} cases planned, results in {}",
            self.planned_cases,
            self.result_log.display()
        ));
        lines.join("\n")
    }

    fn to_json(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or_default()
    }
}

pub async fn execute(args: CheckArgs, config: &Config, json_mode: bool) -> Result<()> {
    let toolchain = ToolchainCheck::new(&config.toolchain).resolve()?;
    let grid = ParameterGrid::new(&config.sweep.inner_axis(), &config.sweep.outer_axis())?;

    let geometry_points = if args.geometry {
        let airfoil = CsvAirfoilLoader::new(&config.geometry_file)
            .load()
            .await
            .with_context(|| format!("Geometry check failed for {}", config.geometry_file.display()))?;
        Some(airfoil.open_points().len())
    } else {
        None
    };

    let output_data = CheckOutput {
        gmsh: toolchain.gmsh,
        su2_cfd: toolchain.su2_cfd,
        launcher: toolchain.launcher,
        cores: toolchain.cores,
        planned_cases: grid.len(),
        result_log: config.result_log_path(),
        geometry_points,
    };
    output(&output_data, json_mode);
    Ok(())
}
