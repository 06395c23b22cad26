//! Implementation of the `meshsweep init` command.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use tokio::fs;

use crate::cli::output::{output, CommandOutput};
use crate::domain::models::{Config, SweepConfig};
use crate::infrastructure::config::CONFIG_FILE;

#[derive(Args, Debug)]
pub struct InitArgs {
    /// Overwrite an existing configuration file
    #[arg(long, short)]
    pub force: bool,

    /// Target directory (defaults to current directory)
    #[arg(default_value = ".")]
    pub path: PathBuf,
}

#[derive(Debug, serde::Serialize)]
pub struct InitOutput {
    pub success: bool,
    pub message: String,
    pub config_path: PathBuf,
}

impl CommandOutput for InitOutput {
    fn to_human(&self) -> String {
        if self.success {
            format!(
                "{}\n\nEdit {} to point at your gmsh and SU2 installs, then run `meshsweep check`.",
                self.message,
                self.config_path.display()
            )
        } else {
            self.message.clone()
        }
    }

    fn to_json(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or_default()
    }
}

/// Default configuration with every section spelled out.
pub fn default_config_yaml() -> Result<String> {
    let config = Config {
        sweep: SweepConfig::reference(),
        ..Config::default()
    };
    let body = serde_yaml::to_string(&config).context("Failed to serialize default config")?;
    Ok(format!(
        "# meshsweep configuration\n# Environment variables MESHSWEEP_<SECTION>__<KEY> override these values.\n{body}"
    ))
}

pub async fn execute(args: InitArgs, json_mode: bool) -> Result<()> {
    let target_dir = if args.path.is_absolute() {
        args.path.clone()
    } else {
        std::env::current_dir()
            .context("Failed to get current directory")?
            .join(&args.path)
    };
    let config_path = target_dir.join(CONFIG_FILE);

    if config_path.exists() && !args.force {
        let output_data = InitOutput {
            success: false,
            message: format!(
                "{} already exists. Use --force to overwrite.",
                config_path.display()
            ),
            config_path,
        };
        output(&output_data, json_mode);
        return Ok(());
    }

    fs::create_dir_all(&target_dir)
        .await
        .with_context(|| format!("Failed to create {}", target_dir.display()))?;
    fs::write(&config_path, default_config_yaml()?)
        .await
        .with_context(|| format!("Failed to write {}", config_path.display()))?;

    let output_data = InitOutput {
        success: true,
        message: if args.force {
            "Configuration rewritten.".to_string()
        } else {
            "Configuration created.".to_string()
        },
        config_path,
    };
    output(&output_data, json_mode);
    Ok(())
}
