//! meshsweep CLI entry point.

use std::path::Path;

use clap::Parser;

use meshsweep::cli::{commands, handle_error, Cli, Commands};
use meshsweep::infrastructure::logging::LoggerImpl;
use meshsweep::{Config, ConfigLoader};

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    let json = cli.json;

    if let Err(err) = dispatch(cli).await {
        handle_error(err, json);
    }
}

/// Load configuration and install logging; the logger must outlive the command.
fn setup(config_path: Option<&Path>) -> anyhow::Result<(Config, LoggerImpl)> {
    let config = ConfigLoader::resolve(config_path)?;
    let logger = LoggerImpl::init(&config.logging)?;
    Ok((config, logger))
}

async fn dispatch(cli: Cli) -> anyhow::Result<()> {
    let config_path = cli.config.as_deref();
    match cli.command {
        Commands::Init(args) => commands::init::execute(args, cli.json).await,
        Commands::Check(args) => {
            let (config, _logger) = setup(config_path)?;
            commands::check::execute(args, &config, cli.json).await
        }
        Commands::Run(args) => {
            let (config, _logger) = setup(config_path)?;
            commands::run::execute(args, config, cli.json).await
        }
        Commands::Grid(args) => {
            let (config, _logger) = setup(config_path)?;
            commands::grid::execute(args, &config, cli.json).await
        }
    }
}
