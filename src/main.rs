//! MSB signals service CLI.

mod cli;

use anyhow::{Context, Result};
use clap::Parser;
use cli::{Cli, Commands};
use signals_config::load_config;
use signals_monitor::{setup_logging, LogFormat};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = load_config(&cli.config)
        .with_context(|| format!("Failed to load configuration from {}", cli.config.display()))?;

    // Setup logging
    let log_level = cli
        .log_level
        .map(|l| l.as_str().to_string())
        .unwrap_or_else(|| config.logging.level.clone());
    setup_logging(&log_level, LogFormat::from_flag(cli.json_logs || config.logging.json()));

    // Execute command
    match cli.command {
        Commands::Serve(args) => cli::commands::serve::run(args, config).await,
        Commands::Dispatch(args) => cli::commands::dispatch::run(args, config).await,
        Commands::HashKey(args) => cli::commands::hash_key::run(args).await,
        Commands::CheckData => cli::commands::check::run(config).await,
        Commands::ValidateConfig => cli::commands::validate::run(&cli.config, config).await,
    }
}
