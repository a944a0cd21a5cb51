//! Validate configuration command.

use anyhow::Result;
use signals_config::AppConfig;
use signals_core::Tier;
use std::path::Path;

pub async fn run(config_path: &Path, config: AppConfig) -> Result<()> {
    println!("Validating configuration: {:?}", config_path);
    if !config_path.exists() {
        println!("(file not found, using built-in defaults and MSB__* environment overrides)");
    }
    println!("Configuration is valid!");
    println!();
    println!("App: {}", config.app.name);
    println!("Environment: {}", config.app.environment);
    println!("Log level: {}", config.logging.level);
    println!("Listen: {}:{}", config.server.host, config.server.port);

    let tiers = config.tier_table();
    for tier in Tier::all() {
        println!("Tier {}: {}", tier, tiers.describe(*tier));
    }
    println!(
        "Webhooks: header {}, timeout {}s, concurrency {}",
        config.webhooks.signature_header,
        config.webhooks.timeout_secs,
        config.webhooks.max_concurrency
    );
    println!();
    println!("{}", config.to_toml()?);

    Ok(())
}
