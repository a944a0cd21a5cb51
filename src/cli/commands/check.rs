//! Data file check command implementation.

use anyhow::{bail, Result};
use signals_config::AppConfig;
use signals_core::{KeyStore, PortfolioStore, SignalStore, SubscriberStore};
use signals_data::{duplicate_key_hashes, JsonFileStore};

pub async fn run(config: AppConfig) -> Result<()> {
    let store = JsonFileStore::new(config.data_paths());
    let paths = store.paths().clone();
    let mut problems = 0usize;

    println!("API keys: {}", paths.api_keys.display());
    match store.load_keys().await {
        Ok(keys) => {
            let active = keys.iter().filter(|k| k.active).count();
            println!("  {} keys, {} active", keys.len(), active);
            for hash in duplicate_key_hashes(&keys) {
                problems += 1;
                println!("  ! duplicate active hash {}...", &hash[..hash.len().min(8)]);
            }
        }
        Err(e) => {
            problems += 1;
            println!("  ! {}", e);
        }
    }

    println!("Signals: {}", paths.signals.display());
    match store.load_signals().await {
        Ok(signals) => {
            println!("  {} signals", signals.len());
            if let Some(latest) = signals.iter().map(|s| s.timestamp).max() {
                println!("  latest {}", latest.to_rfc3339());
            }
        }
        Err(e) => {
            problems += 1;
            println!("  ! {}", e);
        }
    }

    println!("Subscribers: {}", paths.subscribers.display());
    match store.load_subscribers().await {
        Ok(subscribers) => {
            let active = subscribers.iter().filter(|s| s.active).count();
            println!("  {} subscribers, {} active", subscribers.len(), active);
            for s in subscribers.iter().filter(|s| s.active && s.endpoint().is_none()) {
                problems += 1;
                println!("  ! active subscriber without url (types {:?})", s.types);
            }
            let unsigned = subscribers
                .iter()
                .filter(|s| s.active && s.secret.as_deref().is_none_or(str::is_empty))
                .count();
            if unsigned > 0 {
                println!("  {} active subscribers have no secret", unsigned);
            }
        }
        Err(e) => {
            problems += 1;
            println!("  ! {}", e);
        }
    }

    println!("Portfolio: {}", paths.portfolio.display());
    match store.load_portfolio().await {
        Ok(Some(snapshot)) => println!("  {} positions", snapshot.positions.len()),
        Ok(None) => println!("  no snapshot"),
        Err(e) => {
            problems += 1;
            println!("  ! {}", e);
        }
    }

    if problems > 0 {
        bail!("{} problem(s) found", problems);
    }
    println!("\nNo problems found");
    Ok(())
}
