//! Webhook dispatch command implementation.

use anyhow::{bail, Context, Result};
use chrono::Utc;
use serde_json::{json, Value};
use signals_config::AppConfig;
use signals_core::Signal;
use signals_data::JsonFileStore;
use signals_webhooks::{FileOutcomeLog, WebhookDispatcher};
use std::sync::Arc;
use tracing::info;

use crate::cli::DispatchArgs;

pub async fn run(args: DispatchArgs, config: AppConfig) -> Result<()> {
    let signal = parse_signal(&args.signal)?;

    let log = FileOutcomeLog::open(&config.data.dispatch_log)
        .await
        .with_context(|| {
            format!(
                "Failed to open dispatch log {}",
                config.data.dispatch_log.display()
            )
        })?;
    let dispatcher = WebhookDispatcher::new(config.dispatch_config(), Arc::new(log))?;
    let store = JsonFileStore::new(config.data_paths());

    info!(signal = %signal.label(), "Dispatching from command line");
    let report = dispatcher.dispatch_from(&signal, &store).await;

    if args.json {
        let outcomes: Vec<Value> = report
            .outcomes
            .iter()
            .map(|o| json!({ "url": o.subscriber_url, "result": o.result }))
            .collect();
        println!(
            "{}",
            serde_json::to_string_pretty(&json!({
                "dispatchId": report.dispatch_id,
                "attempted": report.attempted,
                "delivered": report.delivered,
                "failed": report.failed,
                "skipped": report.skipped,
                "outcomes": outcomes,
            }))?
        );
    } else {
        println!("Dispatch {}", report.dispatch_id);
        println!("  Attempted: {}", report.attempted);
        println!("  Delivered: {}", report.delivered);
        println!("  Failed:    {}", report.failed);
        println!("  Skipped:   {}", report.skipped);
    }

    Ok(())
}

/// Parse a signal given on the command line; a missing timestamp means now.
fn parse_signal(raw: &str) -> Result<Signal> {
    let mut value: Value = serde_json::from_str(raw).context("Invalid signal JSON")?;
    let Some(object) = value.as_object_mut() else {
        bail!("Signal must be a JSON object");
    };
    object
        .entry("timestamp")
        .or_insert_with(|| Value::String(Utc::now().to_rfc3339()));

    serde_json::from_value(value)
        .context("Signal must have a string \"type\" and an RFC 3339 \"timestamp\"")
}
