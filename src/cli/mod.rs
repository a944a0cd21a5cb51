//! CLI definitions.

pub mod commands;

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "msb-signals")]
#[command(author, version, about = "Tiered trading signal API with signed webhook fan-out")]
pub struct Cli {
    /// Configuration file path
    #[arg(short, long, default_value = "config/default.toml", env = "MSB_CONFIG")]
    pub config: PathBuf,

    /// Log level (overrides the configured level)
    #[arg(short, long)]
    pub log_level: Option<LogLevel>,

    /// Enable JSON log format
    #[arg(long)]
    pub json_logs: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Clone, Copy, ValueEnum)]
pub enum LogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

impl LogLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            LogLevel::Trace => "trace",
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warn => "warn",
            LogLevel::Error => "error",
        }
    }
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run the HTTP API
    Serve(ServeArgs),
    /// Fan a signal out to every matching webhook subscriber
    Dispatch(DispatchArgs),
    /// Print the stored digest of a raw API key
    HashKey(HashKeyArgs),
    /// Check the key, signal and subscriber files for problems
    CheckData,
    /// Validate configuration
    ValidateConfig,
}

#[derive(clap::Args)]
pub struct ServeArgs {
    /// Listen host (overrides server.host)
    #[arg(long)]
    pub host: Option<String>,

    /// Listen port (overrides server.port)
    #[arg(short, long)]
    pub port: Option<u16>,
}

#[derive(clap::Args)]
pub struct DispatchArgs {
    /// Signal as JSON, e.g. '{"type":"NEW_BUY","symbol":"ELSA"}'
    pub signal: String,

    /// Print the dispatch summary as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(clap::Args)]
pub struct HashKeyArgs {
    /// Raw API key
    pub token: String,
}
