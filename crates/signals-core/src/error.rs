//! Error types for the signals service.

use crate::types::Tier;
use std::path::PathBuf;
use thiserror::Error;

/// Access control errors raised on the read path.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AccessError {
    #[error("Rate limit exceeded: tier {tier} allows {limit} requests per day")]
    RateLimitExceeded { tier: Tier, limit: u64 },

    #[error("Rate counter store unavailable: {0}")]
    CounterUnavailable(String),
}

/// Errors reading collaborator-owned data (keys, signals, subscribers, portfolio).
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse {path}: {message}")]
    Parse { path: PathBuf, message: String },

    #[error("Store unavailable: {0}")]
    Unavailable(String),
}

/// Webhook registration and delivery errors.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum WebhookError {
    #[error("Webhooks require Pro tier or above (current tier: {tier})")]
    WebhooksNotAllowed { tier: Tier },

    #[error("url must be a valid HTTPS URL: {0}")]
    InvalidUrl(String),

    #[error("Subscriber has no signing secret")]
    MissingSecret,

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("HTTP client error: {0}")]
    Client(String),
}

/// Any error raised by the signals service.
#[derive(Error, Debug)]
pub enum SignalsError {
    #[error("Access error: {0}")]
    Access(#[from] AccessError),

    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    #[error("Webhook error: {0}")]
    Webhook(#[from] WebhookError),

    #[error("Configuration error: {0}")]
    Config(String),
}
