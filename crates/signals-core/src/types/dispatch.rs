//! Webhook dispatch records.

use super::Signal;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// How a single delivery ended.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DeliveryResult {
    /// The endpoint answered with an HTTP status
    Status { status: u16 },
    /// Transport failure or timeout
    Error { message: String },
}

impl DeliveryResult {
    /// Whether the endpoint accepted the delivery (2xx).
    pub fn is_success(&self) -> bool {
        matches!(self, DeliveryResult::Status { status } if (200..300).contains(status))
    }
}

/// Outcome of delivering one signal to one subscriber.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DispatchOutcome {
    /// Shared by every outcome of the same fan-out
    pub dispatch_id: Uuid,
    pub subscriber_url: String,
    pub signal_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub signal_symbol: Option<String>,
    pub result: DeliveryResult,
    pub timestamp: DateTime<Utc>,
}

impl DispatchOutcome {
    pub fn new(
        dispatch_id: Uuid,
        subscriber_url: &str,
        signal: &Signal,
        result: DeliveryResult,
    ) -> Self {
        Self {
            dispatch_id,
            subscriber_url: subscriber_url.to_string(),
            signal_type: signal.signal_type.clone(),
            signal_symbol: signal.symbol.clone(),
            result,
            timestamp: Utc::now(),
        }
    }
}

/// A fan-out that had nobody to deliver to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DispatchSkip {
    pub dispatch_id: Uuid,
    pub signal_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub signal_symbol: Option<String>,
    pub reason: String,
    pub timestamp: DateTime<Utc>,
}

impl DispatchSkip {
    pub fn new(dispatch_id: Uuid, signal: &Signal, reason: impl Into<String>) -> Self {
        Self {
            dispatch_id,
            signal_type: signal.signal_type.clone(),
            signal_symbol: signal.symbol.clone(),
            reason: reason.into(),
            timestamp: Utc::now(),
        }
    }
}

/// Entry in the append-only dispatch log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "record", rename_all = "snake_case")]
pub enum DispatchRecord {
    Delivery(DispatchOutcome),
    Skipped(DispatchSkip),
}
