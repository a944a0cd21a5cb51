//! Webhook fan-out.
//!
//! One envelope is built and canonically encoded per signal; each eligible
//! subscriber gets its own signature and an independent, time-bounded POST.
//! Deliveries run concurrently up to `max_concurrency`. Nothing here returns
//! an error to the caller: every failure becomes a recorded outcome.

use crate::outcome_log::OutcomeLog;
use crate::signer::{canonical_json, sign_bytes};
use crate::{DEFAULT_SIGNATURE_HEADER, DEFAULT_SOURCE};
use chrono::{DateTime, Utc};
use futures::stream::{self, StreamExt};
use reqwest::{header, Client};
use serde::Serialize;
use signals_core::{
    DeliveryResult, DispatchOutcome, DispatchRecord, DispatchSkip, Signal, Subscriber,
    SubscriberStore, WebhookError,
};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

/// Dispatcher settings.
#[derive(Debug, Clone)]
pub struct DispatchConfig {
    /// `source` field of the envelope
    pub source: String,
    /// Header carrying the hex signature
    pub signature_header: String,
    /// Per-delivery timeout
    pub timeout: Duration,
    /// Maximum deliveries in flight
    pub max_concurrency: usize,
    /// Key used for subscribers without a secret; `None` refuses to sign for them
    pub fallback_secret: Option<String>,
}

impl Default for DispatchConfig {
    fn default() -> Self {
        Self {
            source: DEFAULT_SOURCE.to_string(),
            signature_header: DEFAULT_SIGNATURE_HEADER.to_string(),
            timeout: Duration::from_secs(10),
            max_concurrency: 8,
            fallback_secret: Some("msb-default".to_string()),
        }
    }
}

/// Body POSTed to every subscriber.
#[derive(Debug, Clone, Serialize)]
pub struct WebhookEnvelope<'a> {
    pub event: &'static str,
    pub signal: &'a Signal,
    pub timestamp: DateTime<Utc>,
    pub source: &'a str,
}

/// Summary of one fan-out.
#[derive(Debug, Clone, Default)]
pub struct DispatchReport {
    pub dispatch_id: Uuid,
    /// Deliveries attempted
    pub attempted: usize,
    /// Subscribers left out as inactive, url-less or not wanting the type
    pub skipped: usize,
    /// 2xx responses
    pub delivered: usize,
    /// Non-2xx responses, transport errors and timeouts
    pub failed: usize,
    pub outcomes: Vec<DispatchOutcome>,
}

/// Fans signals out to webhook subscribers.
pub struct WebhookDispatcher {
    client: Client,
    config: DispatchConfig,
    log: Arc<dyn OutcomeLog>,
}

impl WebhookDispatcher {
    /// Create a dispatcher with its own HTTP client.
    pub fn new(config: DispatchConfig, log: Arc<dyn OutcomeLog>) -> Result<Self, WebhookError> {
        let client = Client::builder()
            .user_agent(concat!("msb-signals-webhooks/", env!("CARGO_PKG_VERSION")))
            .redirect(reqwest::redirect::Policy::none())
            .build()
            .map_err(|e| WebhookError::Client(e.to_string()))?;

        Ok(Self { client, config, log })
    }

    pub fn config(&self) -> &DispatchConfig {
        &self.config
    }

    /// Load the subscriber registry and dispatch.
    ///
    /// A registry that cannot be read is treated like an empty one.
    pub async fn dispatch_from(
        &self,
        signal: &Signal,
        store: &dyn SubscriberStore,
    ) -> DispatchReport {
        match store.load_subscribers().await {
            Ok(subscribers) => self.dispatch(signal, &subscribers).await,
            Err(e) => {
                error!(
                    target: "webhook_delivery",
                    signal = %signal.label(),
                    error = %e,
                    "Failed to load subscribers"
                );
                let dispatch_id = Uuid::new_v4();
                let reason = format!("subscriber registry unavailable: {}", e);
                self.record_skip(dispatch_id, signal, reason).await;
                DispatchReport {
                    dispatch_id,
                    ..Default::default()
                }
            }
        }
    }

    /// Deliver a signal to every matching active subscriber.
    pub async fn dispatch(&self, signal: &Signal, subscribers: &[Subscriber]) -> DispatchReport {
        let dispatch_id = Uuid::new_v4();

        if subscribers.is_empty() {
            info!(
                target: "webhook_delivery",
                %dispatch_id,
                signal = %signal.label(),
                "No subscribers, skipping dispatch"
            );
            self.record_skip(dispatch_id, signal, "no subscribers").await;
            return DispatchReport {
                dispatch_id,
                ..Default::default()
            };
        }

        let targets: Vec<&Subscriber> = subscribers
            .iter()
            .filter(|s| s.wants(&signal.signal_type))
            .collect();
        let skipped = subscribers.len() - targets.len();

        if targets.is_empty() {
            info!(
                target: "webhook_delivery",
                %dispatch_id,
                signal = %signal.label(),
                skipped,
                "No subscriber wants this signal"
            );
            self.record_skip(dispatch_id, signal, "no matching active subscribers").await;
            return DispatchReport {
                dispatch_id,
                skipped,
                ..Default::default()
            };
        }

        let envelope = WebhookEnvelope {
            event: "signal",
            signal,
            timestamp: Utc::now(),
            source: &self.config.source,
        };
        let body = match serde_json::to_value(&envelope) {
            Ok(value) => canonical_json(&value),
            Err(e) => {
                error!(
                    target: "webhook_delivery",
                    %dispatch_id,
                    error = %e,
                    "Failed to encode envelope"
                );
                self.record_skip(dispatch_id, signal, format!("envelope encoding failed: {}", e))
                    .await;
                return DispatchReport {
                    dispatch_id,
                    skipped,
                    ..Default::default()
                };
            }
        };

        info!(
            target: "webhook_delivery",
            %dispatch_id,
            signal = %signal.label(),
            subscribers = targets.len(),
            "Dispatching signal"
        );

        let outcomes: Vec<DispatchOutcome> = stream::iter(targets.iter().copied())
            .map(|subscriber| self.deliver(dispatch_id, subscriber, signal, &body))
            .buffer_unordered(self.config.max_concurrency.max(1))
            .collect()
            .await;

        let delivered = outcomes.iter().filter(|o| o.result.is_success()).count();
        let report = DispatchReport {
            dispatch_id,
            attempted: targets.len(),
            skipped,
            delivered,
            failed: outcomes.len() - delivered,
            outcomes,
        };

        info!(
            target: "webhook_delivery",
            %dispatch_id,
            delivered = report.delivered,
            failed = report.failed,
            "Dispatch complete"
        );

        report
    }

    /// Sign and POST to one subscriber. Never fails; the result is recorded.
    async fn deliver(
        &self,
        dispatch_id: Uuid,
        subscriber: &Subscriber,
        signal: &Signal,
        body: &str,
    ) -> DispatchOutcome {
        let url = subscriber.endpoint().unwrap_or_default();
        let result = match self.secret_for(subscriber) {
            Some(secret) => self.post(url, secret, body).await,
            None => DeliveryResult::Error {
                message: WebhookError::MissingSecret.to_string(),
            },
        };

        match &result {
            DeliveryResult::Status { status } if result.is_success() => {
                debug!(
                    target: "webhook_delivery",
                    url,
                    status,
                    signal = %signal.label(),
                    "Delivered"
                );
            }
            DeliveryResult::Status { status } => {
                warn!(
                    target: "webhook_delivery",
                    %dispatch_id,
                    url,
                    status,
                    signal = %signal.label(),
                    "Subscriber rejected delivery"
                );
            }
            DeliveryResult::Error { message } => {
                warn!(
                    target: "webhook_delivery",
                    %dispatch_id,
                    url,
                    error = %message,
                    signal = %signal.label(),
                    "Delivery failed"
                );
            }
        }

        let outcome = DispatchOutcome::new(dispatch_id, url, signal, result);
        self.log.append(&DispatchRecord::Delivery(outcome.clone())).await;
        outcome
    }

    fn secret_for<'a>(&'a self, subscriber: &'a Subscriber) -> Option<&'a str> {
        match subscriber.secret.as_deref().filter(|s| !s.is_empty()) {
            Some(secret) => Some(secret),
            None => {
                let fallback = self.config.fallback_secret.as_deref().filter(|s| !s.is_empty());
                if fallback.is_some() {
                    warn!(
                        target: "webhook_delivery",
                        url = subscriber.endpoint().unwrap_or_default(),
                        "Subscriber has no secret, signing with the fallback secret"
                    );
                }
                fallback
            }
        }
    }

    async fn post(&self, url: &str, secret: &str, body: &str) -> DeliveryResult {
        let signature = sign_bytes(secret, body.as_bytes());
        let response = self
            .client
            .post(url)
            .header(header::CONTENT_TYPE, "application/json")
            .header(self.config.signature_header.as_str(), signature)
            .timeout(self.config.timeout)
            .body(body.to_owned())
            .send()
            .await;

        match response {
            Ok(resp) => DeliveryResult::Status {
                status: resp.status().as_u16(),
            },
            Err(e) if e.is_timeout() => DeliveryResult::Error {
                message: format!("timed out after {}ms", self.config.timeout.as_millis()),
            },
            Err(e) => DeliveryResult::Error {
                message: e.to_string(),
            },
        }
    }

    async fn record_skip(&self, dispatch_id: Uuid, signal: &Signal, reason: impl Into<String>) {
        let skip = DispatchSkip::new(dispatch_id, signal, reason);
        self.log.append(&DispatchRecord::Skipped(skip)).await;
    }
}
