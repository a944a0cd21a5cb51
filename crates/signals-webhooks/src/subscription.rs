//! Subscription request validation and secret minting.

use crate::DEFAULT_SIGNATURE_HEADER;
use rand::rngs::OsRng;
use rand::RngCore;
use serde::{Deserialize, Serialize};
use signals_core::{Tier, TierTable, TypeFilter, WebhookError};
use std::sync::Arc;
use url::Url;

/// Signal types a subscriber may filter on.
pub const AVAILABLE_TYPES: [&str; 9] = [
    "NEW_BUY",
    "STOP_LOSS",
    "TAKE_PROFIT_PARTIAL",
    "TRAILING_STOP",
    "SAFETY_REJECT",
    "MOMENTUM_ADD",
    "SELL_IMPOSSIBLE",
    "BUY_FAILED",
    "EXEC_FAILED",
];

const SECRET_BYTES: usize = 32;

/// Body of a subscription request.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SubscriptionRequest {
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub types: TypeFilter,
}

/// Issued subscription details. Not persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubscriptionGrant {
    pub url: String,
    pub types: TypeFilter,
    pub secret: String,
    pub signature_header: String,
}

/// Checks tier eligibility and request shape for new subscriptions.
#[derive(Debug, Clone)]
pub struct SubscriptionValidator {
    tiers: Arc<TierTable>,
    signature_header: String,
}

impl SubscriptionValidator {
    pub fn new(tiers: Arc<TierTable>) -> Self {
        Self {
            tiers,
            signature_header: DEFAULT_SIGNATURE_HEADER.to_string(),
        }
    }

    pub fn with_signature_header(mut self, header: impl Into<String>) -> Self {
        self.signature_header = header.into();
        self
    }

    pub fn signature_header(&self) -> &str {
        &self.signature_header
    }

    /// Whether the tier may register webhooks at all.
    pub fn check_tier(&self, tier: Tier) -> Result<(), WebhookError> {
        if self.tiers.policy(tier).webhooks_allowed {
            Ok(())
        } else {
            Err(WebhookError::WebhooksNotAllowed { tier })
        }
    }

    /// Validate a request and mint a fresh secret for it.
    pub fn validate(
        &self,
        tier: Tier,
        request: SubscriptionRequest,
    ) -> Result<SubscriptionGrant, WebhookError> {
        self.check_tier(tier)?;

        let raw = request
            .url
            .as_deref()
            .map(str::trim)
            .filter(|u| !u.is_empty())
            .ok_or_else(|| WebhookError::InvalidUrl("url is required".to_string()))?;
        validate_url(raw)?;

        Ok(SubscriptionGrant {
            url: raw.to_string(),
            types: request.types,
            secret: generate_secret(),
            signature_header: self.signature_header.clone(),
        })
    }
}

/// The URL is only checked here; callers keep the text they were given.
fn validate_url(raw: &str) -> Result<(), WebhookError> {
    let url = Url::parse(raw).map_err(|e| WebhookError::InvalidUrl(format!("{}: {}", raw, e)))?;
    if url.scheme() != "https" {
        return Err(WebhookError::InvalidUrl(format!("{}: scheme must be https", raw)));
    }
    if url.host_str().is_none_or(str::is_empty) {
        return Err(WebhookError::InvalidUrl(format!("{}: missing host", raw)));
    }
    Ok(())
}

/// 32 bytes from the OS CSPRNG, hex encoded.
pub fn generate_secret() -> String {
    let mut bytes = [0u8; SECRET_BYTES];
    OsRng.fill_bytes(&mut bytes);
    hex::encode(bytes)
}
