//! Webhook fan-out for new signals.
//!
//! - HMAC-SHA256 signing over a canonical JSON encoding
//! - Concurrent, time-bounded delivery with per-subscriber failure isolation
//! - Append-only dispatch outcome logs
//! - Validation of new subscription requests

mod dispatcher;
mod outcome_log;
mod signer;
mod subscription;

pub use dispatcher::{DispatchConfig, DispatchReport, WebhookDispatcher, WebhookEnvelope};
pub use outcome_log::{FileOutcomeLog, MemoryOutcomeLog, OutcomeLog};
pub use signer::{canonical_json, sign_bytes, sign_payload, verify_signature, SignedPayload};
pub use subscription::{
    generate_secret, SubscriptionGrant, SubscriptionRequest, SubscriptionValidator, AVAILABLE_TYPES,
};

/// Header carrying the payload signature unless configured otherwise.
pub const DEFAULT_SIGNATURE_HEADER: &str = "X-MSB-Signature";

/// `source` field of every envelope unless configured otherwise.
pub const DEFAULT_SOURCE: &str = "msb-signals";
