//! HMAC-SHA256 payload signing.
//!
//! Canonical encoding: compact JSON with object keys sorted by byte order at
//! every level, arrays kept in order. Receivers verify by recomputing the
//! HMAC over the raw request body, which is exactly the canonical encoding.

use hmac::{Hmac, Mac};
use serde::Serialize;
use serde_json::Value;
use sha2::Sha256;
use signals_core::WebhookError;

type HmacSha256 = Hmac<Sha256>;

/// A canonical body and its signature.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignedPayload {
    pub body: String,
    pub signature: String,
}

/// Encode a JSON value canonically.
pub fn canonical_json(value: &Value) -> String {
    let mut out = String::new();
    write_canonical(value, &mut out);
    out
}

fn write_canonical(value: &Value, out: &mut String) {
    match value {
        Value::Object(map) => {
            let mut entries: Vec<(&String, &Value)> = map.iter().collect();
            entries.sort_by(|a, b| a.0.cmp(b.0));
            out.push('{');
            for (i, (key, item)) in entries.into_iter().enumerate() {
                if i > 0 {
                    out.push(',');
                }
                out.push_str(&Value::String(key.clone()).to_string());
                out.push(':');
                write_canonical(item, out);
            }
            out.push('}');
        }
        Value::Array(items) => {
            out.push('[');
            for (i, item) in items.iter().enumerate() {
                if i > 0 {
                    out.push(',');
                }
                write_canonical(item, out);
            }
            out.push(']');
        }
        scalar => out.push_str(&scalar.to_string()),
    }
}

/// Hex HMAC-SHA256 of raw bytes.
pub fn sign_bytes(secret: &str, body: &[u8]) -> String {
    let mut mac = <HmacSha256 as Mac>::new_from_slice(secret.as_bytes())
        .expect("HMAC can take key of any size");
    mac.update(body);
    hex::encode(mac.finalize().into_bytes())
}

/// Canonically encode `payload` and sign it.
pub fn sign_payload<T: Serialize>(
    payload: &T,
    secret: &str,
) -> Result<SignedPayload, WebhookError> {
    let value =
        serde_json::to_value(payload).map_err(|e| WebhookError::Serialization(e.to_string()))?;
    let body = canonical_json(&value);
    let signature = sign_bytes(secret, body.as_bytes());
    Ok(SignedPayload { body, signature })
}

/// Check a hex signature against a body in constant time.
pub fn verify_signature(signature_hex: &str, secret: &str, body: &[u8]) -> bool {
    use subtle::ConstantTimeEq;
    let expected = sign_bytes(secret, body);
    expected
        .as_bytes()
        .ct_eq(signature_hex.to_ascii_lowercase().as_bytes())
        .into()
}
