//! API key records.

use super::Tier;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// A stored API key. Only the digest of the raw secret is kept.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiKey {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// Lowercase hex SHA-256 of the raw token
    pub hash: String,
    #[serde(default)]
    pub tier: Tier,
    #[serde(default)]
    pub active: bool,
}

impl ApiKey {
    /// Create an active key from a raw token.
    pub fn from_token(id: impl Into<String>, token: &str, tier: Tier) -> Self {
        Self {
            id: Some(id.into()),
            hash: hash_token(token),
            tier,
            active: true,
        }
    }

    pub fn deactivated(mut self) -> Self {
        self.active = false;
        self
    }
}

/// One-way digest of a raw bearer token, as stored in [`ApiKey::hash`].
pub fn hash_token(token: &str) -> String {
    hex::encode(Sha256::digest(token.as_bytes()))
}
