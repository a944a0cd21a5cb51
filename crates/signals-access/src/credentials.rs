//! Bearer token resolution.

use signals_core::{hash_token, ApiKey, KeyStore, StoreError, Tier};
use std::sync::Arc;
use tracing::{debug, warn};

/// Identity used for unauthenticated and unrecognised callers.
pub const ANONYMOUS: &str = "anonymous";

/// How a credential was resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CredentialStatus {
    /// No token supplied
    Anonymous,
    /// A token was supplied but matches no active key
    Degraded,
    /// Token matched an active key
    Authenticated,
}

/// Resolved caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Credential {
    /// Rate limiting subject
    pub identity: String,
    pub tier: Tier,
    pub status: CredentialStatus,
}

impl Credential {
    fn anonymous(status: CredentialStatus) -> Self {
        Self {
            identity: ANONYMOUS.to_string(),
            tier: Tier::Free,
            status,
        }
    }

    pub fn is_authenticated(&self) -> bool {
        self.status == CredentialStatus::Authenticated
    }
}

/// Extract the token from an `Authorization` header value.
///
/// A leading case-insensitive `Bearer` scheme is stripped when followed by
/// whitespace; a bare token is accepted as-is.
pub fn bearer_token(header: &str) -> Option<&str> {
    let rest = match header.get(..6) {
        Some(scheme)
            if scheme.eq_ignore_ascii_case("bearer")
                && header[6..].starts_with(char::is_whitespace) =>
        {
            &header[6..]
        }
        _ => header,
    };
    let token = rest.trim();
    (!token.is_empty()).then_some(token)
}

/// Maps bearer tokens to a tier and identity.
///
/// Unknown or inactive tokens are down-tiered to anonymous free access, never
/// rejected.
pub struct CredentialResolver {
    keys: Arc<dyn KeyStore>,
}

impl CredentialResolver {
    pub fn new(keys: Arc<dyn KeyStore>) -> Self {
        Self { keys }
    }

    /// Resolve a token against the key store.
    ///
    /// The store is only consulted when a token is present.
    pub async fn authenticate(&self, token: Option<&str>) -> Result<Credential, StoreError> {
        match token.filter(|t| !t.is_empty()) {
            None => Ok(Credential::anonymous(CredentialStatus::Anonymous)),
            Some(token) => {
                let keys = self.keys.load_keys().await?;
                Ok(Self::resolve(Some(token), &keys))
            }
        }
    }

    /// Resolve a token against a key snapshot. First active match wins.
    pub fn resolve(token: Option<&str>, keys: &[ApiKey]) -> Credential {
        let Some(token) = token.filter(|t| !t.is_empty()) else {
            return Credential::anonymous(CredentialStatus::Anonymous);
        };

        let digest = hash_token(token);
        match keys.iter().find(|k| k.active && k.hash == digest) {
            Some(key) => {
                let identity = key
                    .id
                    .clone()
                    .filter(|id| !id.is_empty())
                    .unwrap_or_else(|| digest[..8].to_string());
                debug!(identity = %identity, tier = %key.tier, "API key authenticated");
                Credential {
                    identity,
                    tier: key.tier,
                    status: CredentialStatus::Authenticated,
                }
            }
            None => {
                warn!(
                    key_prefix = &digest[..8],
                    "Unknown or inactive API key, serving as anonymous"
                );
                Credential::anonymous(CredentialStatus::Degraded)
            }
        }
    }
}
