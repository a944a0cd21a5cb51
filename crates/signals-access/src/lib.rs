//! Access control for the signals API.
//!
//! Resolves bearer tokens to a tier and identity, and enforces each tier's
//! daily request quota.

mod counter_store;
mod credentials;
mod rate_limiter;

pub use counter_store::{CounterStore, InMemoryCounterStore};
pub use credentials::{bearer_token, Credential, CredentialResolver, CredentialStatus, ANONYMOUS};
pub use rate_limiter::{RateLimiter, RateUsage};
