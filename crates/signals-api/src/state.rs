//! Shared application state.

use signals_access::{CounterStore, CredentialResolver, RateLimiter};
use signals_core::{KeyStore, PortfolioStore, SignalStore, TierTable};
use signals_query::SignalQueryEngine;
use signals_webhooks::SubscriptionValidator;
use std::sync::Arc;

/// Identity reported by the health endpoint.
#[derive(Debug, Clone)]
pub struct ServiceInfo {
    pub name: String,
    pub version: String,
    pub mode: String,
}

impl Default for ServiceInfo {
    fn default() -> Self {
        Self {
            name: "msb-signals".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            mode: "self-hosted".to_string(),
        }
    }
}

/// Application state shared across handlers.
pub struct AppState {
    pub service: ServiceInfo,
    pub tiers: Arc<TierTable>,
    pub resolver: CredentialResolver,
    pub limiter: RateLimiter,
    pub engine: SignalQueryEngine,
    pub signals: Arc<dyn SignalStore>,
    pub portfolio: Arc<dyn PortfolioStore>,
    pub subscriptions: SubscriptionValidator,
}

impl AppState {
    /// Wire the components around one shared tier table.
    pub fn new(
        service: ServiceInfo,
        tiers: Arc<TierTable>,
        keys: Arc<dyn KeyStore>,
        counters: Arc<dyn CounterStore>,
        signals: Arc<dyn SignalStore>,
        portfolio: Arc<dyn PortfolioStore>,
        signature_header: &str,
    ) -> Self {
        Self {
            service,
            resolver: CredentialResolver::new(keys),
            limiter: RateLimiter::new(counters, tiers.clone()),
            engine: SignalQueryEngine::new(tiers.clone()),
            subscriptions: SubscriptionValidator::new(tiers.clone())
                .with_signature_header(signature_header),
            tiers,
            signals,
            portfolio,
        }
    }
}
