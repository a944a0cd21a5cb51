//! Store traits for data owned by external collaborators.
//!
//! Every call returns a fresh read-only snapshot; the service never writes
//! through these traits.

use crate::error::StoreError;
use crate::types::{ApiKey, PortfolioSnapshot, Signal, Subscriber};
use async_trait::async_trait;

/// Source of API key records.
#[async_trait]
pub trait KeyStore: Send + Sync {
    /// Load every known key, active or not.
    async fn load_keys(&self) -> Result<Vec<ApiKey>, StoreError>;
}

/// Source of published signals.
#[async_trait]
pub trait SignalStore: Send + Sync {
    /// Load the full signal history in whatever order it is stored.
    async fn load_signals(&self) -> Result<Vec<Signal>, StoreError>;
}

/// Registry of webhook subscribers.
#[async_trait]
pub trait SubscriberStore: Send + Sync {
    async fn load_subscribers(&self) -> Result<Vec<Subscriber>, StoreError>;
}

/// Source of the latest portfolio snapshot.
#[async_trait]
pub trait PortfolioStore: Send + Sync {
    /// Load the current snapshot.
    ///
    /// # Returns
    /// `None` when no snapshot has been published yet
    async fn load_portfolio(&self) -> Result<Option<PortfolioSnapshot>, StoreError>;
}
