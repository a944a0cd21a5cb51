//! In-memory data source.

use async_trait::async_trait;
use signals_core::{
    ApiKey, KeyStore, PortfolioSnapshot, PortfolioStore, Signal, SignalStore, StoreError,
    Subscriber, SubscriberStore,
};
use std::sync::RwLock;

/// Holds every collection in memory.
#[derive(Debug, Default)]
pub struct MemoryStore {
    keys: RwLock<Vec<ApiKey>>,
    signals: RwLock<Vec<Signal>>,
    subscribers: RwLock<Vec<Subscriber>>,
    portfolio: RwLock<Option<PortfolioSnapshot>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_keys(self, keys: Vec<ApiKey>) -> Self {
        Self::replace(&self.keys, keys);
        self
    }

    pub fn with_signals(self, signals: Vec<Signal>) -> Self {
        Self::replace(&self.signals, signals);
        self
    }

    pub fn with_subscribers(self, subscribers: Vec<Subscriber>) -> Self {
        Self::replace(&self.subscribers, subscribers);
        self
    }

    pub fn with_portfolio(self, portfolio: PortfolioSnapshot) -> Self {
        Self::replace(&self.portfolio, Some(portfolio));
        self
    }

    /// Append a signal, as a producer would.
    pub fn push_signal(&self, signal: Signal) {
        if let Ok(mut signals) = self.signals.write() {
            signals.push(signal);
        }
    }

    fn replace<T>(slot: &RwLock<T>, value: T) {
        if let Ok(mut guard) = slot.write() {
            *guard = value;
        }
    }

    fn snapshot<T: Clone>(slot: &RwLock<T>) -> Result<T, StoreError> {
        slot.read()
            .map(|guard| guard.clone())
            .map_err(|_| StoreError::Unavailable("memory store lock poisoned".to_string()))
    }
}

#[async_trait]
impl KeyStore for MemoryStore {
    async fn load_keys(&self) -> Result<Vec<ApiKey>, StoreError> {
        Self::snapshot(&self.keys)
    }
}

#[async_trait]
impl SignalStore for MemoryStore {
    async fn load_signals(&self) -> Result<Vec<Signal>, StoreError> {
        Self::snapshot(&self.signals)
    }
}

#[async_trait]
impl SubscriberStore for MemoryStore {
    async fn load_subscribers(&self) -> Result<Vec<Subscriber>, StoreError> {
        Self::snapshot(&self.subscribers)
    }
}

#[async_trait]
impl PortfolioStore for MemoryStore {
    async fn load_portfolio(&self) -> Result<Option<PortfolioSnapshot>, StoreError> {
        Self::snapshot(&self.portfolio)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    #[tokio::test]
    async fn test_snapshots_are_independent() {
        let store =
            MemoryStore::new().with_signals(vec![Signal::new("NEW_BUY", Some("ELSA"), Utc::now())]);
        let before = store.load_signals().await.unwrap();

        store.push_signal(Signal::new("STOP_LOSS", Some("ELSA"), Utc::now()));

        assert_eq!(before.len(), 1);
        assert_eq!(store.load_signals().await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_empty_by_default() {
        let store = MemoryStore::new();
        assert!(store.load_keys().await.unwrap().is_empty());
        assert!(store.load_portfolio().await.unwrap().is_none());
    }
}
