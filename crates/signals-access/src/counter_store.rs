//! Per-identity, per-day request counters.

use async_trait::async_trait;
use chrono::NaiveDate;
use dashmap::DashMap;
use signals_core::AccessError;

/// Storage for daily request counters.
///
/// `increment` must be atomic per `(identity, day)`: two concurrent calls for
/// the same key always observe distinct post-increment values.
#[async_trait]
pub trait CounterStore: Send + Sync {
    /// Increment the counter and return the post-increment value.
    async fn increment(&self, identity: &str, day: NaiveDate) -> Result<u64, AccessError>;

    /// Current value without incrementing.
    async fn get(&self, identity: &str, day: NaiveDate) -> Result<u64, AccessError>;

    /// Drop counters for days before `day`. Returns the number removed.
    async fn prune_before(&self, day: NaiveDate) -> Result<usize, AccessError>;
}

/// Process-local counter store.
///
/// Counts are lost on restart and are not shared between instances.
#[derive(Debug, Default)]
pub struct InMemoryCounterStore {
    counters: DashMap<(String, NaiveDate), u64>,
}

impl InMemoryCounterStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of live counters.
    pub fn len(&self) -> usize {
        self.counters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.counters.is_empty()
    }
}

#[async_trait]
impl CounterStore for InMemoryCounterStore {
    async fn increment(&self, identity: &str, day: NaiveDate) -> Result<u64, AccessError> {
        // The entry guard holds the shard lock across read-modify-write.
        let mut count = self
            .counters
            .entry((identity.to_string(), day))
            .or_insert(0);
        *count += 1;
        Ok(*count)
    }

    async fn get(&self, identity: &str, day: NaiveDate) -> Result<u64, AccessError> {
        Ok(self
            .counters
            .get(&(identity.to_string(), day))
            .map(|c| *c)
            .unwrap_or(0))
    }

    async fn prune_before(&self, day: NaiveDate) -> Result<usize, AccessError> {
        let before = self.counters.len();
        self.counters.retain(|(_, d), _| *d >= day);
        Ok(before.saturating_sub(self.counters.len()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(s: &str) -> NaiveDate {
        s.parse().unwrap()
    }

    #[tokio::test]
    async fn test_increment_is_scoped_per_key() {
        let store = InMemoryCounterStore::new();
        assert_eq!(store.increment("a", day("2026-02-01")).await.unwrap(), 1);
        assert_eq!(store.increment("a", day("2026-02-01")).await.unwrap(), 2);
        assert_eq!(store.increment("b", day("2026-02-01")).await.unwrap(), 1);
        assert_eq!(store.increment("a", day("2026-02-02")).await.unwrap(), 1);
        assert_eq!(store.get("a", day("2026-02-01")).await.unwrap(), 2);
        assert_eq!(store.get("c", day("2026-02-01")).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_prune_before() {
        let store = InMemoryCounterStore::new();
        store.increment("a", day("2026-01-30")).await.unwrap();
        store.increment("a", day("2026-01-31")).await.unwrap();
        store.increment("b", day("2026-02-01")).await.unwrap();

        let removed = store.prune_before(day("2026-02-01")).await.unwrap();
        assert_eq!(removed, 2);
        assert_eq!(store.len(), 1);
        assert_eq!(store.get("b", day("2026-02-01")).await.unwrap(), 1);
    }
}
