//! Daily request quotas per identity.

use crate::counter_store::CounterStore;
use chrono::{DateTime, Utc};
use signals_core::{AccessError, Tier, TierTable};
use std::sync::Arc;
use tracing::{error, warn};

/// Quota usage after an accepted request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateUsage {
    pub used: u64,
    pub limit: u64,
}

impl RateUsage {
    pub fn remaining(&self) -> u64 {
        self.limit.saturating_sub(self.used)
    }
}

/// Enforces the tier's daily quota.
///
/// Count-then-check: every request is counted, including the one that trips
/// the limit. A day is the UTC calendar date of the request instant.
pub struct RateLimiter {
    store: Arc<dyn CounterStore>,
    tiers: Arc<TierTable>,
}

impl RateLimiter {
    pub fn new(store: Arc<dyn CounterStore>, tiers: Arc<TierTable>) -> Self {
        Self { store, tiers }
    }

    /// Count a request and check it against the quota.
    ///
    /// # Errors
    /// `RateLimitExceeded` once the post-increment count passes the quota,
    /// `CounterUnavailable` if the store cannot be reached.
    pub async fn check(
        &self,
        identity: &str,
        tier: Tier,
        now: DateTime<Utc>,
    ) -> Result<RateUsage, AccessError> {
        let limit = self.tiers.policy(tier).daily_quota;
        let day = now.date_naive();

        let used = self.store.increment(identity, day).await.map_err(|e| {
            error!(identity, error = %e, "Rate counter increment failed");
            e
        })?;

        if used > limit {
            warn!(identity, tier = %tier, used, limit, "Daily quota exceeded");
            return Err(AccessError::RateLimitExceeded { tier, limit });
        }

        Ok(RateUsage { used, limit })
    }

    /// Drop counters from days before `now`'s UTC date.
    pub async fn prune(&self, now: DateTime<Utc>) -> Result<usize, AccessError> {
        self.store.prune_before(now.date_naive()).await
    }

    pub fn tiers(&self) -> &TierTable {
        &self.tiers
    }
}
