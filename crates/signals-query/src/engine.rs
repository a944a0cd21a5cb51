//! Query execution.

use crate::query::{SignalQuery, MAX_LIMIT};
use chrono::{DateTime, Duration, Utc};
use serde::Serialize;
use signals_core::{Signal, Tier, TierTable};
use std::sync::Arc;
use tracing::debug;

/// A page of signals as returned to the caller.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QueryResult {
    pub tier: Tier,
    pub count: usize,
    /// Whether the tier's visibility delay was applied
    pub delayed: bool,
    pub signals: Vec<Signal>,
}

/// Executes signal queries for a given tier.
pub struct SignalQueryEngine {
    tiers: Arc<TierTable>,
}

impl SignalQueryEngine {
    pub fn new(tiers: Arc<TierTable>) -> Self {
        Self { tiers }
    }

    /// Run a query over a signal snapshot.
    ///
    /// Steps, in order: visibility delay, type, symbol, since, stable sort by
    /// timestamp descending, truncate to the limit.
    pub fn execute(
        &self,
        signals: &[Signal],
        tier: Tier,
        query: &SignalQuery,
        now: DateTime<Utc>,
    ) -> QueryResult {
        let policy = self.tiers.policy(tier);
        let delayed = policy.is_delayed();

        // Only signals strictly older than the cutoff are visible to delayed tiers.
        let cutoff = if delayed {
            Some(
                Duration::from_std(policy.visibility_delay)
                    .ok()
                    .and_then(|d| now.checked_sub_signed(d))
                    .unwrap_or(DateTime::<Utc>::MIN_UTC),
            )
        } else {
            None
        };

        let mut matched: Vec<&Signal> = signals
            .iter()
            .filter(|s| cutoff.is_none_or(|c| s.timestamp < c))
            .filter(|s| {
                query
                    .signal_type
                    .as_deref()
                    .is_none_or(|t| s.signal_type == t)
            })
            .filter(|s| query.symbol.as_deref().is_none_or(|sym| s.matches_symbol(sym)))
            .filter(|s| query.since.is_none_or(|since| s.timestamp > since))
            .collect();

        // sort_by is stable, so equal timestamps keep their stored order.
        matched.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));

        let matched_count = matched.len();
        let limit = query.limit.clamp(1, MAX_LIMIT);
        let signals: Vec<Signal> = matched.into_iter().take(limit).cloned().collect();

        debug!(
            tier = %tier,
            delayed,
            matched = matched_count,
            returned = signals.len(),
            "Signal query executed"
        );

        QueryResult {
            tier,
            count: signals.len(),
            delayed,
            signals,
        }
    }
}
