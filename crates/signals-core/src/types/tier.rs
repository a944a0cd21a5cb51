//! Access tiers and their policies.

use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

/// Access level of a caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Tier {
    /// Anonymous or unknown callers
    #[default]
    Free,
    /// Paid real-time access with webhooks
    Pro,
    /// Full access
    Enterprise,
}

impl Tier {
    /// Get all tiers, lowest first.
    pub fn all() -> &'static [Tier] {
        &[Tier::Free, Tier::Pro, Tier::Enterprise]
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Tier::Free => "free",
            Tier::Pro => "pro",
            Tier::Enterprise => "enterprise",
        }
    }
}

impl fmt::Display for Tier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Tier {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "free" => Ok(Tier::Free),
            "pro" => Ok(Tier::Pro),
            "enterprise" => Ok(Tier::Enterprise),
            _ => Err(format!("Invalid tier: {}", s)),
        }
    }
}

/// Unrecognised tier names fall back to `Free` rather than failing the whole key file.
impl<'de> Deserialize<'de> for Tier {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = Option::<String>::deserialize(deserializer)?;
        Ok(raw
            .and_then(|s| s.parse().ok())
            .unwrap_or_default())
    }
}

/// What a tier is entitled to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TierPolicy {
    /// Minimum age a signal must reach before this tier sees it
    pub visibility_delay: Duration,
    /// Requests allowed per UTC day
    pub daily_quota: u64,
    /// Whether this tier may register webhooks
    pub webhooks_allowed: bool,
}

impl TierPolicy {
    pub fn is_delayed(&self) -> bool {
        !self.visibility_delay.is_zero()
    }
}

/// Immutable tier policy table, built once at startup and shared.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TierTable {
    pub free: TierPolicy,
    pub pro: TierPolicy,
    pub enterprise: TierPolicy,
}

impl Default for TierTable {
    fn default() -> Self {
        Self {
            free: TierPolicy {
                visibility_delay: Duration::from_secs(3600),
                daily_quota: 100,
                webhooks_allowed: false,
            },
            pro: TierPolicy {
                visibility_delay: Duration::ZERO,
                daily_quota: 10_000,
                webhooks_allowed: true,
            },
            enterprise: TierPolicy {
                visibility_delay: Duration::ZERO,
                daily_quota: 100_000,
                webhooks_allowed: true,
            },
        }
    }
}

impl TierTable {
    /// Get the policy for a tier.
    pub fn policy(&self, tier: Tier) -> &TierPolicy {
        match tier {
            Tier::Free => &self.free,
            Tier::Pro => &self.pro,
            Tier::Enterprise => &self.enterprise,
        }
    }

    /// Human readable summary used by the health endpoint.
    pub fn describe(&self, tier: Tier) -> String {
        let policy = self.policy(tier);
        let access = if policy.is_delayed() {
            format!("Delayed signals ({})", format_delay(policy.visibility_delay))
        } else {
            "Real-time signals".to_string()
        };
        let webhooks = if policy.webhooks_allowed { " + webhooks" } else { "" };
        format!("{}{}, {} req/day", access, webhooks, policy.daily_quota)
    }
}

fn format_delay(delay: Duration) -> String {
    let secs = delay.as_secs();
    if secs % 3600 == 0 {
        format!("{}hr", secs / 3600)
    } else if secs % 60 == 0 {
        format!("{}min", secs / 60)
    } else {
        format!("{}s", secs)
    }
}
