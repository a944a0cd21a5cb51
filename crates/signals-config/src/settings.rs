//! Configuration structures.

use config::ConfigError;
use serde::{Deserialize, Serialize};
use signals_core::{TierPolicy, TierTable};
use signals_data::DataPaths;
use signals_webhooks::{DispatchConfig, DEFAULT_SIGNATURE_HEADER, DEFAULT_SOURCE};
use std::path::PathBuf;
use std::time::Duration;

/// Main application configuration.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub app: AppSettings,
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub server: ServerSettings,
    #[serde(default)]
    pub data: DataSettings,
    #[serde(default)]
    pub tiers: TiersConfig,
    #[serde(default)]
    pub webhooks: WebhookSettings,
}

impl AppConfig {
    /// Reject settings the service cannot run with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.webhooks.timeout_secs == 0 {
            return Err(ConfigError::Message("webhooks.timeout_secs must be positive".into()));
        }
        if self.webhooks.max_concurrency == 0 {
            return Err(ConfigError::Message("webhooks.max_concurrency must be positive".into()));
        }
        if self.webhooks.signature_header.trim().is_empty() {
            return Err(ConfigError::Message("webhooks.signature_header must not be empty".into()));
        }
        for (name, tier) in [
            ("free", &self.tiers.free),
            ("pro", &self.tiers.pro),
            ("enterprise", &self.tiers.enterprise),
        ] {
            if tier.daily_quota == 0 {
                return Err(ConfigError::Message(format!(
                    "tiers.{}.daily_quota must be positive",
                    name
                )));
            }
        }
        Ok(())
    }

    pub fn tier_table(&self) -> TierTable {
        TierTable {
            free: self.tiers.free.policy(),
            pro: self.tiers.pro.policy(),
            enterprise: self.tiers.enterprise.policy(),
        }
    }

    pub fn dispatch_config(&self) -> DispatchConfig {
        DispatchConfig {
            source: self.webhooks.source.clone(),
            signature_header: self.webhooks.signature_header.clone(),
            timeout: Duration::from_secs(self.webhooks.timeout_secs),
            max_concurrency: self.webhooks.max_concurrency,
            fallback_secret: Some(self.webhooks.fallback_secret.clone()).filter(|s| !s.is_empty()),
        }
    }

    pub fn data_paths(&self) -> DataPaths {
        DataPaths {
            api_keys: self.data.api_keys.clone(),
            signals: self.data.signals.clone(),
            subscribers: self.data.subscribers.clone(),
            portfolio: self.data.portfolio.clone(),
        }
    }

    /// Effective configuration as TOML.
    pub fn to_toml(&self) -> Result<String, toml::ser::Error> {
        toml::to_string_pretty(self)
    }
}

/// General app settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AppSettings {
    pub name: String,
    pub environment: String,
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            name: "msb-signals".to_string(),
            environment: "self-hosted".to_string(),
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "pretty".to_string(),
        }
    }
}

impl LoggingConfig {
    pub fn json(&self) -> bool {
        self.format.eq_ignore_ascii_case("json")
    }
}

/// HTTP listener settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
    /// Directory served for non-API paths
    #[serde(skip_serializing_if = "Option::is_none")]
    pub public_dir: Option<PathBuf>,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 3849,
            public_dir: None,
        }
    }
}

/// Locations of collaborator-owned files.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DataSettings {
    pub api_keys: PathBuf,
    pub signals: PathBuf,
    pub subscribers: PathBuf,
    pub portfolio: PathBuf,
    /// Append-only webhook dispatch log
    pub dispatch_log: PathBuf,
}

impl Default for DataSettings {
    fn default() -> Self {
        Self {
            api_keys: PathBuf::from("data/api-keys.json"),
            signals: PathBuf::from("data/alerts.json"),
            subscribers: PathBuf::from("data/subscribers.json"),
            portfolio: PathBuf::from("data/dashboard.json"),
            dispatch_log: PathBuf::from("logs/webhook-dispatch.log"),
        }
    }
}

/// One tier's limits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TierSettings {
    pub visibility_delay_secs: u64,
    pub daily_quota: u64,
    pub webhooks_allowed: bool,
}

impl TierSettings {
    pub fn policy(&self) -> TierPolicy {
        TierPolicy {
            visibility_delay: Duration::from_secs(self.visibility_delay_secs),
            daily_quota: self.daily_quota,
            webhooks_allowed: self.webhooks_allowed,
        }
    }
}

impl From<&TierPolicy> for TierSettings {
    fn from(policy: &TierPolicy) -> Self {
        Self {
            visibility_delay_secs: policy.visibility_delay.as_secs(),
            daily_quota: policy.daily_quota,
            webhooks_allowed: policy.webhooks_allowed,
        }
    }
}

/// Per-tier limits.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TiersConfig {
    #[serde(default = "default_free")]
    pub free: TierSettings,
    #[serde(default = "default_pro")]
    pub pro: TierSettings,
    #[serde(default = "default_enterprise")]
    pub enterprise: TierSettings,
}

fn default_free() -> TierSettings {
    TierSettings::from(&TierTable::default().free)
}

fn default_pro() -> TierSettings {
    TierSettings::from(&TierTable::default().pro)
}

fn default_enterprise() -> TierSettings {
    TierSettings::from(&TierTable::default().enterprise)
}

impl Default for TiersConfig {
    fn default() -> Self {
        Self {
            free: default_free(),
            pro: default_pro(),
            enterprise: default_enterprise(),
        }
    }
}

/// Webhook dispatch settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WebhookSettings {
    pub source: String,
    pub signature_header: String,
    pub timeout_secs: u64,
    pub max_concurrency: usize,
    /// Signs for subscribers without a secret; empty disables
    pub fallback_secret: String,
}

impl Default for WebhookSettings {
    fn default() -> Self {
        Self {
            source: DEFAULT_SOURCE.to_string(),
            signature_header: DEFAULT_SIGNATURE_HEADER.to_string(),
            timeout_secs: 10,
            max_concurrency: 8,
            fallback_secret: "msb-default".to_string(),
        }
    }
}
