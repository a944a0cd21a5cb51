//! JSON file data source.

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde_json::Value;
use signals_core::{
    ApiKey, KeyStore, PortfolioSnapshot, PortfolioStore, Signal, SignalStore, StoreError,
    Subscriber, SubscriberStore,
};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::{debug, error, warn};

use crate::duplicate_key_hashes;

/// Locations of the collaborator-owned JSON files.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataPaths {
    pub api_keys: PathBuf,
    pub signals: PathBuf,
    pub subscribers: PathBuf,
    pub portfolio: PathBuf,
}

/// Reads each file on every call so external writers are picked up
/// without a restart.
///
/// A missing file is an empty collection (or no portfolio). A file that
/// exists but cannot be parsed is an error.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    paths: DataPaths,
}

impl JsonFileStore {
    pub fn new(paths: DataPaths) -> Self {
        Self { paths }
    }

    pub fn paths(&self) -> &DataPaths {
        &self.paths
    }

    /// Read and parse a file, `None` if it does not exist.
    async fn read_json(path: &Path) -> Result<Option<Value>, StoreError> {
        let content = match tokio::fs::read_to_string(path).await {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!(path = %path.display(), "Data file not found");
                return Ok(None);
            }
            Err(source) => {
                return Err(StoreError::Io {
                    path: path.to_path_buf(),
                    source,
                })
            }
        };

        serde_json::from_str(&content)
            .map(Some)
            .map_err(|e| StoreError::Parse {
                path: path.to_path_buf(),
                message: e.to_string(),
            })
    }

    /// Entries of a JSON array, or the values of a JSON object.
    fn entries(path: &Path, value: Value) -> Result<Vec<Value>, StoreError> {
        match value {
            Value::Array(items) => Ok(items),
            Value::Object(map) => Ok(map.into_iter().map(|(_, v)| v).collect()),
            Value::Null => Ok(Vec::new()),
            other => Err(StoreError::Parse {
                path: path.to_path_buf(),
                message: format!("expected an array or object, found {}", type_name(&other)),
            }),
        }
    }

    /// Parse every entry, skipping (and logging) the ones that don't fit `T`.
    fn parse_entries<T: DeserializeOwned>(
        path: &Path,
        value: Value,
        what: &str,
    ) -> Result<Vec<T>, StoreError> {
        let entries = Self::entries(path, value)?;
        let total = entries.len();
        let parsed: Vec<T> = entries
            .into_iter()
            .enumerate()
            .filter_map(|(i, entry)| match serde_json::from_value(entry) {
                Ok(item) => Some(item),
                Err(e) => {
                    warn!(
                        path = %path.display(),
                        index = i,
                        error = %e,
                        "Skipping malformed {}",
                        what
                    );
                    None
                }
            })
            .collect();

        debug!(path = %path.display(), loaded = parsed.len(), total, "Loaded {}s", what);
        Ok(parsed)
    }
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

#[async_trait]
impl KeyStore for JsonFileStore {
    async fn load_keys(&self) -> Result<Vec<ApiKey>, StoreError> {
        let path = &self.paths.api_keys;
        let Some(value) = Self::read_json(path).await? else {
            warn!(path = %path.display(), "API key file missing, every caller is anonymous");
            return Ok(Vec::new());
        };

        let keys: Vec<ApiKey> = Self::parse_entries(path, value, "API key")?;
        for hash in duplicate_key_hashes(&keys) {
            error!(
                path = %path.display(),
                hash_prefix = %&hash[..hash.len().min(8)],
                "Duplicate active API key hash, first match wins"
            );
        }
        Ok(keys)
    }
}

#[async_trait]
impl SignalStore for JsonFileStore {
    async fn load_signals(&self) -> Result<Vec<Signal>, StoreError> {
        let path = &self.paths.signals;
        match Self::read_json(path).await? {
            Some(value) => Self::parse_entries(path, value, "signal"),
            None => Ok(Vec::new()),
        }
    }
}

#[async_trait]
impl SubscriberStore for JsonFileStore {
    async fn load_subscribers(&self) -> Result<Vec<Subscriber>, StoreError> {
        let path = &self.paths.subscribers;
        match Self::read_json(path).await? {
            Some(value) => Self::parse_entries(path, value, "subscriber"),
            None => Ok(Vec::new()),
        }
    }
}

#[async_trait]
impl PortfolioStore for JsonFileStore {
    async fn load_portfolio(&self) -> Result<Option<PortfolioSnapshot>, StoreError> {
        let path = &self.paths.portfolio;
        match Self::read_json(path).await? {
            None | Some(Value::Null) => Ok(None),
            Some(value) => serde_json::from_value(value)
                .map(Some)
                .map_err(|e| StoreError::Parse {
                    path: path.clone(),
                    message: e.to_string(),
                }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use signals_core::{hash_token, Tier};
    use std::fs;
    use tempfile::TempDir;

    fn store(dir: &TempDir) -> JsonFileStore {
        JsonFileStore::new(DataPaths {
            api_keys: dir.path().join("api-keys.json"),
            signals: dir.path().join("alerts.json"),
            subscribers: dir.path().join("subscribers.json"),
            portfolio: dir.path().join("dashboard.json"),
        })
    }

    #[tokio::test]
    async fn test_missing_files_are_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = store(&dir);

        assert!(store.load_keys().await.unwrap().is_empty());
        assert!(store.load_signals().await.unwrap().is_empty());
        assert!(store.load_subscribers().await.unwrap().is_empty());
        assert!(store.load_portfolio().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_keys_object_map() {
        let dir = tempfile::tempdir().unwrap();
        let body = serde_json::json!({
            "alice": {"id": "alice", "hash": hash_token("tok-a"), "tier": "pro", "active": true},
            "bob": {"hash": hash_token("tok-b"), "active": false},
            "weird": {"hash": hash_token("tok-c"), "tier": "platinum", "active": true}
        });
        fs::write(dir.path().join("api-keys.json"), body.to_string()).unwrap();

        let mut keys = store(&dir).load_keys().await.unwrap();
        keys.sort_by(|a, b| a.hash.cmp(&b.hash));
        assert_eq!(keys.len(), 3);
        let alice = keys.iter().find(|k| k.id.as_deref() == Some("alice")).unwrap();
        assert_eq!(alice.tier, Tier::Pro);
        let weird = keys.iter().find(|k| k.hash == hash_token("tok-c")).unwrap();
        assert_eq!(weird.tier, Tier::Free);
    }

    #[tokio::test]
    async fn test_keys_object_map_keeps_file_order() {
        let dir = tempfile::tempdir().unwrap();
        let hash = hash_token("shared");
        let body = format!(
            r#"{{"zed": {{"id": "zed", "hash": "{hash}", "active": true}},
                "amy": {{"id": "amy", "hash": "{hash}", "active": true}}}}"#
        );
        fs::write(dir.path().join("api-keys.json"), body).unwrap();

        let keys = store(&dir).load_keys().await.unwrap();
        let ids: Vec<_> = keys.iter().map(|k| k.id.as_deref()).collect();
        assert_eq!(ids, vec![Some("zed"), Some("amy")]);
    }

    #[tokio::test]
    async fn test_keys_array() {
        let dir = tempfile::tempdir().unwrap();
        let body =
            serde_json::json!([{"hash": hash_token("t"), "tier": "enterprise", "active": true}]);
        fs::write(dir.path().join("api-keys.json"), body.to_string()).unwrap();

        let keys = store(&dir).load_keys().await.unwrap();
        assert_eq!(keys[0].tier, Tier::Enterprise);
        assert!(keys[0].id.is_none());
    }

    #[tokio::test]
    async fn test_malformed_file_is_parse_error() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("alerts.json"), "[{not json").unwrap();

        let err = store(&dir).load_signals().await.unwrap_err();
        assert!(matches!(err, StoreError::Parse { .. }));
    }

    #[tokio::test]
    async fn test_bad_signal_entries_skipped() {
        let dir = tempfile::tempdir().unwrap();
        let body = serde_json::json!([
            {
                "type": "NEW_BUY",
                "symbol": "ELSA",
                "timestamp": "2026-02-01T08:00:00Z",
                "price": 1.5
            },
            {"type": "NEW_BUY", "timestamp": "yesterday"},
            {"symbol": "PEPE"}
        ]);
        fs::write(dir.path().join("alerts.json"), body.to_string()).unwrap();

        let signals = store(&dir).load_signals().await.unwrap();
        assert_eq!(signals.len(), 1);
        assert_eq!(signals[0].fields["price"], 1.5);
    }

    #[tokio::test]
    async fn test_scalar_file_rejected() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("subscribers.json"), "42").unwrap();

        let err = store(&dir).load_subscribers().await.unwrap_err();
        assert!(matches!(err, StoreError::Parse { .. }));
    }

    #[tokio::test]
    async fn test_rereads_on_every_call() {
        let dir = tempfile::tempdir().unwrap();
        let store = store(&dir);
        let path = dir.path().join("subscribers.json");

        fs::write(&path, "[]").unwrap();
        assert!(store.load_subscribers().await.unwrap().is_empty());

        let body = r#"[{"url": "https://a.test/h", "secret": "s", "active": true}]"#;
        fs::write(&path, body).unwrap();
        assert_eq!(store.load_subscribers().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_portfolio_snapshot() {
        let dir = tempfile::tempdir().unwrap();
        let body = serde_json::json!({
            "lastUpdate": "2026-02-01T12:00:00Z",
            "portfolioValue": 1234.567,
            "portfolioPnlPct": 3.14159,
            "cashPct": 40.0,
            "wallet": "0xabc",
            "positions": [{
                "symbol": "ELSA",
                "strategy": "momentum",
                "pnlPct": 1.0,
                "sizePct": 5.0,
                "holdHours": 3
            }]
        });
        fs::write(dir.path().join("dashboard.json"), body.to_string()).unwrap();

        let snapshot = store(&dir).load_portfolio().await.unwrap().unwrap();
        assert_eq!(snapshot.positions.len(), 1);
    }
}
