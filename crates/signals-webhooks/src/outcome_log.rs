//! Append-only dispatch outcome logs.

use async_trait::async_trait;
use signals_core::DispatchRecord;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tokio::io::AsyncWriteExt;
use tracing::error;

/// Sink for dispatch records. Appends must be safe from concurrent deliveries.
///
/// Implementations swallow their own failures: losing an observability record
/// must never affect delivery.
#[async_trait]
pub trait OutcomeLog: Send + Sync {
    async fn append(&self, record: &DispatchRecord);
}

/// Keeps records in memory.
#[derive(Debug, Default)]
pub struct MemoryOutcomeLog {
    records: Mutex<Vec<DispatchRecord>>,
}

impl MemoryOutcomeLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of everything appended so far.
    pub fn records(&self) -> Vec<DispatchRecord> {
        self.records
            .lock()
            .map(|r| r.clone())
            .unwrap_or_default()
    }
}

#[async_trait]
impl OutcomeLog for MemoryOutcomeLog {
    async fn append(&self, record: &DispatchRecord) {
        if let Ok(mut records) = self.records.lock() {
            records.push(record.clone());
        }
    }
}

/// Writes one JSON object per line to a file.
pub struct FileOutcomeLog {
    path: PathBuf,
    file: tokio::sync::Mutex<tokio::fs::File>,
}

impl FileOutcomeLog {
    /// Open (or create) the log for appending, creating parent directories.
    pub async fn open(path: impl AsRef<Path>) -> std::io::Result<Self> {
        let path = path.as_ref().to_path_buf();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await?;
        }
        let file = tokio::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .await?;
        Ok(Self {
            path,
            file: tokio::sync::Mutex::new(file),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl OutcomeLog for FileOutcomeLog {
    async fn append(&self, record: &DispatchRecord) {
        let mut line = match serde_json::to_string(record) {
            Ok(line) => line,
            Err(e) => {
                error!(error = %e, "Failed to encode dispatch record");
                return;
            }
        };
        line.push('\n');

        let mut file = self.file.lock().await;
        if let Err(e) = file.write_all(line.as_bytes()).await {
            error!(path = %self.path.display(), error = %e, "Failed to append dispatch record");
            return;
        }
        if let Err(e) = file.flush().await {
            error!(path = %self.path.display(), error = %e, "Failed to flush dispatch log");
        }
    }
}
