//! Adjustment log: append-only audit of user corrections
//!
//! Stores expose no update or delete. Reads and writes are always scoped to a
//! tenant.

use async_trait::async_trait;
use parking_lot::RwLock;
use std::path::PathBuf;
use takeoff_types::{AdjustmentLogEntry, QuoteId, StoreError, StoreResult, TenantId};
use tokio::fs::{File, OpenOptions};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};

/// Append-only adjustment log
#[async_trait]
pub trait AdjustmentLogStore: Send + Sync {
    /// Append an entry
    async fn append(&self, entry: AdjustmentLogEntry) -> StoreResult<()>;

    /// Entries for one quote, newest first
    async fn list_by_quote(
        &self,
        tenant: &TenantId,
        quote_id: &QuoteId,
    ) -> StoreResult<Vec<AdjustmentLogEntry>>;
}

/// In-memory adjustment log for testing and the CLI
pub struct MemoryAdjustmentLog {
    entries: RwLock<Vec<AdjustmentLogEntry>>,
}

impl MemoryAdjustmentLog {
    pub fn new() -> Self {
        Self {
            entries: RwLock::new(Vec::new()),
        }
    }

    /// Snapshot of every entry, oldest first
    pub fn entries(&self) -> Vec<AdjustmentLogEntry> {
        self.entries.read().clone()
    }
}

impl Default for MemoryAdjustmentLog {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl AdjustmentLogStore for MemoryAdjustmentLog {
    async fn append(&self, entry: AdjustmentLogEntry) -> StoreResult<()> {
        self.entries.write().push(entry);
        Ok(())
    }

    async fn list_by_quote(
        &self,
        tenant: &TenantId,
        quote_id: &QuoteId,
    ) -> StoreResult<Vec<AdjustmentLogEntry>> {
        let entries = self.entries.read();
        Ok(entries
            .iter()
            .rev()
            .filter(|e| &e.tenant == tenant && &e.quote_id == quote_id)
            .cloned()
            .collect())
    }
}

/// Adjustment log persisted as JSON lines, one entry per line
pub struct JsonlAdjustmentLog {
    path: PathBuf,
}

impl JsonlAdjustmentLog {
    /// Open (creating parent directories if needed) a log at `path`
    pub async fn open(path: impl Into<PathBuf>) -> StoreResult<Self> {
        let path = path.into();
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent)
                    .await
                    .map_err(|e| StoreError::Unavailable(e.to_string()))?;
            }
        }
        Ok(Self { path })
    }

    pub fn path(&self) -> &PathBuf {
        &self.path
    }

    async fn read_all(&self) -> StoreResult<Vec<AdjustmentLogEntry>> {
        if !self.path.exists() {
            return Ok(Vec::new());
        }

        let file = File::open(&self.path)
            .await
            .map_err(|e| StoreError::Unavailable(e.to_string()))?;
        let mut lines = BufReader::new(file).lines();
        let mut entries = Vec::new();

        while let Some(line) = lines
            .next_line()
            .await
            .map_err(|e| StoreError::Unavailable(e.to_string()))?
        {
            if line.trim().is_empty() {
                continue;
            }
            let entry: AdjustmentLogEntry = serde_json::from_str(&line)
                .map_err(|e| StoreError::Serialization(e.to_string()))?;
            entries.push(entry);
        }

        Ok(entries)
    }
}

#[async_trait]
impl AdjustmentLogStore for JsonlAdjustmentLog {
    async fn append(&self, entry: AdjustmentLogEntry) -> StoreResult<()> {
        let json =
            serde_json::to_string(&entry).map_err(|e| StoreError::Serialization(e.to_string()))?;

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .await
            .map_err(|e| StoreError::Unavailable(e.to_string()))?;

        file.write_all(format!("{}\n", json).as_bytes())
            .await
            .map_err(|e| StoreError::Unavailable(e.to_string()))?;
        file.flush()
            .await
            .map_err(|e| StoreError::Unavailable(e.to_string()))?;
        Ok(())
    }

    async fn list_by_quote(
        &self,
        tenant: &TenantId,
        quote_id: &QuoteId,
    ) -> StoreResult<Vec<AdjustmentLogEntry>> {
        let mut entries: Vec<_> = self
            .read_all()
            .await?
            .into_iter()
            .filter(|e| &e.tenant == tenant && &e.quote_id == quote_id)
            .collect();
        entries.reverse();
        Ok(entries)
    }
}
