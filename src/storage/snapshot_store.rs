//! Snapshot Store Adapter
//!
//! Serializes the [`Snapshot`] to JSON under a single key of a [`KvStore`].

use super::traits::KvStore;
use crate::error::Result;
use crate::snapshot::Snapshot;
use tracing::debug;

/// Default key of the snapshot record
pub const DEFAULT_SNAPSHOT_KEY: &str = "data";

pub struct SnapshotStore<S> {
    kv: S,
    key: String,
}

impl<S: KvStore> SnapshotStore<S> {
    pub fn new(kv: S) -> Self {
        Self::with_key(kv, DEFAULT_SNAPSHOT_KEY)
    }

    pub fn with_key(kv: S, key: impl Into<String>) -> Self {
        Self {
            kv,
            key: key.into(),
        }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    /// Load the current snapshot; `None` before the first refresh
    pub async fn load(&self) -> Result<Option<Snapshot>> {
        match self.kv.get(&self.key).await? {
            Some(raw) => {
                let snapshot: Snapshot = serde_json::from_str(&raw)?;
                debug!(
                    "Loaded snapshot '{}': {} runs, last updated {}",
                    self.key,
                    snapshot.runs.len(),
                    snapshot.last_updated
                );
                Ok(Some(snapshot))
            }
            None => Ok(None),
        }
    }

    /// Replace the stored snapshot with one write
    pub async fn save(&self, snapshot: &Snapshot) -> Result<()> {
        let raw = serde_json::to_string(snapshot)?;
        self.kv.put(&self.key, raw).await?;
        debug!("Saved snapshot '{}': {} runs", self.key, snapshot.runs.len());
        Ok(())
    }
}
