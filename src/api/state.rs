//! API state shared across request handlers.

use crate::storage::{KvStore, SnapshotStore};
use std::sync::Arc;

pub struct ApiState {
    pub snapshots: SnapshotStore<Arc<dyn KvStore>>,
}

impl ApiState {
    pub fn new(kv: Arc<dyn KvStore>, snapshot_key: &str) -> Self {
        Self {
            snapshots: SnapshotStore::with_key(kv, snapshot_key),
        }
    }
}
