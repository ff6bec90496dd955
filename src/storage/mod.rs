//! Snapshot persistence layer.

pub mod local;
pub mod memory;
pub mod snapshot_store;
pub mod traits;

pub use local::SqliteStore;
pub use memory::MemoryStore;
pub use snapshot_store::SnapshotStore;
pub use traits::KvStore;
