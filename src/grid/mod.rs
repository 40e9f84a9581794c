//! grid: минимальный in-memory data grid (Store -> Partition) со своими snapshot-движками.
//!
//! Состав:
//! - partition.rs: Partition (именованная упорядоченная byte KV map).
//! - store.rs: Store (набор партиций).
//! - codec.rs: формат файлов снапшота (native / json).
//! - engines.rs: StoreSnapshotService / PartitionSnapshotService, реализации
//!   StoreSnapshotEngine / PartitionSnapshotEngine для этого grid.

pub mod codec;

mod engines;
mod partition;
mod store;

pub use engines::{PartitionSnapshotService, StoreSnapshotService};
pub use partition::Partition;
pub use store::Store;

use std::sync::Arc;

impl Store {
    /// Store-wide snapshot engine over this store.
    pub fn snapshot_service(self: &Arc<Self>) -> StoreSnapshotService {
        StoreSnapshotService::new(Arc::clone(self))
    }
}

impl Partition {
    /// Snapshot engine bound to this partition.
    pub fn snapshot_service(self: &Arc<Self>) -> PartitionSnapshotService {
        PartitionSnapshotService::new(Arc::clone(self))
    }
}
