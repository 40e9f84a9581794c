//! Snapshot service split into submodules:
//! - format.rs: SnapshotFormat (native/json).
//! - options.rs: SnapshotFilter / SnapshotOptions (per-operation filter).
//! - metadata.rs: SnapshotMetadata (location + filter + format of one unit of work).
//! - engine.rs: backing engine capabilities (store-wide and partition-scoped).
//! - adapter.rs: SnapshotServiceAdapter contract + SnapshotService (two-variant dispatch).
//! - store_adapter.rs / partition_adapter.rs: the two adapter variants.
//! - event.rs: trigger events, listener boundary and inline dispatcher.
//! - orchestrator.rs: SnapshotOrchestrator (initialize/import, trigger/export, shutdown/export).

mod format;
mod options;
mod metadata;
mod engine;
mod adapter;
mod store_adapter;
mod partition_adapter;
mod event;
mod orchestrator;

pub use format::SnapshotFormat;
pub use options::{SnapshotFilter, SnapshotOptions};
pub use metadata::{null_safe_is_directory, null_safe_is_file, SnapshotMetadata};
pub use engine::{PartitionSnapshotEngine, StoreSnapshotEngine};
pub use adapter::{list_snapshot_files, ServiceKind, SnapshotService, SnapshotServiceAdapter};
pub use store_adapter::StoreSnapshotAdapter;
pub use partition_adapter::PartitionSnapshotAdapter;
pub use event::{
    normalize_partition_name, EventDispatcher, SnapshotEventListener, SnapshotTarget,
    SnapshotTriggerEvent,
};
pub use orchestrator::SnapshotOrchestrator;
