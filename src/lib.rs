// Базовые модули
pub mod consts;
pub mod error;
pub mod metrics;
pub mod config;

// Snapshot service: metadata, adapters (store / partition), orchestrator, events
pub mod snapshot; // src/snapshot/{mod,format,options,metadata,engine,adapter,...}.rs

// In-memory grid + его snapshot-движки (native/json файлы)
pub mod grid; // src/grid/{mod,partition,store,codec,engines}.rs

// Удобные реэкспорты
pub use config::{MetadataConfig, SnapshotServiceConfig};
pub use error::{SnapshotError, SnapshotResult};
pub use grid::{Partition, PartitionSnapshotService, Store, StoreSnapshotService};
pub use snapshot::{
    SnapshotFilter, SnapshotFormat, SnapshotMetadata, SnapshotOptions, SnapshotOrchestrator,
    SnapshotService, SnapshotServiceAdapter, SnapshotTriggerEvent,
};
