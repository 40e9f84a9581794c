//! Backing snapshot engines (the capabilities the adapters wrap).
//!
//! Two shapes:
//! - StoreSnapshotEngine: store-wide, operates on a directory (save) or a batch of files (load);
//!   the engine decides how many files a save produces.
//! - PartitionSnapshotEngine: one named partition, strictly one file per call.
//!
//! Engine errors are plain `anyhow::Error`; translation into `SnapshotError` is the adapters' job.

use std::path::{Path, PathBuf};

use anyhow::Result;

use super::format::SnapshotFormat;
use super::options::SnapshotOptions;

pub trait StoreSnapshotEngine<K, V>: Send + Sync {
    /// Fresh options, no filter attached.
    fn create_options(&self) -> SnapshotOptions<K, V>;

    /// Load every snapshot found in `directory` with default options.
    fn load(&self, directory: &Path, format: SnapshotFormat) -> Result<()>;

    /// Load the given files as one batch with one set of options.
    fn load_files(
        &self,
        snapshots: &[PathBuf],
        format: SnapshotFormat,
        options: &SnapshotOptions<K, V>,
    ) -> Result<()>;

    /// Save the whole store into `directory` with default options.
    fn save(&self, directory: &Path, format: SnapshotFormat) -> Result<()>;

    fn save_with_options(
        &self,
        directory: &Path,
        format: SnapshotFormat,
        options: &SnapshotOptions<K, V>,
    ) -> Result<()>;
}

pub trait PartitionSnapshotEngine<K, V>: Send + Sync {
    /// Name of the partition this engine is bound to.
    fn partition_name(&self) -> &str;

    fn create_options(&self) -> SnapshotOptions<K, V>;

    fn load(&self, snapshot: &Path, format: SnapshotFormat) -> Result<()>;

    fn load_with_options(
        &self,
        snapshot: &Path,
        format: SnapshotFormat,
        options: &SnapshotOptions<K, V>,
    ) -> Result<()>;

    fn save(&self, snapshot: &Path, format: SnapshotFormat) -> Result<()>;

    fn save_with_options(
        &self,
        snapshot: &Path,
        format: SnapshotFormat,
        options: &SnapshotOptions<K, V>,
    ) -> Result<()>;
}
