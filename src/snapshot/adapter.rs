use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use log::info;

use crate::error::SnapshotResult;

use super::format::SnapshotFormat;
use super::metadata::SnapshotMetadata;
use super::options::{SnapshotFilter, SnapshotOptions};
use super::partition_adapter::PartitionSnapshotAdapter;
use super::store_adapter::StoreSnapshotAdapter;

/// Uniform snapshot operations, independent of whether the backing engine
/// is store-wide or bound to a single partition.
///
/// An empty `configs` slice means "no work" and is never an error.
pub trait SnapshotServiceAdapter<K, V> {
    fn create_options(&self) -> SnapshotOptions<K, V>;

    /// Fresh options with the given filter attached.
    fn create_options_with_filter(
        &self,
        filter: Option<&SnapshotFilter<K, V>>,
    ) -> SnapshotOptions<K, V> {
        self.create_options().set_filter(filter.cloned())
    }

    /// Save every config in input order. The first failure aborts the rest.
    fn do_export(&self, configs: &[SnapshotMetadata<K, V>]) -> SnapshotResult<()> {
        for config in configs {
            let options = self.create_options_with_filter(config.filter());
            self.save_with_options(config.location(), config.format(), &options)?;
        }
        if !configs.is_empty() {
            crate::metrics::record_export_run();
            info!("snapshot export: {} config(s) done", configs.len());
        }
        Ok(())
    }

    fn do_import(&self, configs: &[SnapshotMetadata<K, V>]) -> SnapshotResult<()>;

    fn load(&self, location: &Path, format: SnapshotFormat) -> SnapshotResult<()>;

    fn load_with_options(
        &self,
        format: SnapshotFormat,
        options: &SnapshotOptions<K, V>,
        snapshots: &[PathBuf],
    ) -> SnapshotResult<()>;

    fn save(&self, location: &Path, format: SnapshotFormat) -> SnapshotResult<()>;

    fn save_with_options(
        &self,
        location: &Path,
        format: SnapshotFormat,
        options: &SnapshotOptions<K, V>,
    ) -> SnapshotResult<()>;
}

/// Snapshot files of a store-wide import directory.
///
/// Policy: immediate children only (no recursion), regular files only
/// (subdirectories and anything else are skipped), sorted by path.
pub fn list_snapshot_files(directory: &Path) -> Result<Vec<PathBuf>> {
    let rd = fs::read_dir(directory)
        .with_context(|| format!("read_dir {}", directory.display()))?;

    let mut files = Vec::new();
    for entry in rd {
        let entry = entry.with_context(|| format!("read_dir entry in {}", directory.display()))?;
        let path = entry.path();
        // is_file() следует симлинкам, как и проверка location в SnapshotMetadata.
        if path.is_file() {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServiceKind {
    Store,
    Partition,
}

impl fmt::Display for ServiceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ServiceKind::Store => f.write_str("store"),
            ServiceKind::Partition => f.write_str("partition"),
        }
    }
}

/// The adapter an orchestrator owns: exactly one of the two variants,
/// chosen once at construction.
pub enum SnapshotService<K, V> {
    Store(StoreSnapshotAdapter<K, V>),
    Partition(PartitionSnapshotAdapter<K, V>),
}

impl<K, V> SnapshotService<K, V> {
    pub fn kind(&self) -> ServiceKind {
        match self {
            SnapshotService::Store(_) => ServiceKind::Store,
            SnapshotService::Partition(_) => ServiceKind::Partition,
        }
    }

    pub fn as_store(&self) -> Option<&StoreSnapshotAdapter<K, V>> {
        match self {
            SnapshotService::Store(a) => Some(a),
            SnapshotService::Partition(_) => None,
        }
    }

    pub fn as_partition(&self) -> Option<&PartitionSnapshotAdapter<K, V>> {
        match self {
            SnapshotService::Partition(a) => Some(a),
            SnapshotService::Store(_) => None,
        }
    }
}

impl<K, V> SnapshotServiceAdapter<K, V> for SnapshotService<K, V> {
    fn create_options(&self) -> SnapshotOptions<K, V> {
        match self {
            SnapshotService::Store(a) => a.create_options(),
            SnapshotService::Partition(a) => a.create_options(),
        }
    }

    fn do_export(&self, configs: &[SnapshotMetadata<K, V>]) -> SnapshotResult<()> {
        match self {
            SnapshotService::Store(a) => a.do_export(configs),
            SnapshotService::Partition(a) => a.do_export(configs),
        }
    }

    fn do_import(&self, configs: &[SnapshotMetadata<K, V>]) -> SnapshotResult<()> {
        match self {
            SnapshotService::Store(a) => a.do_import(configs),
            SnapshotService::Partition(a) => a.do_import(configs),
        }
    }

    fn load(&self, location: &Path, format: SnapshotFormat) -> SnapshotResult<()> {
        match self {
            SnapshotService::Store(a) => a.load(location, format),
            SnapshotService::Partition(a) => a.load(location, format),
        }
    }

    fn load_with_options(
        &self,
        format: SnapshotFormat,
        options: &SnapshotOptions<K, V>,
        snapshots: &[PathBuf],
    ) -> SnapshotResult<()> {
        match self {
            SnapshotService::Store(a) => a.load_with_options(format, options, snapshots),
            SnapshotService::Partition(a) => a.load_with_options(format, options, snapshots),
        }
    }

    fn save(&self, location: &Path, format: SnapshotFormat) -> SnapshotResult<()> {
        match self {
            SnapshotService::Store(a) => a.save(location, format),
            SnapshotService::Partition(a) => a.save(location, format),
        }
    }

    fn save_with_options(
        &self,
        location: &Path,
        format: SnapshotFormat,
        options: &SnapshotOptions<K, V>,
    ) -> SnapshotResult<()> {
        match self {
            SnapshotService::Store(a) => a.save_with_options(location, format, options),
            SnapshotService::Partition(a) => a.save_with_options(location, format, options),
        }
    }
}
