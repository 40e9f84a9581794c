use std::path::{Path, PathBuf};
use std::sync::Arc;

use log::{debug, info};

use crate::error::{display_paths, SnapshotError, SnapshotResult};
use crate::metrics::{
    record_export_failure, record_import_failure, record_import_run, record_snapshot_files_loaded,
    record_snapshot_target_saved,
};

use super::adapter::SnapshotServiceAdapter;
use super::engine::PartitionSnapshotEngine;
use super::format::SnapshotFormat;
use super::metadata::SnapshotMetadata;
use super::options::SnapshotOptions;

/// Adapter over a partition-scoped engine. Everything is file-oriented:
/// one engine call per file, no directory expansion.
pub struct PartitionSnapshotAdapter<K, V> {
    engine: Arc<dyn PartitionSnapshotEngine<K, V>>,
}

impl<K, V> PartitionSnapshotAdapter<K, V> {
    pub fn new(engine: Arc<dyn PartitionSnapshotEngine<K, V>>) -> Self {
        Self { engine }
    }

    pub fn engine(&self) -> &Arc<dyn PartitionSnapshotEngine<K, V>> {
        &self.engine
    }

    pub fn partition_name(&self) -> &str {
        self.engine.partition_name()
    }
}

impl<K, V> SnapshotServiceAdapter<K, V> for PartitionSnapshotAdapter<K, V> {
    fn create_options(&self) -> SnapshotOptions<K, V> {
        self.engine.create_options()
    }

    fn do_import(&self, configs: &[SnapshotMetadata<K, V>]) -> SnapshotResult<()> {
        for config in configs {
            let options = self.create_options_with_filter(config.filter());
            self.load_with_options(
                config.format(),
                &options,
                &[config.location().to_path_buf()],
            )?;
        }
        if !configs.is_empty() {
            record_import_run();
            info!(
                "partition snapshot import: partition={}, {} config(s) done",
                self.partition_name(),
                configs.len()
            );
        }
        Ok(())
    }

    fn load(&self, snapshot: &Path, format: SnapshotFormat) -> SnapshotResult<()> {
        debug!(
            "partition snapshot load: partition={}, file={}, format={}",
            self.partition_name(),
            snapshot.display(),
            format
        );
        self.engine.load(snapshot, format).map_err(|e| {
            record_import_failure();
            SnapshotError::Import {
                message: format!(
                    "Failed to load snapshot from file ({}) in format ({})",
                    snapshot.display(),
                    format
                ),
                locations: vec![snapshot.to_path_buf()],
                format,
                options: None,
                source: e,
            }
        })?;
        record_snapshot_files_loaded(1);
        Ok(())
    }

    /// The engine takes one file at a time: a failure on file N stops the loop,
    /// files 1..N-1 stay loaded.
    fn load_with_options(
        &self,
        format: SnapshotFormat,
        options: &SnapshotOptions<K, V>,
        snapshots: &[PathBuf],
    ) -> SnapshotResult<()> {
        for snapshot in snapshots {
            debug!(
                "partition snapshot load: partition={}, file={}, format={}, {}",
                self.partition_name(),
                snapshot.display(),
                format,
                options
            );
            self.engine
                .load_with_options(snapshot, format, options)
                .map_err(|e| {
                    record_import_failure();
                    SnapshotError::Import {
                        message: format!(
                            "Failed to load snapshots ({}) in format ({}) using options ({})",
                            display_paths(snapshots),
                            format,
                            options
                        ),
                        locations: snapshots.to_vec(),
                        format,
                        options: Some(options.to_string()),
                        source: e,
                    }
                })?;
            record_snapshot_files_loaded(1);
        }
        Ok(())
    }

    fn save(&self, snapshot: &Path, format: SnapshotFormat) -> SnapshotResult<()> {
        debug!(
            "partition snapshot save: partition={}, file={}, format={}",
            self.partition_name(),
            snapshot.display(),
            format
        );
        self.engine.save(snapshot, format).map_err(|e| {
            record_export_failure();
            SnapshotError::Export {
                message: format!(
                    "Failed to save snapshot to file ({}) in format ({})",
                    snapshot.display(),
                    format
                ),
                location: snapshot.to_path_buf(),
                format,
                options: None,
                source: e,
            }
        })?;
        record_snapshot_target_saved();
        Ok(())
    }

    fn save_with_options(
        &self,
        snapshot: &Path,
        format: SnapshotFormat,
        options: &SnapshotOptions<K, V>,
    ) -> SnapshotResult<()> {
        debug!(
            "partition snapshot save: partition={}, file={}, format={}, {}",
            self.partition_name(),
            snapshot.display(),
            format,
            options
        );
        self.engine
            .save_with_options(snapshot, format, options)
            .map_err(|e| {
                record_export_failure();
                SnapshotError::Export {
                    message: format!(
                        "Failed to save snapshot to file ({}) in format ({}) using options ({})",
                        snapshot.display(),
                        format,
                        options
                    ),
                    location: snapshot.to_path_buf(),
                    format,
                    options: Some(options.to_string()),
                    source: e,
                }
            })?;
        record_snapshot_target_saved();
        Ok(())
    }
}
