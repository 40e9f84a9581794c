use std::path::{Path, PathBuf};
use std::sync::Arc;

use log::{debug, info};

use crate::error::{display_paths, SnapshotError, SnapshotResult};
use crate::metrics::{
    record_export_failure, record_import_failure, record_import_run, record_snapshot_files_loaded,
    record_snapshot_target_saved,
};

use super::adapter::{list_snapshot_files, SnapshotServiceAdapter};
use super::engine::StoreSnapshotEngine;
use super::format::SnapshotFormat;
use super::metadata::SnapshotMetadata;
use super::options::SnapshotOptions;

/// Adapter over a store-wide engine.
///
/// Import: a file location is loaded alone; a directory location is expanded
/// to its regular files (see `list_snapshot_files`) and loaded as one batch.
/// Export: the directory is handed to the engine, which decides the file layout.
pub struct StoreSnapshotAdapter<K, V> {
    engine: Arc<dyn StoreSnapshotEngine<K, V>>,
}

impl<K, V> StoreSnapshotAdapter<K, V> {
    pub fn new(engine: Arc<dyn StoreSnapshotEngine<K, V>>) -> Self {
        Self { engine }
    }

    pub fn engine(&self) -> &Arc<dyn StoreSnapshotEngine<K, V>> {
        &self.engine
    }

    fn resolve_snapshots(&self, config: &SnapshotMetadata<K, V>) -> SnapshotResult<Vec<PathBuf>> {
        if config.is_file() {
            return Ok(vec![config.location().to_path_buf()]);
        }
        list_snapshot_files(config.location()).map_err(|e| {
            record_import_failure();
            SnapshotError::Import {
                message: format!(
                    "Failed to list snapshots in directory ({}) in format ({})",
                    config.location().display(),
                    config.format()
                ),
                locations: vec![config.location().to_path_buf()],
                format: config.format(),
                options: None,
                source: e,
            }
        })
    }
}

impl<K, V> SnapshotServiceAdapter<K, V> for StoreSnapshotAdapter<K, V> {
    fn create_options(&self) -> SnapshotOptions<K, V> {
        self.engine.create_options()
    }

    fn do_import(&self, configs: &[SnapshotMetadata<K, V>]) -> SnapshotResult<()> {
        for config in configs {
            let snapshots = self.resolve_snapshots(config)?;
            let options = self.create_options_with_filter(config.filter());
            self.load_with_options(config.format(), &options, &snapshots)?;
        }
        if !configs.is_empty() {
            record_import_run();
            info!("store snapshot import: {} config(s) done", configs.len());
        }
        Ok(())
    }

    fn load(&self, directory: &Path, format: SnapshotFormat) -> SnapshotResult<()> {
        debug!("store snapshot load: dir={}, format={}", directory.display(), format);
        self.engine.load(directory, format).map_err(|e| {
            record_import_failure();
            SnapshotError::Import {
                message: format!(
                    "Failed to load snapshots from directory ({}) in format ({})",
                    directory.display(),
                    format
                ),
                locations: vec![directory.to_path_buf()],
                format,
                options: None,
                source: e,
            }
        })
    }

    fn load_with_options(
        &self,
        format: SnapshotFormat,
        options: &SnapshotOptions<K, V>,
        snapshots: &[PathBuf],
    ) -> SnapshotResult<()> {
        debug!(
            "store snapshot load: files={}, format={}, {}",
            display_paths(snapshots),
            format,
            options
        );
        // Один вызов движка на весь батч: фильтр применяется ко всему набору файлов.
        self.engine
            .load_files(snapshots, format, options)
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
        record_snapshot_files_loaded(snapshots.len());
        Ok(())
    }

    fn save(&self, directory: &Path, format: SnapshotFormat) -> SnapshotResult<()> {
        debug!("store snapshot save: dir={}, format={}", directory.display(), format);
        self.engine.save(directory, format).map_err(|e| {
            record_export_failure();
            SnapshotError::Export {
                message: format!(
                    "Failed to save snapshots to directory ({}) in format ({})",
                    directory.display(),
                    format
                ),
                location: directory.to_path_buf(),
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
        directory: &Path,
        format: SnapshotFormat,
        options: &SnapshotOptions<K, V>,
    ) -> SnapshotResult<()> {
        debug!(
            "store snapshot save: dir={}, format={}, {}",
            directory.display(),
            format,
            options
        );
        self.engine
            .save_with_options(directory, format, options)
            .map_err(|e| {
                record_export_failure();
                SnapshotError::Export {
                    message: format!(
                        "Failed to save snapshots to directory ({}) in format ({}) using options ({})",
                        directory.display(),
                        format,
                        options
                    ),
                    location: directory.to_path_buf(),
                    format,
                    options: Some(options.to_string()),
                    source: e,
                }
            })?;
        record_snapshot_target_saved();
        Ok(())
    }
}
