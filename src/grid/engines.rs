//! Snapshot engines of the in-memory grid.
//!
//! - StoreSnapshotService: store-wide; save writes one file per partition into a directory,
//!   load accepts a batch of files and routes each to the partition named in its header
//!   (missing partitions are created).
//! - PartitionSnapshotService: one partition, one file per call.
//!
//! Both apply the options' filter on save (what gets written) and on load (what gets applied).

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{anyhow, Context, Result};
use log::{debug, info, warn};

use crate::snapshot::{
    PartitionSnapshotEngine, SnapshotFormat, SnapshotOptions, StoreSnapshotEngine,
};

use super::codec::{read_snapshot_file, snapshot_file_name, write_snapshot_file, SnapshotFile};
use super::partition::Partition;
use super::store::Store;

type Bytes = Vec<u8>;

fn apply_entries(
    partition: &Partition,
    file: SnapshotFile,
    options: &SnapshotOptions<Bytes, Bytes>,
) -> usize {
    let accepted = file
        .entries
        .into_iter()
        .filter(|(k, v)| options.accepts(k, v));
    partition.put_all(accepted)
}

fn save_partition(
    partition: &Partition,
    path: &Path,
    format: SnapshotFormat,
    options: &SnapshotOptions<Bytes, Bytes>,
) -> Result<()> {
    let entries = partition.entries_filtered(|k, v| options.accepts(k, v));
    let bytes = write_snapshot_file(path, format, partition.name(), &entries)?;
    debug!(
        "snapshot save: partition={}, entries={}, bytes={}, file={}",
        partition.name(),
        entries.len(),
        bytes,
        path.display()
    );
    Ok(())
}

// ---------------------- store-wide ----------------------

pub struct StoreSnapshotService {
    store: Arc<Store>,
}

impl StoreSnapshotService {
    pub fn new(store: Arc<Store>) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &Arc<Store> {
        &self.store
    }

    /// Snapshot files of `format` directly inside `directory` (by extension), sorted.
    fn files_in(directory: &Path, format: SnapshotFormat) -> Result<Vec<PathBuf>> {
        let mut files = Vec::new();
        for entry in
            fs::read_dir(directory).with_context(|| format!("read_dir {}", directory.display()))?
        {
            let path = entry?.path();
            let ext_ok = path
                .extension()
                .map(|e| e == format.extension())
                .unwrap_or(false);
            if path.is_file() && ext_ok {
                files.push(path);
            }
        }
        files.sort();
        Ok(files)
    }
}

impl StoreSnapshotEngine<Bytes, Bytes> for StoreSnapshotService {
    fn create_options(&self) -> SnapshotOptions<Bytes, Bytes> {
        SnapshotOptions::new()
    }

    fn load(&self, directory: &Path, format: SnapshotFormat) -> Result<()> {
        let files = Self::files_in(directory, format)?;
        self.load_files(&files, format, &self.create_options())
    }

    fn load_files(
        &self,
        snapshots: &[PathBuf],
        format: SnapshotFormat,
        options: &SnapshotOptions<Bytes, Bytes>,
    ) -> Result<()> {
        // Сначала декодируем весь батч: битый файл не должен оставить store частично загруженным.
        let mut decoded = Vec::with_capacity(snapshots.len());
        for path in snapshots {
            decoded.push(read_snapshot_file(path, format)?);
        }

        let mut total = 0usize;
        for file in decoded {
            let partition = self
                .store
                .get_or_create_partition(&file.partition)
                .with_context(|| format!("resolve partition '{}'", file.partition))?;
            total += apply_entries(&partition, file, options);
        }
        info!(
            "store snapshot: loaded {} entries from {} file(s), format={}",
            total,
            snapshots.len(),
            format
        );
        Ok(())
    }

    fn save(&self, directory: &Path, format: SnapshotFormat) -> Result<()> {
        self.save_with_options(directory, format, &self.create_options())
    }

    fn save_with_options(
        &self,
        directory: &Path,
        format: SnapshotFormat,
        options: &SnapshotOptions<Bytes, Bytes>,
    ) -> Result<()> {
        if !directory.is_dir() {
            return Err(anyhow!(
                "store snapshot target {} is not a directory",
                directory.display()
            ));
        }
        let partitions = self.store.partitions();
        for p in &partitions {
            let path = directory.join(snapshot_file_name(p.name(), format));
            save_partition(p, &path, format, options)?;
        }
        info!(
            "store snapshot: saved {} partition(s) to {}, format={}",
            partitions.len(),
            directory.display(),
            format
        );
        Ok(())
    }
}

// ---------------------- single partition ----------------------

pub struct PartitionSnapshotService {
    partition: Arc<Partition>,
}

impl PartitionSnapshotService {
    pub fn new(partition: Arc<Partition>) -> Self {
        Self { partition }
    }

    pub fn partition(&self) -> &Arc<Partition> {
        &self.partition
    }

    /// A directory target gets `<dir>/<partition>.<ext>`; anything else is used as the file itself.
    fn target_file(&self, target: &Path, format: SnapshotFormat) -> PathBuf {
        if target.is_dir() {
            target.join(snapshot_file_name(self.partition.name(), format))
        } else {
            target.to_path_buf()
        }
    }
}

impl PartitionSnapshotEngine<Bytes, Bytes> for PartitionSnapshotService {
    fn partition_name(&self) -> &str {
        self.partition.name()
    }

    fn create_options(&self) -> SnapshotOptions<Bytes, Bytes> {
        SnapshotOptions::new()
    }

    fn load(&self, snapshot: &Path, format: SnapshotFormat) -> Result<()> {
        self.load_with_options(snapshot, format, &self.create_options())
    }

    fn load_with_options(
        &self,
        snapshot: &Path,
        format: SnapshotFormat,
        options: &SnapshotOptions<Bytes, Bytes>,
    ) -> Result<()> {
        if !snapshot.is_file() {
            return Err(anyhow!(
                "partition snapshot {} is not a regular file",
                snapshot.display()
            ));
        }
        let file = read_snapshot_file(snapshot, format)?;
        if file.partition != self.partition.name() {
            warn!(
                "partition snapshot {} was taken from partition '{}', loading into '{}'",
                snapshot.display(),
                file.partition,
                self.partition.name()
            );
        }
        let n = apply_entries(&self.partition, file, options);
        info!(
            "partition snapshot: loaded {} entries into '{}' from {}",
            n,
            self.partition.name(),
            snapshot.display()
        );
        Ok(())
    }

    fn save(&self, snapshot: &Path, format: SnapshotFormat) -> Result<()> {
        self.save_with_options(snapshot, format, &self.create_options())
    }

    fn save_with_options(
        &self,
        snapshot: &Path,
        format: SnapshotFormat,
        options: &SnapshotOptions<Bytes, Bytes>,
    ) -> Result<()> {
        let path = self.target_file(snapshot, format);
        save_partition(&self.partition, &path, format, options)?;
        info!(
            "partition snapshot: saved '{}' to {}",
            self.partition.name(),
            path.display()
        );
        Ok(())
    }
}
