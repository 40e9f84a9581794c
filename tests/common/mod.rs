// Общие помощники для интеграционных тестов: временные каталоги и "записывающие" движки.
#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;
use std::time::{SystemTime, UNIX_EPOCH};

use anyhow::{anyhow, Result};

use gridsnap::snapshot::{PartitionSnapshotEngine, StoreSnapshotEngine};
use gridsnap::{SnapshotFormat, SnapshotOptions};

pub type Bytes = Vec<u8>;

static NEXT_ID: AtomicU64 = AtomicU64::new(1);

/// Уникальный (созданный) корневой путь для теста.
pub fn unique_root(prefix: &str) -> PathBuf {
    let pid = std::process::id();
    let t = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_nanos();
    let id = NEXT_ID.fetch_add(1, Ordering::Relaxed);
    let root = std::env::temp_dir().join(format!("gstest-{prefix}-{pid}-{t}-{id}"));
    fs::create_dir_all(&root).expect("create test root");
    root
}

pub fn touch(path: &Path) -> PathBuf {
    fs::write(path, b"").expect("touch");
    path.to_path_buf()
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    LoadDir {
        dir: PathBuf,
        format: SnapshotFormat,
    },
    Load {
        files: Vec<PathBuf>,
        format: SnapshotFormat,
        filtered: bool,
    },
    Save {
        target: PathBuf,
        format: SnapshotFormat,
        filtered: bool,
    },
}

/// Store-wide engine that records every call and can be told to fail.
#[derive(Default)]
pub struct RecordingStoreEngine {
    pub calls: Mutex<Vec<Call>>,
    pub fail_load: bool,
    pub fail_save: bool,
}

impl RecordingStoreEngine {
    pub fn failing_load() -> Self {
        Self {
            fail_load: true,
            ..Self::default()
        }
    }

    pub fn failing_save() -> Self {
        Self {
            fail_save: true,
            ..Self::default()
        }
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }
}

impl StoreSnapshotEngine<Bytes, Bytes> for RecordingStoreEngine {
    fn create_options(&self) -> SnapshotOptions<Bytes, Bytes> {
        SnapshotOptions::new()
    }

    fn load(&self, directory: &Path, format: SnapshotFormat) -> Result<()> {
        self.calls.lock().unwrap().push(Call::LoadDir {
            dir: directory.to_path_buf(),
            format,
        });
        if self.fail_load {
            return Err(anyhow!("engine load boom"));
        }
        Ok(())
    }

    fn load_files(
        &self,
        snapshots: &[PathBuf],
        format: SnapshotFormat,
        options: &SnapshotOptions<Bytes, Bytes>,
    ) -> Result<()> {
        self.calls.lock().unwrap().push(Call::Load {
            files: snapshots.to_vec(),
            format,
            filtered: options.is_filter_present(),
        });
        if self.fail_load {
            return Err(anyhow!("engine load boom"));
        }
        Ok(())
    }

    fn save(&self, directory: &Path, format: SnapshotFormat) -> Result<()> {
        self.save_with_options(directory, format, &SnapshotOptions::new())
    }

    fn save_with_options(
        &self,
        directory: &Path,
        format: SnapshotFormat,
        options: &SnapshotOptions<Bytes, Bytes>,
    ) -> Result<()> {
        self.calls.lock().unwrap().push(Call::Save {
            target: directory.to_path_buf(),
            format,
            filtered: options.is_filter_present(),
        });
        if self.fail_save {
            return Err(anyhow!("engine save boom"));
        }
        Ok(())
    }
}

/// Partition engine recording calls; `fail_on_load` = 1-based index of the load call that fails.
pub struct RecordingPartitionEngine {
    pub name: String,
    pub calls: Mutex<Vec<Call>>,
    pub fail_on_load: Option<usize>,
    pub fail_save: bool,
}

impl RecordingPartitionEngine {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            calls: Mutex::new(Vec::new()),
            fail_on_load: None,
            fail_save: false,
        }
    }

    pub fn failing_on_load(name: &str, nth: usize) -> Self {
        Self {
            fail_on_load: Some(nth),
            ..Self::new(name)
        }
    }

    pub fn failing_save(name: &str) -> Self {
        Self {
            fail_save: true,
            ..Self::new(name)
        }
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    fn record_load(&self, file: &Path, format: SnapshotFormat, filtered: bool) -> Result<()> {
        let mut calls = self.calls.lock().unwrap();
        calls.push(Call::Load {
            files: vec![file.to_path_buf()],
            format,
            filtered,
        });
        let n = calls
            .iter()
            .filter(|c| matches!(c, Call::Load { .. }))
            .count();
        if self.fail_on_load == Some(n) {
            return Err(anyhow!("engine load boom on call {}", n));
        }
        Ok(())
    }
}

impl PartitionSnapshotEngine<Bytes, Bytes> for RecordingPartitionEngine {
    fn partition_name(&self) -> &str {
        &self.name
    }

    fn create_options(&self) -> SnapshotOptions<Bytes, Bytes> {
        SnapshotOptions::new()
    }

    fn load(&self, snapshot: &Path, format: SnapshotFormat) -> Result<()> {
        self.record_load(snapshot, format, false)
    }

    fn load_with_options(
        &self,
        snapshot: &Path,
        format: SnapshotFormat,
        options: &SnapshotOptions<Bytes, Bytes>,
    ) -> Result<()> {
        self.record_load(snapshot, format, options.is_filter_present())
    }

    fn save(&self, snapshot: &Path, format: SnapshotFormat) -> Result<()> {
        self.save_with_options(snapshot, format, &SnapshotOptions::new())
    }

    fn save_with_options(
        &self,
        snapshot: &Path,
        format: SnapshotFormat,
        options: &SnapshotOptions<Bytes, Bytes>,
    ) -> Result<()> {
        self.calls.lock().unwrap().push(Call::Save {
            target: snapshot.to_path_buf(),
            format,
            filtered: options.is_filter_present(),
        });
        if self.fail_save {
            return Err(anyhow!("engine save boom"));
        }
        Ok(())
    }
}
