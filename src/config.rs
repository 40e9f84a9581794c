//! Centralized configuration for the snapshot service.
//!
//! Sources:
//! - JSON document (`SnapshotServiceConfig::from_json_file`):
//!   {
//!     "partition": "orders",                      // optional; absent => store-wide
//!     "imports": [{"location": "/var/snap/in", "format": "native", "key_prefix": "user:"}],
//!     "exports": [{"location": "/var/snap/out"}]
//!   }
//! - ENV (`SnapshotServiceConfig::from_env`):
//!   GS_SNAPSHOT_PARTITION = "orders"
//!   GS_SNAPSHOT_IMPORTS   = "/a,/b"   (comma or ';' separated locations)
//!   GS_SNAPSHOT_EXPORTS   = "/out"
//!   GS_SNAPSHOT_FORMAT    = native|json (format for env-provided locations; default native)
//! - fluent `with_*` setters on top of either.
//!
//! Locations are only checked when turned into `SnapshotMetadata` (`to_metadata`),
//! where a missing path fails fast.

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::consts::{ENV_EXPORTS, ENV_FORMAT, ENV_IMPORTS, ENV_PARTITION};
use crate::grid::Store;
use crate::snapshot::{SnapshotFilter, SnapshotFormat, SnapshotMetadata, SnapshotOrchestrator};

/// One import/export entry as written in configuration.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetadataConfig {
    pub location: PathBuf,
    #[serde(default)]
    pub format: Option<SnapshotFormat>,
    /// Only keys starting with this prefix take part (UTF-8 prefix of the byte key).
    #[serde(default)]
    pub key_prefix: Option<String>,
}

impl MetadataConfig {
    pub fn new<P: Into<PathBuf>>(location: P) -> Self {
        Self {
            location: location.into(),
            format: None,
            key_prefix: None,
        }
    }

    pub fn with_format(mut self, format: Option<SnapshotFormat>) -> Self {
        self.format = format;
        self
    }

    pub fn with_key_prefix<S: Into<String>>(mut self, prefix: Option<S>) -> Self {
        self.key_prefix = prefix.map(Into::into);
        self
    }

    /// Build runtime metadata. Fails if the location does not exist.
    pub fn to_metadata(&self) -> Result<SnapshotMetadata<Vec<u8>, Vec<u8>>> {
        let filter = self
            .key_prefix
            .as_ref()
            .map(|p| SnapshotFilter::key_prefix(p.as_bytes().to_vec()));
        let md = SnapshotMetadata::new(self.location.clone(), filter, self.format)
            .with_context(|| format!("snapshot metadata for {}", self.location.display()))?;
        Ok(md)
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SnapshotServiceConfig {
    /// Partition to snapshot; None => the whole store.
    #[serde(default)]
    pub partition: Option<String>,
    #[serde(default)]
    pub imports: Vec<MetadataConfig>,
    #[serde(default)]
    pub exports: Vec<MetadataConfig>,
}

impl SnapshotServiceConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        let mut cfg = Self::default();

        if let Ok(v) = std::env::var(ENV_PARTITION) {
            let s = v.trim();
            if !s.is_empty() {
                cfg.partition = Some(s.to_string());
            }
        }

        let format = std::env::var(ENV_FORMAT)
            .ok()
            .and_then(|v| v.parse::<SnapshotFormat>().ok());

        if let Ok(v) = std::env::var(ENV_IMPORTS) {
            cfg.imports = split_locations(&v)
                .into_iter()
                .map(|p| MetadataConfig::new(p).with_format(format))
                .collect();
        }

        if let Ok(v) = std::env::var(ENV_EXPORTS) {
            cfg.exports = split_locations(&v)
                .into_iter()
                .map(|p| MetadataConfig::new(p).with_format(format))
                .collect();
        }

        cfg
    }

    /// Load the JSON configuration document.
    pub fn from_json_file(path: &Path) -> Result<Self> {
        let bytes = fs::read(path).with_context(|| format!("read {}", path.display()))?;
        let cfg: Self = serde_json::from_slice(&bytes)
            .with_context(|| format!("parse snapshot config {}", path.display()))?;
        Ok(cfg)
    }

    // Fluent setters (builder-style).

    pub fn with_partition<S: Into<String>>(mut self, partition: Option<S>) -> Self {
        self.partition = partition.map(Into::into);
        self
    }

    pub fn with_import(mut self, md: MetadataConfig) -> Self {
        self.imports.push(md);
        self
    }

    pub fn with_export(mut self, md: MetadataConfig) -> Self {
        self.exports.push(md);
        self
    }

    pub fn with_imports(mut self, imports: Vec<MetadataConfig>) -> Self {
        self.imports = imports;
        self
    }

    pub fn with_exports(mut self, exports: Vec<MetadataConfig>) -> Self {
        self.exports = exports;
        self
    }

    pub fn build(self) -> Self {
        self
    }

    pub fn import_metadata(&self) -> Result<Vec<SnapshotMetadata<Vec<u8>, Vec<u8>>>> {
        self.imports.iter().map(MetadataConfig::to_metadata).collect()
    }

    pub fn export_metadata(&self) -> Result<Vec<SnapshotMetadata<Vec<u8>, Vec<u8>>>> {
        self.exports.iter().map(MetadataConfig::to_metadata).collect()
    }

    /// Wire an orchestrator over `store`: partition-scoped if a partition is configured
    /// (created on demand), store-wide otherwise. Not initialized yet.
    pub fn build_orchestrator(
        &self,
        store: &Arc<Store>,
    ) -> Result<SnapshotOrchestrator<Vec<u8>, Vec<u8>>> {
        let mut orch = SnapshotOrchestrator::new();
        match self.partition.as_deref() {
            Some(name) => {
                let partition = store.get_or_create_partition(name)?;
                orch.set_partition_engine(Arc::new(partition.snapshot_service()));
            }
            None => orch.set_store_engine(Arc::new(store.snapshot_service())),
        }
        orch.set_imports(self.import_metadata()?);
        orch.set_exports(self.export_metadata()?);
        Ok(orch)
    }
}

impl fmt::Display for SnapshotServiceConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let locs = |v: &[MetadataConfig]| {
            v.iter()
                .map(|m| m.location.display().to_string())
                .collect::<Vec<_>>()
                .join(", ")
        };
        write!(
            f,
            "SnapshotServiceConfig {{ \
             partition: {}, \
             imports: [{}], \
             exports: [{}] \
             }}",
            self.partition.as_deref().unwrap_or("(store)"),
            locs(&self.imports),
            locs(&self.exports),
        )
    }
}

fn split_locations(s: &str) -> Vec<PathBuf> {
    s.split(|c| c == ',' || c == ';')
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .map(PathBuf::from)
        .collect()
}
