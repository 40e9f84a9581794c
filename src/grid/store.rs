use std::collections::BTreeMap;
use std::sync::{Arc, RwLock};

use anyhow::{anyhow, Result};
use log::debug;

use crate::snapshot::normalize_partition_name;

use super::partition::Partition;

/// The whole in-memory grid: a set of named partitions.
#[derive(Debug, Default)]
pub struct Store {
    partitions: RwLock<BTreeMap<String, Arc<Partition>>>,
}

impl Store {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a new partition. Fails if a partition with that name already exists.
    pub fn create_partition<S: AsRef<str>>(&self, name: S) -> Result<Arc<Partition>> {
        let name = normalize_partition_name(name.as_ref());
        if name.is_empty() {
            return Err(anyhow!("partition name must not be empty"));
        }
        let mut parts = self.partitions.write().unwrap_or_else(|e| e.into_inner());
        if parts.contains_key(name) {
            return Err(anyhow!("partition '{}' already exists", name));
        }
        let p = Arc::new(Partition::new(name));
        parts.insert(name.to_string(), Arc::clone(&p));
        debug!("store: partition '{}' created", name);
        Ok(p)
    }

    pub fn partition<S: AsRef<str>>(&self, name: S) -> Option<Arc<Partition>> {
        let name = normalize_partition_name(name.as_ref());
        self.partitions
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .get(name)
            .cloned()
    }

    pub fn get_or_create_partition<S: AsRef<str>>(&self, name: S) -> Result<Arc<Partition>> {
        let name = normalize_partition_name(name.as_ref());
        if name.is_empty() {
            return Err(anyhow!("partition name must not be empty"));
        }
        let mut parts = self.partitions.write().unwrap_or_else(|e| e.into_inner());
        let p = parts
            .entry(name.to_string())
            .or_insert_with(|| Arc::new(Partition::new(name)));
        Ok(Arc::clone(p))
    }

    /// All partitions in name order.
    pub fn partitions(&self) -> Vec<Arc<Partition>> {
        self.partitions
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .values()
            .cloned()
            .collect()
    }

    pub fn partition_names(&self) -> Vec<String> {
        self.partitions
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .keys()
            .cloned()
            .collect()
    }

    /// Total number of entries over all partitions.
    pub fn total_entries(&self) -> usize {
        self.partitions().iter().map(|p| p.len()).sum()
    }
}
