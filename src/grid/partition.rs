use std::collections::BTreeMap;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::snapshot::normalize_partition_name;

/// Named, ordered byte key/value map, one partition of the in-memory grid.
#[derive(Debug)]
pub struct Partition {
    name: String,
    entries: RwLock<BTreeMap<Vec<u8>, Vec<u8>>>,
}

impl Partition {
    pub fn new<S: AsRef<str>>(name: S) -> Self {
        Self {
            name: normalize_partition_name(name.as_ref()).to_string(),
            entries: RwLock::new(BTreeMap::new()),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// "/name"
    pub fn full_path(&self) -> String {
        format!("/{}", self.name)
    }

    // Отравленный lock не страшен: внутри простая map без инвариантов между записями.
    fn read(&self) -> RwLockReadGuard<'_, BTreeMap<Vec<u8>, Vec<u8>>> {
        self.entries.read().unwrap_or_else(|e| e.into_inner())
    }

    fn write(&self) -> RwLockWriteGuard<'_, BTreeMap<Vec<u8>, Vec<u8>>> {
        self.entries.write().unwrap_or_else(|e| e.into_inner())
    }

    pub fn put(&self, key: &[u8], value: &[u8]) -> Option<Vec<u8>> {
        self.write().insert(key.to_vec(), value.to_vec())
    }

    pub fn get(&self, key: &[u8]) -> Option<Vec<u8>> {
        self.read().get(key).cloned()
    }

    pub fn contains_key(&self, key: &[u8]) -> bool {
        self.read().contains_key(key)
    }

    pub fn remove(&self, key: &[u8]) -> Option<Vec<u8>> {
        self.write().remove(key)
    }

    pub fn len(&self) -> usize {
        self.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.read().is_empty()
    }

    pub fn clear(&self) {
        self.write().clear();
    }

    /// Point-in-time copy of all entries, in key order.
    pub fn entries(&self) -> Vec<(Vec<u8>, Vec<u8>)> {
        self.read()
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect()
    }

    /// Entries accepted by `keep`, in key order.
    pub fn entries_filtered<F>(&self, mut keep: F) -> Vec<(Vec<u8>, Vec<u8>)>
    where
        F: FnMut(&Vec<u8>, &Vec<u8>) -> bool,
    {
        self.read()
            .iter()
            .filter(|(k, v)| keep(*k, *v))
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect()
    }

    /// Insert a batch under one write lock. Returns the number of entries written.
    pub fn put_all<I>(&self, entries: I) -> usize
    where
        I: IntoIterator<Item = (Vec<u8>, Vec<u8>)>,
    {
        let mut map = self.write();
        let mut n = 0usize;
        for (k, v) in entries {
            map.insert(k, v);
            n += 1;
        }
        n
    }
}
