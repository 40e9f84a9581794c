use std::fmt;
use std::sync::Arc;

/// Predicate over key/value pairs restricting which entries take part in an export/import.
/// Cheap to clone: the closure is shared.
pub struct SnapshotFilter<K, V> {
    inner: Arc<dyn Fn(&K, &V) -> bool + Send + Sync>,
}

impl<K, V> SnapshotFilter<K, V> {
    pub fn new<F>(f: F) -> Self
    where
        F: Fn(&K, &V) -> bool + Send + Sync + 'static,
    {
        Self { inner: Arc::new(f) }
    }

    pub fn accept(&self, key: &K, value: &V) -> bool {
        (self.inner)(key, value)
    }
}

impl<V: 'static> SnapshotFilter<Vec<u8>, V> {
    /// Accept only entries whose (byte) key starts with `prefix`.
    pub fn key_prefix<P: Into<Vec<u8>>>(prefix: P) -> Self {
        let prefix = prefix.into();
        Self::new(move |k: &Vec<u8>, _v: &V| k.starts_with(&prefix))
    }
}

impl<K, V> Clone for SnapshotFilter<K, V> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<K, V> fmt::Debug for SnapshotFilter<K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SnapshotFilter(..)")
    }
}

/// Options handed to the engine for a single load/save call.
/// Obtained fresh from the engine (`create_options`) and then decorated with a filter.
pub struct SnapshotOptions<K, V> {
    filter: Option<SnapshotFilter<K, V>>,
}

impl<K, V> SnapshotOptions<K, V> {
    pub fn new() -> Self {
        Self { filter: None }
    }

    /// Replace the filter (None clears it).
    pub fn set_filter(mut self, filter: Option<SnapshotFilter<K, V>>) -> Self {
        self.filter = filter;
        self
    }

    pub fn filter(&self) -> Option<&SnapshotFilter<K, V>> {
        self.filter.as_ref()
    }

    pub fn is_filter_present(&self) -> bool {
        self.filter.is_some()
    }

    /// True when no filter is set or the filter accepts the entry.
    pub fn accepts(&self, key: &K, value: &V) -> bool {
        self.filter.as_ref().map_or(true, |f| f.accept(key, value))
    }
}

impl<K, V> Default for SnapshotOptions<K, V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K, V> Clone for SnapshotOptions<K, V> {
    fn clone(&self) -> Self {
        Self {
            filter: self.filter.clone(),
        }
    }
}

impl<K, V> fmt::Debug for SnapshotOptions<K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SnapshotOptions")
            .field("filter", &self.filter)
            .finish()
    }
}

impl<K, V> fmt::Display for SnapshotOptions<K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "SnapshotOptions {{ filter = {} }}",
            if self.is_filter_present() { "present" } else { "absent" }
        )
    }
}
