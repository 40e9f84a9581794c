use std::fmt;
use std::path::{Path, PathBuf};

use crate::error::{SnapshotError, SnapshotResult};

use super::format::SnapshotFormat;
use super::options::SnapshotFilter;

/// One unit of snapshot work: where (location), what (optional filter) and how (format).
///
/// Immutable after construction. The location must exist when the metadata is built;
/// a missing path fails fast with `SnapshotError::LocationNotFound`.
pub struct SnapshotMetadata<K, V> {
    location: PathBuf,
    filter: Option<SnapshotFilter<K, V>>,
    format: Option<SnapshotFormat>,
}

impl<K, V> SnapshotMetadata<K, V> {
    pub fn new<P: Into<PathBuf>>(
        location: P,
        filter: Option<SnapshotFilter<K, V>>,
        format: Option<SnapshotFormat>,
    ) -> SnapshotResult<Self> {
        let location = location.into();
        if !location.exists() {
            return Err(SnapshotError::LocationNotFound(location));
        }
        Ok(Self {
            location,
            filter,
            format,
        })
    }

    pub fn location(&self) -> &Path {
        &self.location
    }

    pub fn filter(&self) -> Option<&SnapshotFilter<K, V>> {
        self.filter.as_ref()
    }

    pub fn is_filter_present(&self) -> bool {
        self.filter.is_some()
    }

    /// Format, falling back to the native one when none was configured.
    pub fn format(&self) -> SnapshotFormat {
        self.format.unwrap_or_default()
    }

    pub fn is_directory(&self) -> bool {
        null_safe_is_directory(Some(&self.location))
    }

    pub fn is_file(&self) -> bool {
        null_safe_is_file(Some(&self.location))
    }
}

impl<K, V> Clone for SnapshotMetadata<K, V> {
    fn clone(&self) -> Self {
        Self {
            location: self.location.clone(),
            filter: self.filter.clone(),
            format: self.format,
        }
    }
}

impl<K, V> fmt::Debug for SnapshotMetadata<K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SnapshotMetadata")
            .field("location", &self.location)
            .field("filter", &self.filter)
            .field("format", &self.format())
            .finish()
    }
}

impl<K, V> fmt::Display for SnapshotMetadata<K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let location = self
            .location
            .canonicalize()
            .unwrap_or_else(|_| self.location.clone());
        write!(
            f,
            "{{ location = {}, filter = {}, format = {} }}",
            location.display(),
            if self.is_filter_present() { "present" } else { "absent" },
            self.format()
        )
    }
}

/// False for `None` and for paths that do not exist.
pub fn null_safe_is_directory(path: Option<&Path>) -> bool {
    path.map_or(false, |p| p.is_dir())
}

/// False for `None` and for paths that do not exist.
pub fn null_safe_is_file(path: Option<&Path>) -> bool {
    path.map_or(false, |p| p.is_file())
}
