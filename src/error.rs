//! Typed errors of the snapshot service boundary.
//!
//! Engines and codecs speak `anyhow`; adapters translate every engine failure
//! into `SnapshotError::Import` / `SnapshotError::Export`, keeping the original
//! error as `source()`.

use std::path::PathBuf;

use thiserror::Error;

use crate::snapshot::SnapshotFormat;

pub type SnapshotResult<T> = std::result::Result<T, SnapshotError>;

#[derive(Debug, Error)]
pub enum SnapshotError {
    /// Loading one or more snapshot files failed.
    #[error("{message}")]
    Import {
        message: String,
        locations: Vec<PathBuf>,
        format: SnapshotFormat,
        options: Option<String>,
        #[source]
        source: anyhow::Error,
    },

    /// Saving a snapshot (file or directory) failed.
    #[error("{message}")]
    Export {
        message: String,
        location: PathBuf,
        format: SnapshotFormat,
        options: Option<String>,
        #[source]
        source: anyhow::Error,
    },

    #[error("The File location ({}) must exist", .0.display())]
    LocationNotFound(PathBuf),

    #[error("{0}")]
    IllegalState(String),
}

impl SnapshotError {
    pub fn is_import(&self) -> bool {
        matches!(self, SnapshotError::Import { .. })
    }

    pub fn is_export(&self) -> bool {
        matches!(self, SnapshotError::Export { .. })
    }

    /// Format of the failed operation (only for Import/Export).
    pub fn format(&self) -> Option<SnapshotFormat> {
        match self {
            SnapshotError::Import { format, .. } | SnapshotError::Export { format, .. } => {
                Some(*format)
            }
            _ => None,
        }
    }
}

/// Render a list of paths the way the error messages expect: `[a, b, c]`.
pub(crate) fn display_paths(paths: &[PathBuf]) -> String {
    let parts: Vec<String> = paths.iter().map(|p| p.display().to_string()).collect();
    format!("[{}]", parts.join(", "))
}
