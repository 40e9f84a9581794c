use std::fmt;
use std::str::FromStr;

use anyhow::{anyhow, Result};
use serde::{Deserialize, Serialize};

use crate::consts::{JSON_EXT, NATIVE_EXT};

/// On-disk snapshot format. `Native` is the baseline used when nothing is specified.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SnapshotFormat {
    #[default]
    Native,
    Json,
}

impl SnapshotFormat {
    /// File extension used by the bundled engines for this format.
    pub fn extension(&self) -> &'static str {
        match self {
            SnapshotFormat::Native => NATIVE_EXT,
            SnapshotFormat::Json => JSON_EXT,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SnapshotFormat::Native => "native",
            SnapshotFormat::Json => "json",
        }
    }
}

impl fmt::Display for SnapshotFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SnapshotFormat {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "native" | "gsnap" => Ok(SnapshotFormat::Native),
            "json" => Ok(SnapshotFormat::Json),
            other => Err(anyhow!("unknown snapshot format '{}' (expected native|json)", other)),
        }
    }
}
