use clap::{Parser, Subcommand};
use std::path::PathBuf;

use gridsnap::SnapshotFormat;

/// CLI для snapshot-сервиса in-memory grid'а
#[derive(Parser, Debug)]
#[command(name = "gridsnap", version, about = "Snapshot import/export for the in-memory grid")]
pub struct Cli {
    #[command(subcommand)]
    pub cmd: Cmd,
}

impl Cli {
    pub fn parse_args() -> Self {
        <Self as Parser>::parse()
    }
}

#[derive(Subcommand, Debug)]
pub enum Cmd {
    /// Initialize the service from a config (runs imports), then shut it down (runs exports)
    ///
    /// Config (JSON):
    /// {
    ///   "partition": "orders",
    ///   "imports": [{"location": "./in", "format": "native"}],
    ///   "exports": [{"location": "./out", "format": "json", "key_prefix": "user:"}]
    /// }
    Run {
        #[arg(long)]
        config: PathBuf,
        /// Print the summary as one JSON object
        #[arg(long)]
        json: bool,
    },
    /// Summarize a snapshot file (partition, entries, sizes)
    Inspect {
        #[arg(long)]
        path: PathBuf,
        #[arg(long, default_value_t = SnapshotFormat::Native)]
        format: SnapshotFormat,
        #[arg(long)]
        json: bool,
    },
    /// Initialize from a config, then deliver one ad hoc export trigger.
    /// Export failures on this path are logged and swallowed.
    #[command(name = "export-trigger")]
    Trigger {
        #[arg(long)]
        config: PathBuf,
        /// Target partition; omitted => store-wide trigger
        #[arg(long)]
        partition: Option<String>,
        /// Override export location (otherwise the configured exports are used)
        #[arg(long)]
        to: Option<PathBuf>,
        /// Format for --to
        #[arg(long)]
        format: Option<SnapshotFormat>,
        #[arg(long)]
        json: bool,
    },
}
