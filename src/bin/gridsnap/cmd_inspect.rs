use anyhow::{anyhow, Result};
use std::path::PathBuf;

use gridsnap::grid::codec::summarize_snapshot_file;
use gridsnap::SnapshotFormat;

pub fn exec(path: PathBuf, format: SnapshotFormat, json: bool) -> Result<()> {
    if !path.is_file() {
        return Err(anyhow!("{} is not a snapshot file", path.display()));
    }
    let s = summarize_snapshot_file(&path, format)?;
    if json {
        println!("{}", serde_json::to_string_pretty(&s)?);
        return Ok(());
    }

    // Human-readable
    println!("Snapshot {}", s.path);
    println!("  format      = {}", s.format);
    println!("  partition   = {}", s.partition);
    println!("  entries     = {}", s.entries);
    println!("  key_bytes   = {}", s.key_bytes);
    println!("  value_bytes = {}", s.value_bytes);
    println!("  file_bytes  = {}", s.file_bytes);
    Ok(())
}
