use anyhow::{Context, Result};
use serde::Serialize;
use std::path::PathBuf;
use std::sync::Arc;

use gridsnap::metrics::{self, MetricsSnapshot};
use gridsnap::{SnapshotServiceConfig, Store};

#[derive(Serialize)]
struct PartitionLine {
    name: String,
    entries: usize,
}

#[derive(Serialize)]
struct RunSummary {
    kind: String,
    partitions: Vec<PartitionLine>,
    metrics: MetricsSnapshot,
}

/// initialize (imports) -> shutdown (exports) над пустым store.
pub fn exec(config: PathBuf, json: bool) -> Result<()> {
    let cfg = SnapshotServiceConfig::from_json_file(&config)?;
    log::info!("run: {}", cfg);

    let store = Arc::new(Store::new());
    let mut orch = cfg
        .build_orchestrator(&store)
        .with_context(|| format!("configure snapshot service from {}", config.display()))?;

    metrics::reset();
    orch.initialize().context("snapshot import")?;
    let kind = orch
        .service_kind()
        .map(|k| k.to_string())
        .unwrap_or_default();
    orch.shutdown().context("snapshot export")?;

    let summary = RunSummary {
        kind,
        partitions: store
            .partitions()
            .iter()
            .map(|p| PartitionLine {
                name: p.name().to_string(),
                entries: p.len(),
            })
            .collect(),
        metrics: metrics::snapshot(),
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
        return Ok(());
    }

    println!("run: OK (scope={})", summary.kind);
    println!("Partitions: {}", summary.partitions.len());
    for p in &summary.partitions {
        println!("  - {:20} {} entries", p.name, p.entries);
    }
    let m = &summary.metrics;
    println!(
        "Imports: runs={} files={} | Exports: runs={} targets={}",
        m.import_runs, m.snapshot_files_loaded, m.export_runs, m.snapshot_targets_saved
    );
    Ok(())
}
