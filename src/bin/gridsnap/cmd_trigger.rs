use anyhow::{Context, Result};
use std::path::PathBuf;
use std::sync::Arc;

use gridsnap::metrics;
use gridsnap::snapshot::{EventDispatcher, SnapshotEventListener};
use gridsnap::{SnapshotFormat, SnapshotMetadata, SnapshotServiceConfig, SnapshotTriggerEvent, Store};

type Bytes = Vec<u8>;

pub fn exec(
    config: PathBuf,
    partition: Option<String>,
    to: Option<PathBuf>,
    format: Option<SnapshotFormat>,
    json: bool,
) -> Result<()> {
    let cfg = SnapshotServiceConfig::from_json_file(&config)?;
    let store = Arc::new(Store::new());
    let mut orch = cfg
        .build_orchestrator(&store)
        .with_context(|| format!("configure snapshot service from {}", config.display()))?;
    orch.initialize().context("snapshot import")?;

    // --to переопределяет exports из конфига (metadata события приоритетнее).
    let overrides: Vec<SnapshotMetadata<Bytes, Bytes>> = match to {
        Some(p) => vec![SnapshotMetadata::new(p, None, format)?],
        None => Vec::new(),
    };
    let event = match partition {
        Some(name) => SnapshotTriggerEvent::partition(name, overrides),
        None => SnapshotTriggerEvent::store(overrides),
    };

    metrics::reset();
    let mut dispatcher = EventDispatcher::new();
    let listener: Arc<dyn SnapshotEventListener<Bytes, Bytes>> = Arc::new(orch);
    dispatcher.register(listener);
    dispatcher.publish(&event);

    let m = metrics::snapshot();
    if json {
        println!("{}", serde_json::to_string_pretty(&m)?);
        return Ok(());
    }
    println!(
        "trigger: matched={} ignored={} exports={} failures_swallowed={} match_ratio={:.2}",
        m.trigger_matched,
        m.trigger_ignored,
        m.export_runs,
        m.trigger_failures_swallowed,
        m.trigger_match_ratio()
    );
    Ok(())
}
