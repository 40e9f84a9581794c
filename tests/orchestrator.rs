// tests/orchestrator.rs
//
// Жизненный цикл SnapshotOrchestrator:
// - initialize: выбор варианта (partition > store), импорт, фатальные ошибки;
// - triggers: match по scope, event metadata vs static exports, ошибки проглатываются;
// - shutdown: static exports, ошибки наружу.

mod common;

use std::fs;
use std::sync::Arc;

use anyhow::Result;

use common::{touch, unique_root, Bytes, Call, RecordingPartitionEngine, RecordingStoreEngine};
use gridsnap::snapshot::{EventDispatcher, ServiceKind, SnapshotEventListener};
use gridsnap::{SnapshotError, SnapshotMetadata, SnapshotOrchestrator, SnapshotTriggerEvent};

type Orchestrator = SnapshotOrchestrator<Bytes, Bytes>;
type Event = SnapshotTriggerEvent<Bytes, Bytes>;

fn saves(calls: &[Call]) -> Vec<&Call> {
    calls.iter().filter(|c| matches!(c, Call::Save { .. })).collect()
}

#[test]
fn no_engine_is_illegal_state() {
    let mut orch = Orchestrator::new();
    let err = orch.initialize().unwrap_err();
    assert!(matches!(err, SnapshotError::IllegalState(_)), "got: {err:?}");
    assert!(!orch.is_initialized());
    assert!(matches!(orch.service(), Err(SnapshotError::IllegalState(_))));
    assert!(matches!(orch.shutdown(), Err(SnapshotError::IllegalState(_))));
}

#[test]
fn partition_engine_takes_priority() -> Result<()> {
    let store = Arc::new(RecordingStoreEngine::default());
    let part = Arc::new(RecordingPartitionEngine::new("orders"));

    let mut orch = Orchestrator::new()
        .with_store_engine(store.clone())
        .with_partition_engine(part.clone());
    orch.initialize()?;

    assert_eq!(orch.service_kind(), Some(ServiceKind::Partition));
    assert_eq!(orch.partition_name(), Some("orders"));
    assert!(orch.service()?.as_partition().is_some());
    assert!(orch.service()?.as_store().is_none());

    let shown = format!("{orch:?}");
    assert!(shown.contains("kind: Some(Partition)"), "got: {shown}");
    assert!(shown.contains("partition: Some(\"orders\")"), "got: {shown}");

    let mut only_store = Orchestrator::new().with_store_engine(store);
    only_store.initialize()?;
    assert_eq!(only_store.service_kind(), Some(ServiceKind::Store));
    assert_eq!(only_store.partition_name(), None);
    Ok(())
}

#[test]
fn service_is_a_single_instance() -> Result<()> {
    let mut orch = Orchestrator::new().with_store_engine(Arc::new(RecordingStoreEngine::default()));
    orch.initialize()?;
    assert!(orch.is_singleton());

    assert!(std::ptr::eq(orch.service()?, orch.service()?));

    // повторный initialize запрещён
    assert!(matches!(orch.initialize(), Err(SnapshotError::IllegalState(_))));
    Ok(())
}

#[test]
fn initialize_imports_configured_locations() -> Result<()> {
    let root = unique_root("orch-import");
    let f = touch(&root.join("a.gsnap"));

    let engine = Arc::new(RecordingStoreEngine::default());
    let mut orch = Orchestrator::new()
        .with_store_engine(engine.clone())
        .with_imports(vec![SnapshotMetadata::new(&root, None, None)?]);
    orch.initialize()?;

    assert_eq!(orch.imports().len(), 1);
    assert!(matches!(
        engine.calls().as_slice(),
        [Call::Load { files, .. }] if files == &vec![f.clone()]
    ));
    Ok(())
}

#[test]
fn import_failure_is_fatal() -> Result<()> {
    let root = unique_root("orch-import-fail");
    touch(&root.join("a.gsnap"));

    let engine = Arc::new(RecordingStoreEngine::failing_load());
    let mut orch = Orchestrator::new()
        .with_store_engine(engine)
        .with_imports(vec![SnapshotMetadata::new(&root, None, None)?]);

    let err = orch.initialize().unwrap_err();
    assert!(err.is_import(), "got: {err}");
    assert!(!orch.is_initialized());
    assert_eq!(orch.service_kind(), None);
    Ok(())
}

#[test]
fn trigger_matching_by_scope() -> Result<()> {
    let root = unique_root("orch-match");
    let md = || SnapshotMetadata::<Bytes, Bytes>::new(&root, None, None);

    // partition-scoped
    let part = Arc::new(RecordingPartitionEngine::new("orders"));
    let mut orch = Orchestrator::new().with_partition_engine(part.clone());
    orch.initialize()?;

    assert!(orch.is_match(&Event::partition("orders", Vec::new())));
    assert!(orch.is_match(&Event::partition("/orders", Vec::new())));
    assert!(!orch.is_match(&Event::partition("users", Vec::new())));
    assert!(!orch.is_match(&Event::store(Vec::new())));

    orch.on_snapshot_event(&Event::partition("users", vec![md()?]));
    orch.on_snapshot_event(&Event::store(vec![md()?]));
    assert!(part.calls().is_empty(), "non-matching events must not export");

    orch.on_snapshot_event(&Event::partition("/orders", vec![md()?]));
    assert_eq!(saves(&part.calls()).len(), 1);

    // store-wide
    let store = Arc::new(RecordingStoreEngine::default());
    let mut orch = Orchestrator::new().with_store_engine(store.clone());
    orch.initialize()?;
    assert!(orch.is_match(&Event::store(Vec::new())));
    assert!(!orch.is_match(&Event::partition("orders", Vec::new())));

    orch.on_snapshot_event(&Event::partition("orders", vec![md()?]));
    assert!(store.calls().is_empty());
    orch.on_snapshot_event(&Event::store(vec![md()?]));
    assert_eq!(saves(&store.calls()).len(), 1);
    Ok(())
}

#[test]
fn event_metadata_overrides_static_exports() -> Result<()> {
    let root = unique_root("orch-override");
    let static_dir = root.join("static");
    let adhoc_dir = root.join("adhoc");
    fs::create_dir_all(&static_dir)?;
    fs::create_dir_all(&adhoc_dir)?;

    let engine = Arc::new(RecordingStoreEngine::default());
    let mut orch = Orchestrator::new()
        .with_store_engine(engine.clone())
        .with_exports(vec![SnapshotMetadata::new(&static_dir, None, None)?]);
    orch.initialize()?;

    let adhoc = Event::store(vec![SnapshotMetadata::new(&adhoc_dir, None, None)?]);
    assert_eq!(orch.resolve_snapshot_metadata(&adhoc)[0].location(), adhoc_dir.as_path());
    orch.on_snapshot_event(&adhoc);

    let empty = Event::store(Vec::new());
    assert_eq!(orch.resolve_snapshot_metadata(&empty)[0].location(), static_dir.as_path());
    orch.on_snapshot_event(&empty);

    let targets: Vec<_> = engine
        .calls()
        .into_iter()
        .filter_map(|c| match c {
            Call::Save { target, .. } => Some(target),
            _ => None,
        })
        .collect();
    assert_eq!(targets, vec![adhoc_dir, static_dir]);
    Ok(())
}

#[test]
fn trigger_swallows_but_shutdown_propagates() -> Result<()> {
    let root = unique_root("orch-fail");
    let engine = Arc::new(RecordingStoreEngine::failing_save());
    let mut orch = Orchestrator::new()
        .with_store_engine(engine.clone())
        .with_exports(vec![SnapshotMetadata::new(&root, None, None)?]);
    orch.initialize()?;

    // не паникует и не возвращает ошибку
    orch.on_snapshot_event(&Event::store(Vec::new()));
    assert_eq!(saves(&engine.calls()).len(), 1);
    assert!(orch.is_initialized());

    let err = orch.shutdown().unwrap_err();
    assert!(err.is_export(), "got: {err}");
    assert_eq!(saves(&engine.calls()).len(), 2);
    Ok(())
}

#[test]
fn trigger_before_initialize_is_swallowed() -> Result<()> {
    let root = unique_root("orch-early");
    let engine = Arc::new(RecordingStoreEngine::default());
    let orch = Orchestrator::new()
        .with_store_engine(engine.clone())
        .with_exports(vec![SnapshotMetadata::new(&root, None, None)?]);

    orch.on_snapshot_event(&Event::store(Vec::new()));
    assert!(engine.calls().is_empty());
    Ok(())
}

#[test]
fn shutdown_with_no_exports_is_no_work() -> Result<()> {
    let engine = Arc::new(RecordingStoreEngine::failing_save());
    let mut orch = Orchestrator::new().with_store_engine(engine.clone());
    orch.initialize()?;
    orch.shutdown()?;
    assert!(engine.calls().is_empty());
    Ok(())
}

#[test]
fn dispatcher_fans_out_to_every_listener() -> Result<()> {
    let root = unique_root("orch-dispatch");
    let store_engine = Arc::new(RecordingStoreEngine::default());
    let part_engine = Arc::new(RecordingPartitionEngine::new("orders"));

    let mut store_orch = Orchestrator::new().with_store_engine(store_engine.clone());
    store_orch.initialize()?;
    let mut part_orch = Orchestrator::new().with_partition_engine(part_engine.clone());
    part_orch.initialize()?;

    let mut dispatcher = EventDispatcher::new();
    assert!(dispatcher.is_empty());
    dispatcher.register(Arc::new(store_orch));
    dispatcher.register(Arc::new(part_orch));
    assert_eq!(dispatcher.len(), 2);

    dispatcher.publish(&Event::partition("orders", vec![SnapshotMetadata::new(&root, None, None)?]));
    assert!(store_engine.calls().is_empty());
    assert_eq!(saves(&part_engine.calls()).len(), 1);

    dispatcher.publish(&Event::store(vec![SnapshotMetadata::new(&root, None, None)?]));
    assert_eq!(saves(&store_engine.calls()).len(), 1);
    assert_eq!(saves(&part_engine.calls()).len(), 1);
    Ok(())
}
