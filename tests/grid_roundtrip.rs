// tests/grid_roundtrip.rs
//
// End-to-end через встроенные движки grid:
// 1) store-wide export -> новый store -> import: все партиции и значения совпадают (native и json).
// 2) key_prefix фильтр на export и на import.
// 3) partition scope: файл <dir>/<name>.<ext>, импорт в другую партицию.
// 4) SnapshotServiceConfig::build_orchestrator.
// 5) битый файл -> Import failure с причиной из кодека.

mod common;

use std::fs;
use std::path::Path;
use std::sync::Arc;

use anyhow::Result;

use common::unique_root;
use gridsnap::grid::codec::{read_snapshot_file, summarize_snapshot_file};
use gridsnap::{
    MetadataConfig, SnapshotFilter, SnapshotFormat, SnapshotMetadata, SnapshotOrchestrator,
    SnapshotServiceConfig, SnapshotTriggerEvent, Store,
};
use gridsnap::snapshot::{ServiceKind, SnapshotEventListener};

type Orchestrator = SnapshotOrchestrator<Vec<u8>, Vec<u8>>;

fn seeded_store() -> Result<Arc<Store>> {
    let store = Arc::new(Store::new());
    let orders = store.create_partition("orders")?;
    orders.put(b"order:1", b"apple");
    orders.put(b"order:2", &[0u8, 1, 2, 255]);
    orders.put(b"tmp:x", b"drop-me");
    let users = store.create_partition("/users")?;
    users.put(b"user:alice", b"{\"age\":30}");
    Ok(store)
}

fn export_store(store: &Arc<Store>, dir: &Path) -> Result<()> {
    let mut orch = Orchestrator::new()
        .with_store_engine(Arc::new(store.snapshot_service()))
        .with_exports(vec![SnapshotMetadata::new(dir, None, None)?]);
    orch.initialize()?;
    orch.shutdown()?;
    Ok(())
}

fn store_roundtrip(format: SnapshotFormat) -> Result<()> {
    let dir = unique_root(&format!("grid-rt-{format}"));
    let src = seeded_store()?;

    let mut out = Orchestrator::new()
        .with_store_engine(Arc::new(src.snapshot_service()))
        .with_exports(vec![SnapshotMetadata::new(&dir, None, Some(format))?]);
    out.initialize()?;
    out.shutdown()?;

    assert!(dir.join(format!("orders.{}", format.extension())).is_file());
    assert!(dir.join(format!("users.{}", format.extension())).is_file());

    let dst = Arc::new(Store::new());
    let mut inp = Orchestrator::new()
        .with_store_engine(Arc::new(dst.snapshot_service()))
        .with_imports(vec![SnapshotMetadata::new(&dir, None, Some(format))?]);
    inp.initialize()?;

    assert_eq!(dst.partition_names(), vec!["orders".to_string(), "users".to_string()]);
    assert_eq!(dst.total_entries(), src.total_entries());
    for p in src.partitions() {
        let q = dst.partition(p.name()).expect("partition restored");
        assert_eq!(q.entries(), p.entries(), "partition {}", p.name());
    }
    Ok(())
}

#[test]
fn store_roundtrip_native() -> Result<()> {
    store_roundtrip(SnapshotFormat::Native)
}

#[test]
fn store_roundtrip_json() -> Result<()> {
    store_roundtrip(SnapshotFormat::Json)
}

#[test]
fn key_prefix_filter_limits_export_and_import() -> Result<()> {
    let dir = unique_root("grid-filter");
    let src = seeded_store()?;

    // export: только order:*
    let mut out = Orchestrator::new()
        .with_store_engine(Arc::new(src.snapshot_service()))
        .with_exports(vec![SnapshotMetadata::new(
            &dir,
            Some(SnapshotFilter::key_prefix("order:")),
            None,
        )?]);
    out.initialize()?;
    out.shutdown()?;

    let orders = read_snapshot_file(&dir.join("orders.gsnap"), SnapshotFormat::Native)?;
    assert_eq!(orders.partition, "orders");
    assert_eq!(orders.entries.len(), 2);
    let users = read_snapshot_file(&dir.join("users.gsnap"), SnapshotFormat::Native)?;
    assert!(users.entries.is_empty());

    // import: только order:2
    let dst = Arc::new(Store::new());
    let mut inp = Orchestrator::new()
        .with_store_engine(Arc::new(dst.snapshot_service()))
        .with_imports(vec![SnapshotMetadata::new(
            &dir,
            Some(SnapshotFilter::new(|k: &Vec<u8>, _v: &Vec<u8>| k.as_slice() == b"order:2")),
            None,
        )?]);
    inp.initialize()?;

    assert_eq!(dst.total_entries(), 1);
    let restored = dst.partition("orders").expect("orders");
    assert_eq!(restored.get(b"order:2"), Some(vec![0u8, 1, 2, 255]));
    Ok(())
}

#[test]
fn partition_scope_roundtrip_and_trigger() -> Result<()> {
    let dir = unique_root("grid-part");
    let adhoc = unique_root("grid-part-adhoc");
    let src = seeded_store()?;
    let orders = src.partition("orders").expect("orders");

    let mut out = Orchestrator::new()
        .with_partition_engine(Arc::new(orders.snapshot_service()))
        .with_exports(vec![SnapshotMetadata::new(&dir, None, Some(SnapshotFormat::Json))?]);
    out.initialize()?;
    assert_eq!(out.service_kind(), Some(ServiceKind::Partition));

    // ad hoc export по событию для /orders
    out.on_snapshot_event(&SnapshotTriggerEvent::partition(
        "/orders",
        vec![SnapshotMetadata::new(&adhoc, None, None)?],
    ));
    let summary = summarize_snapshot_file(&adhoc.join("orders.gsnap"), SnapshotFormat::Native)?;
    assert_eq!(summary.partition, "orders");
    assert_eq!(summary.entries, 3);

    out.shutdown()?;
    let file = dir.join("orders.json");
    assert!(file.is_file());
    assert!(!dir.join("users.json").exists());

    // импорт снапшота "orders" в другую партицию
    let dst = Arc::new(Store::new());
    let archive = dst.create_partition("archive")?;
    let mut inp = Orchestrator::new()
        .with_partition_engine(Arc::new(archive.snapshot_service()))
        .with_imports(vec![SnapshotMetadata::new(&file, None, Some(SnapshotFormat::Json))?]);
    inp.initialize()?;

    assert_eq!(archive.entries(), orders.entries());
    assert!(dst.partition("orders").is_none());
    Ok(())
}

#[test]
fn nested_and_dashed_partition_names_keep_separate_files() -> Result<()> {
    let dir = unique_root("grid-names");
    let src = Arc::new(Store::new());
    src.create_partition("a/b")?.put(b"k1", b"v1");
    src.create_partition("a-b")?.put(b"k2", b"v2");
    src.create_partition("a%2Fb")?.put(b"k3", b"v3");

    export_store(&src, &dir)?;
    assert_eq!(fs::read_dir(&dir)?.count(), 3);

    let dst = Arc::new(Store::new());
    let mut inp = Orchestrator::new()
        .with_store_engine(Arc::new(dst.snapshot_service()))
        .with_imports(vec![SnapshotMetadata::new(&dir, None, None)?]);
    inp.initialize()?;

    assert_eq!(dst.partition_names(), src.partition_names());
    assert_eq!(dst.total_entries(), 3);
    let nested = dst.partition("a/b").expect("a/b");
    assert_eq!(nested.get(b"k1"), Some(b"v1".to_vec()));
    let dashed = dst.partition("a-b").expect("a-b");
    assert_eq!(dashed.get(b"k2"), Some(b"v2".to_vec()));
    Ok(())
}

#[test]
fn config_builds_partition_orchestrator() -> Result<()> {
    let dir = unique_root("grid-config");
    let src = seeded_store()?;

    let cfg = SnapshotServiceConfig::default()
        .with_partition(Some("users"))
        .with_export(
            MetadataConfig::new(&dir)
                .with_format(Some(SnapshotFormat::Json))
                .with_key_prefix(Some("user:")),
        )
        .build();
    let mut orch = cfg.build_orchestrator(&src)?;
    assert_eq!(orch.partition_name(), Some("users"));
    orch.initialize()?;
    orch.shutdown()?;

    let file = read_snapshot_file(&dir.join("users.json"), SnapshotFormat::Json)?;
    assert_eq!(file.entries, vec![(b"user:alice".to_vec(), b"{\"age\":30}".to_vec())]);

    // партиция создаётся по требованию
    let fresh = SnapshotServiceConfig::default().with_partition(Some("/fresh"));
    let orch = fresh.build_orchestrator(&src)?;
    assert_eq!(orch.partition_name(), Some("fresh"));
    assert!(src.partition("fresh").is_some());
    Ok(())
}

#[test]
fn config_with_missing_location_fails() {
    let root = unique_root("grid-config-missing");
    let store = Arc::new(Store::new());
    let cfg = SnapshotServiceConfig::default().with_import(MetadataConfig::new(root.join("nope")));
    let err = cfg.build_orchestrator(&store).unwrap_err();
    assert!(format!("{err:#}").contains("must exist"), "got: {err:#}");
}

#[test]
fn corrupt_snapshot_is_import_failure_and_store_untouched() -> Result<()> {
    let dir = unique_root("grid-corrupt");
    let src = seeded_store()?;
    export_store(&src, &dir)?;
    fs::write(dir.join("zzz.gsnap"), b"NOTASNAPSHOT")?;

    let dst = Arc::new(Store::new());
    let mut inp = Orchestrator::new()
        .with_store_engine(Arc::new(dst.snapshot_service()))
        .with_imports(vec![SnapshotMetadata::new(&dir, None, None)?]);
    let err = inp.initialize().unwrap_err();

    assert!(err.is_import(), "got: {err}");
    let chain = format!("{:#}", anyhow::Error::new(err));
    assert!(chain.contains("bad native snapshot magic"), "got: {chain}");
    // батч декодируется целиком до применения
    assert_eq!(dst.total_entries(), 0);
    assert!(!inp.is_initialized());
    Ok(())
}
