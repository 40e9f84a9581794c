//! Lightweight global metrics for the snapshot service.
//!
//! Потокобезопасные атомарные счётчики для подсистем:
//! - Import / Export (adapters)
//! - Trigger events (orchestrator)
//! - Codec (bundled grid engines)

use std::sync::atomic::{AtomicU64, Ordering};

use serde::Serialize;

// ----- Import / Export -----
static IMPORT_RUNS: AtomicU64 = AtomicU64::new(0);
static EXPORT_RUNS: AtomicU64 = AtomicU64::new(0);
static SNAPSHOT_FILES_LOADED: AtomicU64 = AtomicU64::new(0);
static SNAPSHOT_TARGETS_SAVED: AtomicU64 = AtomicU64::new(0);
static IMPORT_FAILURES: AtomicU64 = AtomicU64::new(0);
static EXPORT_FAILURES: AtomicU64 = AtomicU64::new(0);

// ----- Trigger events -----
static TRIGGER_EVENTS: AtomicU64 = AtomicU64::new(0);
static TRIGGER_MATCHED: AtomicU64 = AtomicU64::new(0);
static TRIGGER_IGNORED: AtomicU64 = AtomicU64::new(0);
static TRIGGER_FAILURES_SWALLOWED: AtomicU64 = AtomicU64::new(0);

// ----- Codec -----
static ENTRIES_WRITTEN: AtomicU64 = AtomicU64::new(0);
static ENTRIES_READ: AtomicU64 = AtomicU64::new(0);
static BYTES_WRITTEN: AtomicU64 = AtomicU64::new(0);

#[derive(Debug, Clone, Default, Serialize)]
pub struct MetricsSnapshot {
    // Import / Export
    pub import_runs: u64,
    pub export_runs: u64,
    pub snapshot_files_loaded: u64,
    pub snapshot_targets_saved: u64,
    pub import_failures: u64,
    pub export_failures: u64,

    // Trigger events
    pub trigger_events: u64,
    pub trigger_matched: u64,
    pub trigger_ignored: u64,
    pub trigger_failures_swallowed: u64,

    // Codec
    pub entries_written: u64,
    pub entries_read: u64,
    pub bytes_written: u64,
}

impl MetricsSnapshot {
    pub fn trigger_match_ratio(&self) -> f64 {
        if self.trigger_events == 0 {
            0.0
        } else {
            self.trigger_matched as f64 / self.trigger_events as f64
        }
    }
}

// ----- Recorders (Import / Export) -----
pub fn record_import_run() {
    IMPORT_RUNS.fetch_add(1, Ordering::Relaxed);
}

pub fn record_export_run() {
    EXPORT_RUNS.fetch_add(1, Ordering::Relaxed);
}

pub fn record_snapshot_files_loaded(files: usize) {
    SNAPSHOT_FILES_LOADED.fetch_add(files as u64, Ordering::Relaxed);
}

pub fn record_snapshot_target_saved() {
    SNAPSHOT_TARGETS_SAVED.fetch_add(1, Ordering::Relaxed);
}

pub fn record_import_failure() {
    IMPORT_FAILURES.fetch_add(1, Ordering::Relaxed);
}

pub fn record_export_failure() {
    EXPORT_FAILURES.fetch_add(1, Ordering::Relaxed);
}

// ----- Recorders (Trigger events) -----
pub fn record_trigger_event() {
    TRIGGER_EVENTS.fetch_add(1, Ordering::Relaxed);
}

pub fn record_trigger_matched() {
    TRIGGER_MATCHED.fetch_add(1, Ordering::Relaxed);
}

pub fn record_trigger_ignored() {
    TRIGGER_IGNORED.fetch_add(1, Ordering::Relaxed);
}

pub fn record_trigger_failure_swallowed() {
    TRIGGER_FAILURES_SWALLOWED.fetch_add(1, Ordering::Relaxed);
}

// ----- Recorders (Codec) -----
pub fn record_entries_written(entries: usize, bytes: u64) {
    ENTRIES_WRITTEN.fetch_add(entries as u64, Ordering::Relaxed);
    BYTES_WRITTEN.fetch_add(bytes, Ordering::Relaxed);
}

pub fn record_entries_read(entries: usize) {
    ENTRIES_READ.fetch_add(entries as u64, Ordering::Relaxed);
}

// ----- Snapshot / Reset -----
pub fn snapshot() -> MetricsSnapshot {
    MetricsSnapshot {
        import_runs: IMPORT_RUNS.load(Ordering::Relaxed),
        export_runs: EXPORT_RUNS.load(Ordering::Relaxed),
        snapshot_files_loaded: SNAPSHOT_FILES_LOADED.load(Ordering::Relaxed),
        snapshot_targets_saved: SNAPSHOT_TARGETS_SAVED.load(Ordering::Relaxed),
        import_failures: IMPORT_FAILURES.load(Ordering::Relaxed),
        export_failures: EXPORT_FAILURES.load(Ordering::Relaxed),

        trigger_events: TRIGGER_EVENTS.load(Ordering::Relaxed),
        trigger_matched: TRIGGER_MATCHED.load(Ordering::Relaxed),
        trigger_ignored: TRIGGER_IGNORED.load(Ordering::Relaxed),
        trigger_failures_swallowed: TRIGGER_FAILURES_SWALLOWED.load(Ordering::Relaxed),

        entries_written: ENTRIES_WRITTEN.load(Ordering::Relaxed),
        entries_read: ENTRIES_READ.load(Ordering::Relaxed),
        bytes_written: BYTES_WRITTEN.load(Ordering::Relaxed),
    }
}

pub fn reset() {
    IMPORT_RUNS.store(0, Ordering::Relaxed);
    EXPORT_RUNS.store(0, Ordering::Relaxed);
    SNAPSHOT_FILES_LOADED.store(0, Ordering::Relaxed);
    SNAPSHOT_TARGETS_SAVED.store(0, Ordering::Relaxed);
    IMPORT_FAILURES.store(0, Ordering::Relaxed);
    EXPORT_FAILURES.store(0, Ordering::Relaxed);

    TRIGGER_EVENTS.store(0, Ordering::Relaxed);
    TRIGGER_MATCHED.store(0, Ordering::Relaxed);
    TRIGGER_IGNORED.store(0, Ordering::Relaxed);
    TRIGGER_FAILURES_SWALLOWED.store(0, Ordering::Relaxed);

    ENTRIES_WRITTEN.store(0, Ordering::Relaxed);
    ENTRIES_READ.store(0, Ordering::Relaxed);
    BYTES_WRITTEN.store(0, Ordering::Relaxed);
}
