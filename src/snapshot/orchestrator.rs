use std::fmt;
use std::sync::Arc;

use log::{debug, info, warn};

use crate::error::{SnapshotError, SnapshotResult};
use crate::metrics::{
    record_trigger_event, record_trigger_failure_swallowed, record_trigger_ignored,
    record_trigger_matched,
};

use super::adapter::{ServiceKind, SnapshotService, SnapshotServiceAdapter};
use super::engine::{PartitionSnapshotEngine, StoreSnapshotEngine};
use super::event::{SnapshotEventListener, SnapshotTriggerEvent};
use super::metadata::SnapshotMetadata;
use super::partition_adapter::PartitionSnapshotAdapter;
use super::store_adapter::StoreSnapshotAdapter;

/// Owns the single snapshot adapter of a store or partition and drives it:
/// - `initialize()`: picks the adapter variant and imports (failure is fatal);
/// - `on_snapshot_event()`: ad hoc export on a matching trigger (failures are swallowed);
/// - `shutdown()`: exports the static export list (failures propagate).
///
/// Not meant to be driven concurrently: lifecycle calls come from one controller.
pub struct SnapshotOrchestrator<K, V> {
    store_engine: Option<Arc<dyn StoreSnapshotEngine<K, V>>>,
    partition_engine: Option<Arc<dyn PartitionSnapshotEngine<K, V>>>,
    imports: Vec<SnapshotMetadata<K, V>>,
    exports: Vec<SnapshotMetadata<K, V>>,
    service: Option<SnapshotService<K, V>>,
}

impl<K, V> SnapshotOrchestrator<K, V> {
    pub fn new() -> Self {
        Self {
            store_engine: None,
            partition_engine: None,
            imports: Vec::new(),
            exports: Vec::new(),
            service: None,
        }
    }

    // ---------- configuration (before initialize) ----------

    pub fn set_store_engine(&mut self, engine: Arc<dyn StoreSnapshotEngine<K, V>>) {
        self.store_engine = Some(engine);
    }

    pub fn set_partition_engine(&mut self, engine: Arc<dyn PartitionSnapshotEngine<K, V>>) {
        self.partition_engine = Some(engine);
    }

    pub fn set_imports(&mut self, imports: Vec<SnapshotMetadata<K, V>>) {
        self.imports = imports;
    }

    pub fn set_exports(&mut self, exports: Vec<SnapshotMetadata<K, V>>) {
        self.exports = exports;
    }

    pub fn with_store_engine(mut self, engine: Arc<dyn StoreSnapshotEngine<K, V>>) -> Self {
        self.set_store_engine(engine);
        self
    }

    pub fn with_partition_engine(mut self, engine: Arc<dyn PartitionSnapshotEngine<K, V>>) -> Self {
        self.set_partition_engine(engine);
        self
    }

    pub fn with_imports(mut self, imports: Vec<SnapshotMetadata<K, V>>) -> Self {
        self.set_imports(imports);
        self
    }

    pub fn with_exports(mut self, exports: Vec<SnapshotMetadata<K, V>>) -> Self {
        self.set_exports(exports);
        self
    }

    pub fn imports(&self) -> &[SnapshotMetadata<K, V>] {
        &self.imports
    }

    pub fn exports(&self) -> &[SnapshotMetadata<K, V>] {
        &self.exports
    }

    /// Name of the configured partition, if this orchestrator is partition-scoped.
    pub fn partition_name(&self) -> Option<&str> {
        self.partition_engine.as_ref().map(|e| e.partition_name())
    }

    // ---------- lifecycle ----------

    /// Build the adapter and run the configured imports.
    /// On import failure the orchestrator stays uninitialized.
    pub fn initialize(&mut self) -> SnapshotResult<()> {
        if self.service.is_some() {
            return Err(SnapshotError::IllegalState(
                "The snapshot service was already initialized".to_string(),
            ));
        }

        let service = self.create()?;
        info!(
            "snapshot service: initialize kind={}, imports={}, exports={}",
            service.kind(),
            self.imports.len(),
            self.exports.len()
        );

        service.do_import(&self.imports)?;
        self.service = Some(service);
        Ok(())
    }

    /// Partition engine wins; otherwise the store engine; neither is an illegal state.
    fn create(&self) -> SnapshotResult<SnapshotService<K, V>> {
        if let Some(engine) = &self.partition_engine {
            return Ok(SnapshotService::Partition(PartitionSnapshotAdapter::new(
                Arc::clone(engine),
            )));
        }
        match &self.store_engine {
            Some(engine) => Ok(SnapshotService::Store(StoreSnapshotAdapter::new(Arc::clone(
                engine,
            )))),
            None => Err(SnapshotError::IllegalState(
                "The store was not properly initialized: set a store or partition snapshot engine"
                    .to_string(),
            )),
        }
    }

    /// The one adapter instance built by `initialize()`.
    pub fn service(&self) -> SnapshotResult<&SnapshotService<K, V>> {
        self.service.as_ref().ok_or_else(|| {
            SnapshotError::IllegalState("The snapshot service is not initialized".to_string())
        })
    }

    pub fn service_kind(&self) -> Option<ServiceKind> {
        self.service.as_ref().map(|s| s.kind())
    }

    pub fn is_initialized(&self) -> bool {
        self.service.is_some()
    }

    pub fn is_singleton(&self) -> bool {
        true
    }

    /// Export the static export list. Errors go back to the caller.
    pub fn shutdown(&self) -> SnapshotResult<()> {
        let service = self.service()?;
        info!("snapshot service: shutdown, exports={}", self.exports.len());
        service.do_export(&self.exports)
    }

    // ---------- triggers ----------

    /// (partition event for our partition) or (store event and no partition configured).
    pub fn is_match(&self, event: &SnapshotTriggerEvent<K, V>) -> bool {
        (event.is_partition_event() && event.matches(self.partition_name()))
            || (event.is_store_event() && self.partition_engine.is_none())
    }

    /// Event metadata when non-empty, otherwise the static exports.
    pub fn resolve_snapshot_metadata<'a>(
        &'a self,
        event: &'a SnapshotTriggerEvent<K, V>,
    ) -> &'a [SnapshotMetadata<K, V>] {
        if !event.metadata().is_empty() {
            event.metadata()
        } else {
            &self.exports
        }
    }

    fn handle_event(&self, event: &SnapshotTriggerEvent<K, V>) -> SnapshotResult<()> {
        if !self.is_match(event) {
            record_trigger_ignored();
            debug!("snapshot event ignored: target={:?}", event.target());
            return Ok(());
        }
        record_trigger_matched();
        self.service()?
            .do_export(self.resolve_snapshot_metadata(event))
    }
}

impl<K, V> SnapshotEventListener<K, V> for SnapshotOrchestrator<K, V> {
    /// Never fails: a trigger-driven export must not break event delivery.
    fn on_snapshot_event(&self, event: &SnapshotTriggerEvent<K, V>) {
        record_trigger_event();
        if let Err(e) = self.handle_event(event) {
            record_trigger_failure_swallowed();
            warn!("snapshot event: export failed (ignored): {:#}", anyhow::Error::new(e));
        }
    }
}

impl<K, V> fmt::Debug for SnapshotOrchestrator<K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SnapshotOrchestrator")
            .field("kind", &self.service_kind())
            .field("partition", &self.partition_name())
            .field("store_engine", &self.store_engine.is_some())
            .field("imports", &self.imports.len())
            .field("exports", &self.exports.len())
            .finish()
    }
}

impl<K, V> Default for SnapshotOrchestrator<K, V> {
    fn default() -> Self {
        Self::new()
    }
}
