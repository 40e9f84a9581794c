//! Trigger events for ad hoc exports.
//!
//! An event names its target scope (the whole store or one partition) and may carry
//! its own export metadata, which then wins over the orchestrator's static exports.
//! Delivery is synchronous: `EventDispatcher::publish` runs every listener inline
//! on the caller's thread, so a slow export blocks the publisher.

use std::sync::Arc;

use log::debug;

use super::metadata::SnapshotMetadata;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SnapshotTarget {
    Store,
    Partition(String),
}

pub struct SnapshotTriggerEvent<K, V> {
    target: SnapshotTarget,
    metadata: Vec<SnapshotMetadata<K, V>>,
}

impl<K, V> SnapshotTriggerEvent<K, V> {
    /// Store-wide export request.
    pub fn store(metadata: Vec<SnapshotMetadata<K, V>>) -> Self {
        Self {
            target: SnapshotTarget::Store,
            metadata,
        }
    }

    /// Export request for one partition ("orders" and "/orders" are the same partition).
    pub fn partition<S: AsRef<str>>(name: S, metadata: Vec<SnapshotMetadata<K, V>>) -> Self {
        Self {
            target: SnapshotTarget::Partition(normalize_partition_name(name.as_ref()).to_string()),
            metadata,
        }
    }

    pub fn target(&self) -> &SnapshotTarget {
        &self.target
    }

    pub fn is_store_event(&self) -> bool {
        matches!(self.target, SnapshotTarget::Store)
    }

    pub fn is_partition_event(&self) -> bool {
        matches!(self.target, SnapshotTarget::Partition(_))
    }

    /// True if this is a partition event addressed to `partition`. `None` never matches.
    pub fn matches(&self, partition: Option<&str>) -> bool {
        match (&self.target, partition) {
            (SnapshotTarget::Partition(target), Some(name)) => {
                target.as_str() == normalize_partition_name(name)
            }
            _ => false,
        }
    }

    pub fn metadata(&self) -> &[SnapshotMetadata<K, V>] {
        &self.metadata
    }
}

/// Strip leading '/' so that full-path and bare partition names compare equal.
pub fn normalize_partition_name(name: &str) -> &str {
    name.trim().trim_start_matches('/')
}

/// Receiver side of trigger events.
pub trait SnapshotEventListener<K, V> {
    fn on_snapshot_event(&self, event: &SnapshotTriggerEvent<K, V>);
}

/// Minimal in-process fan-out of trigger events to registered listeners.
pub struct EventDispatcher<K, V> {
    listeners: Vec<Arc<dyn SnapshotEventListener<K, V>>>,
}

impl<K, V> EventDispatcher<K, V> {
    pub fn new() -> Self {
        Self {
            listeners: Vec::new(),
        }
    }

    pub fn register(&mut self, listener: Arc<dyn SnapshotEventListener<K, V>>) {
        self.listeners.push(listener);
    }

    pub fn len(&self) -> usize {
        self.listeners.len()
    }

    pub fn is_empty(&self) -> bool {
        self.listeners.is_empty()
    }

    pub fn publish(&self, event: &SnapshotTriggerEvent<K, V>) {
        debug!(
            "snapshot event: target={:?}, listeners={}",
            event.target(),
            self.listeners.len()
        );
        for listener in &self.listeners {
            listener.on_snapshot_event(event);
        }
    }
}

impl<K, V> Default for EventDispatcher<K, V> {
    fn default() -> Self {
        Self::new()
    }
}
