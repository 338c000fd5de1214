//! Audit trail output.
//!
//! Recording is fire-and-forget: a sink cannot fail the operation that
//! produced the entry.

use std::sync::Mutex;
use tracing::info;

use crate::models::AuditEntry;

/// Receives one entry per successful state change.
pub trait AuditSink: Send + Sync {
    /// Records `entry`.
    fn record(&self, entry: AuditEntry);
}

/// Writes audit entries as structured `tracing` events on the `audit` target.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingAuditSink;

impl AuditSink for TracingAuditSink {
    fn record(&self, entry: AuditEntry) {
        let new_value = entry
            .new_value
            .as_ref()
            .map(|v| v.to_string())
            .unwrap_or_default();
        info!(
            target: "audit",
            actor_id = entry.actor_id,
            action = ?entry.action,
            entity_type = %entry.entity_type,
            entity_id = ?entry.entity_id,
            new_value = %new_value,
            recorded_at = %entry.recorded_at,
            "{}",
            entry.description
        );
    }
}

/// Collects audit entries in memory.
#[derive(Debug, Default)]
pub struct InMemoryAuditSink {
    entries: Mutex<Vec<AuditEntry>>,
}

impl InMemoryAuditSink {
    /// Creates an empty sink.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a snapshot of every entry recorded so far, oldest first.
    pub fn entries(&self) -> Vec<AuditEntry> {
        match self.entries.lock() {
            Ok(entries) => entries.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }
}

impl AuditSink for InMemoryAuditSink {
    fn record(&self, entry: AuditEntry) {
        match self.entries.lock() {
            Ok(mut entries) => entries.push(entry),
            Err(poisoned) => poisoned.into_inner().push(entry),
        }
    }
}
