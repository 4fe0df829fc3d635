//! Re-keying of download queue entries.

use std::sync::Arc;

use crate::migration::identifier_map::IdentifierMap;
use crate::models::{NewRecordKey, QueueEntry};
use crate::store::RecordStore;

/// Result of migrating one queue entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QueueOutcome {
    /// Attached to the migrated record `key` with the original priority.
    Migrated { key: NewRecordKey },
    /// The source record was never migrated; the entry is dropped.
    Missing,
    /// The new store rejected the entry.
    Failed { key: NewRecordKey, message: String },
}

impl QueueOutcome {
    pub fn is_ok(&self) -> bool {
        matches!(self, QueueOutcome::Migrated { .. })
    }
}

/// Moves queue entries to the new store using the identifier map.
pub struct QueueMigrator<N> {
    target: Arc<N>,
}

impl<N: RecordStore> QueueMigrator<N> {
    pub fn new(target: Arc<N>) -> Self {
        Self { target }
    }

    /// Migrates `entry` if its record has a new key; never retries or
    /// attaches the entry to another record.
    pub async fn migrate(&self, entry: QueueEntry, identifiers: &IdentifierMap) -> QueueOutcome {
        let Some(key) = identifiers.get(entry.record_id) else {
            return QueueOutcome::Missing;
        };

        match self.target.insert_queue_entry(key, entry.priority).await {
            Ok(()) => QueueOutcome::Migrated { key: key.clone() },
            Err(e) => QueueOutcome::Failed {
                key: key.clone(),
                message: e.to_string(),
            },
        }
    }
}
