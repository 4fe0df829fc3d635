//! Migration of a single legacy record.

use std::sync::Arc;

use crate::error::AppError;
use crate::migration::identifier_map::IdentifierMap;
use crate::models::{LegacyRecordId, NewRecordKey, Record};
use crate::store::{LegacyStore, RecordStore};

/// Result of migrating one record.
#[derive(Debug, Clone)]
pub enum RecordOutcome {
    /// Inserted into the new store under `key`.
    Migrated { key: NewRecordKey, record: Record },
    /// Listed by the legacy store but not readable; carries the placeholder.
    NotFound { placeholder: Record },
    /// Read or insertion failed. `record` is the fetched record when the read
    /// succeeded, the placeholder otherwise.
    Failed { record: Record, message: String },
}

impl RecordOutcome {
    pub fn is_ok(&self) -> bool {
        matches!(self, RecordOutcome::Migrated { .. })
    }

    /// The record to report in progress events.
    pub fn record(&self) -> &Record {
        match self {
            RecordOutcome::Migrated { record, .. } => record,
            RecordOutcome::NotFound { placeholder } => placeholder,
            RecordOutcome::Failed { record, .. } => record,
        }
    }

    pub fn into_record(self) -> Record {
        match self {
            RecordOutcome::Migrated { record, .. } => record,
            RecordOutcome::NotFound { placeholder } => placeholder,
            RecordOutcome::Failed { record, .. } => record,
        }
    }
}

/// Copies records from the legacy store into the new store.
pub struct RecordMigrator<L, N> {
    legacy: Arc<L>,
    target: Arc<N>,
}

impl<L, N> RecordMigrator<L, N>
where
    L: LegacyStore,
    N: RecordStore,
{
    pub fn new(legacy: Arc<L>, target: Arc<N>) -> Self {
        Self { legacy, target }
    }

    /// Migrates the record identified by `id`.
    ///
    /// Adds exactly one entry to `identifiers` when the outcome is
    /// [`RecordOutcome::Migrated`], none otherwise. Never fails: every store
    /// error becomes a [`RecordOutcome::Failed`].
    pub async fn migrate(&self, id: LegacyRecordId, identifiers: &mut IdentifierMap) -> RecordOutcome {
        let record = match self.legacy.read_record(id).await {
            Ok(Some(record)) => record,
            Ok(None) => {
                return RecordOutcome::NotFound {
                    placeholder: Record::placeholder(),
                }
            }
            Err(e) => {
                return RecordOutcome::Failed {
                    record: Record::placeholder(),
                    message: e.to_string(),
                }
            }
        };

        if identifiers.contains(id) {
            // Listed twice: the first copy keeps the mapping
            return RecordOutcome::Failed {
                record,
                message: AppError::Insertion(format!("duplicate legacy ID {}", id)).to_string(),
            };
        }

        match self.target.insert_record(&record).await {
            Ok(key) => {
                identifiers.insert(id, key.clone());
                RecordOutcome::Migrated { key, record }
            }
            Err(e) => RecordOutcome::Failed {
                record,
                message: e.to_string(),
            },
        }
    }
}
