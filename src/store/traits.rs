//! Core traits the migration engine consumes.
//!
//! - [`LegacyStore`] - Read side: the store being retired
//! - [`RecordStore`] - Write side: the store receiving migrated records

use async_trait::async_trait;

use crate::error::AppError;
use crate::models::{LegacyRecordId, NewRecordKey, QueueEntry, Record};

/// Read access to the legacy record store.
///
/// The store is treated as read-only until [`drop_store`](LegacyStore::drop_store),
/// which the engine calls exactly once, after both migration phases.
#[async_trait]
pub trait LegacyStore: Send + Sync {
    /// Lists the identifiers of every migrable record, in the store's
    /// native enumeration order.
    async fn list_migrable_ids(&self) -> Result<Vec<LegacyRecordId>, AppError>;

    /// Reads a single record.
    ///
    /// Returns `Ok(None)` when the identifier is listed but the record
    /// itself cannot be found.
    async fn read_record(&self, id: LegacyRecordId) -> Result<Option<Record>, AppError>;

    /// Lists the download queue, ordered by legacy identifier.
    async fn list_queue_entries(&self) -> Result<Vec<QueueEntry>, AppError>;

    /// Irreversibly deletes the legacy store.
    async fn drop_store(&self) -> Result<(), AppError>;
}

/// Write access to the new record store.
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// Deletes every record and queue entry.
    ///
    /// Called before a run so that repeating a migration never duplicates data.
    async fn delete_all_records(&self) -> Result<(), AppError>;

    /// Inserts a copy of `record` and returns the key the store assigned to it.
    ///
    /// Fails with [`AppError::Insertion`] when the underlying write fails.
    async fn insert_record(&self, record: &Record) -> Result<NewRecordKey, AppError>;

    /// Places an already-inserted record in the download queue.
    async fn insert_queue_entry(&self, key: &NewRecordKey, priority: i32) -> Result<(), AppError>;
}
