//! In-memory store implementations.
//!
//! Useful for embedding the engine without a database and for tests. The
//! legacy store can simulate missing and unreadable records; the record
//! store can reject inserts by title.

use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;

use crate::error::AppError;
use crate::models::{LegacyRecordId, NewRecordKey, QueueEntry, Record};
use crate::store::traits::{LegacyStore, RecordStore};

// ----------------------------------------------------------------------------
// Legacy store
// ----------------------------------------------------------------------------

/// Builder for [`MemoryLegacyStore`].
///
/// Identifiers are listed in the order they are added.
#[derive(Debug, Clone, Default)]
pub struct MemoryLegacyStoreBuilder {
    ids: Vec<LegacyRecordId>,
    records: HashMap<LegacyRecordId, Record>,
    unreadable: HashSet<LegacyRecordId>,
    queue: BTreeMap<LegacyRecordId, i32>,
}

impl MemoryLegacyStoreBuilder {
    /// Adds a readable record.
    pub fn record(mut self, id: LegacyRecordId, record: Record) -> Self {
        self.ids.push(id);
        self.records.insert(id, record);
        self
    }

    /// Lists an identifier whose record cannot be found.
    pub fn missing(mut self, id: LegacyRecordId) -> Self {
        self.ids.push(id);
        self
    }

    /// Lists an identifier whose read fails with a store error.
    pub fn unreadable(mut self, id: LegacyRecordId) -> Self {
        self.ids.push(id);
        self.unreadable.insert(id);
        self
    }

    /// Adds (or replaces) a queue entry.
    pub fn queue_entry(mut self, id: LegacyRecordId, priority: i32) -> Self {
        self.queue.insert(id, priority);
        self
    }

    pub fn build(self) -> MemoryLegacyStore {
        MemoryLegacyStore {
            data: Mutex::new(self),
            dropped: AtomicBool::new(false),
        }
    }
}

/// Legacy store held in memory.
#[derive(Debug, Default)]
pub struct MemoryLegacyStore {
    data: Mutex<MemoryLegacyStoreBuilder>,
    dropped: AtomicBool,
}

impl MemoryLegacyStore {
    pub fn builder() -> MemoryLegacyStoreBuilder {
        MemoryLegacyStoreBuilder::default()
    }

    /// Whether [`drop_store`](LegacyStore::drop_store) has been called.
    pub fn is_dropped(&self) -> bool {
        self.dropped.load(Ordering::SeqCst)
    }

    fn data(&self) -> Result<MutexGuard<'_, MemoryLegacyStoreBuilder>, AppError> {
        if self.is_dropped() {
            return Err(AppError::StoreDropped);
        }
        Ok(self.data.lock().unwrap_or_else(PoisonError::into_inner))
    }
}

#[async_trait]
impl LegacyStore for MemoryLegacyStore {
    async fn list_migrable_ids(&self) -> Result<Vec<LegacyRecordId>, AppError> {
        let data = self.data()?;
        Ok(data
            .ids
            .iter()
            .copied()
            .filter(|id| {
                data.records
                    .get(id)
                    .map_or(true, |record| record.status.is_migrable())
            })
            .collect())
    }

    async fn read_record(&self, id: LegacyRecordId) -> Result<Option<Record>, AppError> {
        let data = self.data()?;
        if data.unreadable.contains(&id) {
            return Err(AppError::Internal(format!("Failed to read record {}", id)));
        }
        Ok(data.records.get(&id).cloned())
    }

    async fn list_queue_entries(&self) -> Result<Vec<QueueEntry>, AppError> {
        let data = self.data()?;
        Ok(data
            .queue
            .iter()
            .map(|(id, priority)| QueueEntry::new(*id, *priority))
            .collect())
    }

    async fn drop_store(&self) -> Result<(), AppError> {
        let mut data = self.data()?;
        *data = MemoryLegacyStoreBuilder::default();
        self.dropped.store(true, Ordering::SeqCst);
        Ok(())
    }
}

// ----------------------------------------------------------------------------
// Record store
// ----------------------------------------------------------------------------

#[derive(Debug, Default)]
struct RecordState {
    records: Vec<(NewRecordKey, Record)>,
    queue: Vec<(NewRecordKey, i32)>,
}

/// New record store held in memory.
#[derive(Debug, Default)]
pub struct MemoryRecordStore {
    state: Mutex<RecordState>,
    rejected_titles: HashSet<String>,
}

impl MemoryRecordStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes inserts of records with the given title fail.
    pub fn rejecting(mut self, title: impl Into<String>) -> Self {
        self.rejected_titles.insert(title.into());
        self
    }

    /// Snapshot of the stored records, in insertion order.
    pub fn records(&self) -> Vec<(NewRecordKey, Record)> {
        self.state().records.clone()
    }

    /// Snapshot of the queue, in insertion order.
    pub fn queue(&self) -> Vec<(NewRecordKey, i32)> {
        self.state().queue.clone()
    }

    /// Looks up a stored record by key.
    pub fn record(&self, key: &NewRecordKey) -> Option<Record> {
        self.state()
            .records
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, record)| record.clone())
    }

    fn state(&self) -> MutexGuard<'_, RecordState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[async_trait]
impl RecordStore for MemoryRecordStore {
    async fn delete_all_records(&self) -> Result<(), AppError> {
        let mut state = self.state();
        state.queue.clear();
        state.records.clear();
        Ok(())
    }

    async fn insert_record(&self, record: &Record) -> Result<NewRecordKey, AppError> {
        if self.rejected_titles.contains(&record.title) {
            return Err(AppError::Insertion(format!(
                "write rejected for '{}'",
                record.title
            )));
        }

        let key = NewRecordKey::generate();
        self.state().records.push((key.clone(), record.clone()));
        Ok(key)
    }

    async fn insert_queue_entry(&self, key: &NewRecordKey, priority: i32) -> Result<(), AppError> {
        let mut state = self.state();
        if !state.records.iter().any(|(k, _)| k == key) {
            return Err(AppError::Insertion(format!("unknown record key {}", key)));
        }
        state.queue.push((key.clone(), priority));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::RecordStatus;

    #[tokio::test]
    async fn test_legacy_lists_ids_in_insertion_order() {
        let store = MemoryLegacyStore::builder()
            .record(LegacyRecordId(3), Record::new("C", "/3", None))
            .missing(LegacyRecordId(1))
            .record(LegacyRecordId(2), Record::new("B", "/2", None))
            .build();

        let ids = store.list_migrable_ids().await.unwrap();
        assert_eq!(ids, vec![LegacyRecordId(3), LegacyRecordId(1), LegacyRecordId(2)]);
        assert!(store.read_record(LegacyRecordId(1)).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_legacy_skips_ignored_records() {
        let store = MemoryLegacyStore::builder()
            .record(LegacyRecordId(1), Record::new("A", "/1", None))
            .record(
                LegacyRecordId(2),
                Record::new("B", "/2", None).with_status(RecordStatus::Ignored),
            )
            .build();

        let ids = store.list_migrable_ids().await.unwrap();
        assert_eq!(ids, vec![LegacyRecordId(1)]);
    }

    #[tokio::test]
    async fn test_legacy_queue_is_ordered_by_id() {
        let store = MemoryLegacyStore::builder()
            .queue_entry(LegacyRecordId(5), 0)
            .queue_entry(LegacyRecordId(1), 7)
            .build();

        let entries = store.list_queue_entries().await.unwrap();
        assert_eq!(
            entries,
            vec![
                QueueEntry::new(LegacyRecordId(1), 7),
                QueueEntry::new(LegacyRecordId(5), 0)
            ]
        );
    }

    #[tokio::test]
    async fn test_legacy_unreadable_and_dropped() {
        let store = MemoryLegacyStore::builder()
            .unreadable(LegacyRecordId(4))
            .build();

        assert!(store.read_record(LegacyRecordId(4)).await.is_err());

        store.drop_store().await.unwrap();
        assert!(store.is_dropped());
        assert!(matches!(
            store.list_migrable_ids().await,
            Err(AppError::StoreDropped)
        ));
    }

    #[tokio::test]
    async fn test_record_store_insert_and_clear() {
        let store = MemoryRecordStore::new().rejecting("Broken");

        let key = store
            .insert_record(&Record::new("Fine", "/1", None))
            .await
            .unwrap();
        store.insert_queue_entry(&key, 3).await.unwrap();
        assert!(matches!(
            store.insert_record(&Record::new("Broken", "/2", None)).await,
            Err(AppError::Insertion(_))
        ));
        assert_eq!(store.records().len(), 1);
        assert_eq!(store.queue(), vec![(key.clone(), 3)]);

        store.delete_all_records().await.unwrap();
        assert!(store.records().is_empty());
        assert!(store.queue().is_empty());
        assert!(store.record(&key).is_none());
    }

    #[tokio::test]
    async fn test_record_store_rejects_unknown_queue_key() {
        let store = MemoryRecordStore::new();
        let result = store
            .insert_queue_entry(&NewRecordKey::generate(), 0)
            .await;
        assert!(result.is_err());
    }
}
