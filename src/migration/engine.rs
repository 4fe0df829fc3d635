//! End-to-end migration run.

use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};

use crate::error::AppError;
use crate::migration::identifier_map::IdentifierMap;
use crate::migration::log::{LogDestination, MigrationLog, Severity};
use crate::migration::queue::{QueueMigrator, QueueOutcome};
use crate::migration::record::{RecordMigrator, RecordOutcome};
use crate::migration::report::MigrationReport;
use crate::models::MigrationEvent;
use crate::store::{LegacyStore, RecordStore};

/// What a completed run leaves behind.
#[derive(Debug, Clone)]
pub struct MigrationSummary {
    pub report: MigrationReport,
    /// Legacy id → new key for every migrated record.
    pub identifiers: IdentifierMap,
    /// Location of the persisted log, if it could be written.
    pub log_file: Option<PathBuf>,
}

/// Clears the running flag when dropped, including on early return or unwind.
struct RunningGuard<'a>(&'a AtomicBool);

impl Drop for RunningGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

/// Drives a one-shot migration from a legacy store into a new store.
///
/// A run is strictly sequential:
///
/// 1. Delete everything in the new store, so a run can be repeated safely
/// 2. Migrate every migrable record, in legacy order, emitting one
///    [`MigrationEvent::Progress`] per record
/// 3. Re-key the legacy queue through the identifier map
/// 4. Drop the legacy store
/// 5. Persist the log and emit [`MigrationEvent::Complete`]
///
/// Per-item failures are counted and traced, never propagated. Only failures
/// to clean the new store or to list legacy ids or queue entries abort a run.
pub struct MigrationEngine<L, N> {
    legacy: Arc<L>,
    target: Arc<N>,
    destination: LogDestination,
    running: AtomicBool,
    subscribers: Mutex<Vec<UnboundedSender<MigrationEvent>>>,
}

impl<L, N> MigrationEngine<L, N>
where
    L: LegacyStore,
    N: RecordStore,
{
    pub fn new(legacy: Arc<L>, target: Arc<N>, destination: LogDestination) -> Self {
        Self {
            legacy,
            target,
            destination,
            running: AtomicBool::new(false),
            subscribers: Mutex::new(Vec::new()),
        }
    }

    /// Whether a run is currently in progress.
    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    /// Registers an observer.
    ///
    /// Events are delivered in processing order. A subscriber only sees
    /// events emitted after it subscribed; dropping the receiver unsubscribes.
    pub fn subscribe(&self) -> UnboundedReceiver<MigrationEvent> {
        let (tx, rx) = mpsc::unbounded_channel();
        self.subscribers
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(tx);
        rx
    }

    /// Runs the migration.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::AlreadyRunning`] without touching either store if
    /// another run is in progress on this engine, or the store error that
    /// aborted the run.
    pub async fn run(&self) -> Result<MigrationSummary, AppError> {
        let _guard = self.try_start()?;
        self.execute().await
    }

    fn try_start(&self) -> Result<RunningGuard<'_>, AppError> {
        self.running
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .map_err(|_| AppError::AlreadyRunning)?;
        Ok(RunningGuard(&self.running))
    }

    async fn execute(&self) -> Result<MigrationSummary, AppError> {
        let mut log = MigrationLog::new();
        let mut report = MigrationReport::default();
        let mut identifiers = IdentifierMap::new();

        tracing::info!("Cleaning up target store");
        self.target.delete_all_records().await?;

        self.migrate_records(&mut log, &mut report, &mut identifiers)
            .await?;
        self.migrate_queue(&mut log, &mut report, &identifiers)
            .await?;

        match self.legacy.drop_store().await {
            Ok(()) => tracing::info!("Legacy store dropped"),
            Err(e) => log.trace(Severity::Error, format!("Drop legacy store ERROR : {}", e)),
        }

        let log_file = log.persist_to(&self.destination);
        if log_file.is_none() {
            tracing::warn!("Migration log could not be written");
        }

        self.emit(MigrationEvent::Complete {
            total: report.records_total,
            ok: report.records_ok,
            ko: report.records_ko,
            log_file: log_file.clone(),
        });

        Ok(MigrationSummary {
            report,
            identifiers,
            log_file,
        })
    }

    async fn migrate_records(
        &self,
        log: &mut MigrationLog,
        report: &mut MigrationReport,
        identifiers: &mut IdentifierMap,
    ) -> Result<(), AppError> {
        let ids = self.legacy.list_migrable_ids().await?;
        report.records_total = ids.len();

        if ids.is_empty() {
            tracing::info!("No records to migrate");
            return Ok(());
        }

        log.trace(
            Severity::Info,
            format!("Records migration starting : {} records total", ids.len()),
        );

        let migrator = RecordMigrator::new(self.legacy.clone(), self.target.clone());
        for id in ids {
            let outcome = migrator.migrate(id, identifiers).await;

            match &outcome {
                RecordOutcome::Migrated { record, .. } => {
                    report.record_ok();
                    log.trace(
                        Severity::Debug,
                        format!("Migrate record OK : {}", record.title),
                    );
                }
                RecordOutcome::NotFound { .. } => {
                    report.record_ko();
                    log.trace(
                        Severity::Warn,
                        format!("Migrate record KO : {}", AppError::RecordNotFound(id)),
                    );
                }
                RecordOutcome::Failed { record, message } => {
                    report.record_ko();
                    log.trace(
                        Severity::Error,
                        format!("Migrate record ERROR : {} {} {}", message, id, record.title),
                    );
                }
            }

            self.emit(MigrationEvent::Progress {
                record: outcome.into_record(),
                processed: report.records_processed(),
                ok: report.records_ok,
                ko: report.records_ko,
                total: report.records_total,
            });
        }

        log.trace(
            Severity::Info,
            format!(
                "Records migration complete : {} OK; {} KO",
                report.records_ok, report.records_ko
            ),
        );
        Ok(())
    }

    async fn migrate_queue(
        &self,
        log: &mut MigrationLog,
        report: &mut MigrationReport,
        identifiers: &IdentifierMap,
    ) -> Result<(), AppError> {
        let entries = self.legacy.list_queue_entries().await?;
        report.queue_total = entries.len();

        if entries.is_empty() {
            tracing::info!("No queue entries to migrate");
            return Ok(());
        }

        log.trace(
            Severity::Info,
            format!("Queue migration starting : {} entries total", entries.len()),
        );

        let migrator = QueueMigrator::new(self.target.clone());
        for entry in entries {
            match migrator.migrate(entry, identifiers).await {
                QueueOutcome::Migrated { key } => {
                    report.queue_ok();
                    log.trace(
                        Severity::Info,
                        format!("Migrate queue OK : target ID {}", key),
                    );
                }
                QueueOutcome::Missing => {
                    report.queue_ko();
                    log.trace(
                        Severity::Warn,
                        format!(
                            "Migrate queue KO : {}",
                            AppError::QueueMappingMissing(entry.record_id)
                        ),
                    );
                }
                QueueOutcome::Failed { key, message } => {
                    report.queue_ko();
                    log.trace(
                        Severity::Error,
                        format!("Migrate queue ERROR : {} target ID {}", message, key),
                    );
                }
            }
        }

        log.trace(
            Severity::Info,
            format!(
                "Queue migration complete : {} OK; {} KO",
                report.queue_ok, report.queue_ko
            ),
        );
        Ok(())
    }

    /// Sends `event` to every live subscriber, pruning closed ones.
    fn emit(&self, event: MigrationEvent) {
        let mut subscribers = self
            .subscribers
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        subscribers.retain(|tx| tx.send(event.clone()).is_ok());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::backends::memory::{MemoryLegacyStore, MemoryRecordStore};

    fn engine() -> MigrationEngine<MemoryLegacyStore, MemoryRecordStore> {
        MigrationEngine::new(
            Arc::new(MemoryLegacyStore::builder().build()),
            Arc::new(MemoryRecordStore::new()),
            LogDestination::default(),
        )
    }

    #[test]
    fn test_guard_clears_running_flag() {
        let engine = engine();
        {
            let _guard = engine.try_start().unwrap();
            assert!(engine.is_running());
            assert!(matches!(engine.try_start(), Err(AppError::AlreadyRunning)));
        }
        assert!(!engine.is_running());
    }

    #[test]
    fn test_emit_prunes_closed_subscribers() {
        let engine = engine();
        let mut open = engine.subscribe();
        drop(engine.subscribe());

        engine.emit(MigrationEvent::Complete {
            total: 0,
            ok: 0,
            ko: 0,
            log_file: None,
        });

        assert_eq!(engine.subscribers.lock().unwrap().len(), 1);
        assert!(open.try_recv().unwrap().is_complete());
    }
}
