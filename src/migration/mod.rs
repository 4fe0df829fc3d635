//! Migration of a legacy record store into a new record store.
//!
//! A run is:
//! - **One-shot**: the legacy store is dropped once both phases complete
//! - **Repeatable until then**: the new store is emptied before each run
//! - **Failure-tolerant**: a record or queue entry that cannot be migrated
//!   is counted KO and traced, never retried or rolled back
//! - **Observable**: progress and completion events via
//!   [`MigrationEngine::subscribe`], plus a persisted `migration_log.txt`

mod engine;
mod identifier_map;
mod log;
mod queue;
mod record;
mod report;

pub use engine::{MigrationEngine, MigrationSummary};
pub use identifier_map::IdentifierMap;
pub use log::{
    default_log_dir, is_writable, LogDestination, LogEntry, MigrationLog, Severity, LOG_FILE_NAME,
};
pub use queue::{QueueMigrator, QueueOutcome};
pub use record::{RecordMigrator, RecordOutcome};
pub use report::MigrationReport;
