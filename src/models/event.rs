//! Notifications emitted by the migration engine.

use std::path::PathBuf;

use serde::Serialize;

use super::Record;

/// Event delivered to engine subscribers, in processing order.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum MigrationEvent {
    /// Emitted once per legacy record, after it has been processed.
    Progress {
        /// The processed record, or the placeholder if it could not be read.
        record: Record,
        /// Records processed so far, including this one.
        processed: usize,
        ok: usize,
        ko: usize,
        total: usize,
    },
    /// Emitted once at the end of a run.
    Complete {
        total: usize,
        ok: usize,
        ko: usize,
        /// Location of the persisted log; `None` if it could not be written.
        log_file: Option<PathBuf>,
    },
}

impl MigrationEvent {
    pub fn is_complete(&self) -> bool {
        matches!(self, MigrationEvent::Complete { .. })
    }
}
