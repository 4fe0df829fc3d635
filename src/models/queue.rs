//! Queue entry model.

use serde::{Deserialize, Serialize};

use super::LegacyRecordId;

/// Position of a legacy record in the download queue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueueEntry {
    pub record_id: LegacyRecordId,
    /// Lower values are processed first.
    pub priority: i32,
}

impl QueueEntry {
    pub fn new(record_id: LegacyRecordId, priority: i32) -> Self {
        Self {
            record_id,
            priority,
        }
    }
}
