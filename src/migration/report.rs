//! Running success/failure tally of a migration.

use serde::Serialize;

/// Counters for both migration phases.
///
/// At the end of a run `ok + ko == total` holds for each phase.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct MigrationReport {
    pub records_total: usize,
    pub records_ok: usize,
    pub records_ko: usize,
    pub queue_total: usize,
    pub queue_ok: usize,
    pub queue_ko: usize,
}

impl MigrationReport {
    pub fn record_ok(&mut self) {
        self.records_ok += 1;
    }

    pub fn record_ko(&mut self) {
        self.records_ko += 1;
    }

    pub fn queue_ok(&mut self) {
        self.queue_ok += 1;
    }

    pub fn queue_ko(&mut self) {
        self.queue_ko += 1;
    }

    /// Records processed so far.
    pub fn records_processed(&self) -> usize {
        self.records_ok + self.records_ko
    }

    /// Whether every listed record and queue entry has an outcome.
    pub fn is_balanced(&self) -> bool {
        self.records_ok + self.records_ko == self.records_total
            && self.queue_ok + self.queue_ko == self.queue_total
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counters_balance() {
        let mut report = MigrationReport {
            records_total: 3,
            queue_total: 1,
            ..MigrationReport::default()
        };
        assert!(!report.is_balanced());

        report.record_ok();
        report.record_ko();
        assert_eq!(report.records_processed(), 2);
        report.record_ok();
        report.queue_ko();

        assert!(report.is_balanced());
        assert_eq!(report.records_ok, 2);
        assert_eq!(report.queue_ko, 1);
    }
}
