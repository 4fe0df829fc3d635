//! Domain models shared by the stores and the migration engine.

mod event;
mod queue;
mod record;

pub use event::MigrationEvent;
pub use queue::QueueEntry;
pub use record::{LegacyRecordId, NewRecordKey, Record, RecordStatus};
