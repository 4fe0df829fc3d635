//! Store abstraction for backend-agnostic migrations.
//!
//! The engine only talks to the two traits defined here, so the same run
//! logic works against PostgreSQL or the in-memory stores used in tests.
//!
//! # Usage
//!
//! ```ignore
//! use shelfmove::store::backends::memory::{MemoryLegacyStore, MemoryRecordStore};
//! use shelfmove::store::LegacyStore;
//!
//! let legacy = MemoryLegacyStore::builder()
//!     .record(LegacyRecordId(1), Record::new("First", "/g/1", Some("example")))
//!     .queue_entry(LegacyRecordId(1), 0)
//!     .build();
//!
//! let ids = legacy.list_migrable_ids().await?;
//! ```

mod traits;

pub mod backends;

pub use traits::{LegacyStore, RecordStore};
