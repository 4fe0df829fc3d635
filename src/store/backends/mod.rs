//! Backend implementations of the store traits.
//!
//! Each backend implements [`LegacyStore`](crate::store::LegacyStore) and/or
//! [`RecordStore`](crate::store::RecordStore).
//!
//! # Available Backends
//!
//! | Backend | Module | Legacy | Target |
//! |---------|--------|--------|--------|
//! | PostgreSQL | [`postgres`] | yes | yes |
//! | In-memory | [`memory`] | yes | yes |

pub mod memory;
pub mod postgres;
