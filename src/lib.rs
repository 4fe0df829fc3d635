//! shelfmove - legacy library migration
//!
//! Moves records and their download-queue positions from a legacy store into
//! a new record store, keeping an audit trail of every outcome.

pub mod cli;
pub mod config;
pub mod context;
pub mod error;
pub mod migration;
pub mod models;
pub mod store;
