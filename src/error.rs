//! Application error types.

use thiserror::Error;

use crate::models::LegacyRecordId;

/// Application-level errors for shelfmove.
#[derive(Error, Debug)]
pub enum AppError {
    // PostgreSQL errors
    #[error("Database error: {0}")]
    Database(#[from] tokio_postgres::Error),

    #[error("Connection pool error: {0}")]
    Pool(String),

    // Migration errors
    #[error("Record not found in legacy store: ID {0}")]
    RecordNotFound(LegacyRecordId),

    #[error("Insertion failed: {0}")]
    Insertion(String),

    #[error("No migrated record for queue entry: source ID {0}")]
    QueueMappingMissing(LegacyRecordId),

    #[error("Failed to write migration log: {0}")]
    LogPersistence(#[from] std::io::Error),

    #[error("Legacy store has already been dropped")]
    StoreDropped,

    #[error("Migration is already in progress")]
    AlreadyRunning,

    // Config errors
    #[error("Configuration error: {0}")]
    Config(#[from] crate::config::ConfigError),

    #[error("Internal error: {0}")]
    Internal(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        assert_eq!(
            AppError::RecordNotFound(LegacyRecordId(7)).to_string(),
            "Record not found in legacy store: ID 7"
        );
        assert_eq!(
            AppError::QueueMappingMissing(LegacyRecordId(3)).to_string(),
            "No migrated record for queue entry: source ID 3"
        );
    }
}
