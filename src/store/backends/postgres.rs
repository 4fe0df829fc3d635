//! PostgreSQL store implementations.
//!
//! Both stores pool connections through deadpool-postgres. They may point at
//! the same database or at two different ones.
//!
//! # Schema
//!
//! Legacy store (read, then dropped):
//!
//! ```sql
//! legacy_content (id BIGINT PRIMARY KEY, title, url, site, status, metadata JSONB)
//! legacy_queue   (content_id BIGINT PRIMARY KEY, priority INTEGER)
//! ```
//!
//! New store (created by `shelfmove init`):
//!
//! ```sql
//! records (key TEXT PRIMARY KEY, title, url, site, status, metadata JSONB, migrated_at)
//! queue   (record_key TEXT REFERENCES records ON DELETE CASCADE, priority INTEGER)
//! ```
//!
//! # Example
//!
//! ```ignore
//! use shelfmove::store::backends::postgres::PostgresRecordStore;
//!
//! let target = PostgresRecordStore::connect("postgresql://localhost/library_v2").await?;
//! target.ensure_schema().await?;
//! ```

use async_trait::async_trait;
use deadpool_postgres::{Manager, ManagerConfig, Object, Pool, RecyclingMethod};
use serde_json::Value as JsonValue;
use tokio_postgres::NoTls;

use crate::error::AppError;
use crate::models::{LegacyRecordId, NewRecordKey, QueueEntry, Record, RecordStatus};
use crate::store::traits::{LegacyStore, RecordStore};

/// SQL creating the legacy tables. Only needed to seed a legacy database.
pub const CREATE_LEGACY_TABLES: &str = r#"
CREATE TABLE IF NOT EXISTS legacy_content (
    id BIGINT PRIMARY KEY,
    title TEXT NOT NULL,
    url TEXT NOT NULL DEFAULT '',
    site TEXT,
    status TEXT NOT NULL DEFAULT 'downloaded',
    metadata JSONB NOT NULL DEFAULT '{}'
);

CREATE TABLE IF NOT EXISTS legacy_queue (
    content_id BIGINT PRIMARY KEY,
    priority INTEGER NOT NULL
);
"#;

/// SQL creating the new store's tables.
pub const CREATE_RECORD_TABLES: &str = r#"
CREATE TABLE IF NOT EXISTS records (
    key TEXT PRIMARY KEY,
    title TEXT NOT NULL,
    url TEXT NOT NULL DEFAULT '',
    site TEXT,
    status TEXT NOT NULL,
    metadata JSONB NOT NULL DEFAULT '{}',
    migrated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
);

CREATE TABLE IF NOT EXISTS queue (
    record_key TEXT NOT NULL REFERENCES records (key) ON DELETE CASCADE,
    priority INTEGER NOT NULL
);
"#;

/// Creates a connection pool for the given connection string.
fn build_pool(connection_string: &str) -> Result<Pool, AppError> {
    let pg_config: tokio_postgres::Config = connection_string
        .parse()
        .map_err(|e| AppError::Pool(format!("Invalid PostgreSQL connection string: {}", e)))?;

    let mgr_config = ManagerConfig {
        recycling_method: RecyclingMethod::Fast,
    };
    let mgr = Manager::from_config(pg_config, NoTls, mgr_config);
    Pool::builder(mgr)
        .max_size(4)
        .build()
        .map_err(|e| AppError::Pool(format!("Failed to create connection pool: {}", e)))
}

async fn get_connection(pool: &Pool) -> Result<Object, AppError> {
    pool.get()
        .await
        .map_err(|e| AppError::Pool(format!("Failed to get connection from pool: {}", e)))
}

/// Extracts a detailed message from a PostgreSQL error.
fn describe_pg_error(e: &tokio_postgres::Error) -> String {
    e.as_db_error()
        .map(|db_err| {
            format!(
                "{}: {} [{}] (detail: {:?})",
                db_err.severity(),
                db_err.message(),
                db_err.code().code(),
                db_err.detail()
            )
        })
        .unwrap_or_else(|| e.to_string())
}

/// Legacy store backed by the `legacy_content` and `legacy_queue` tables.
///
/// Cheap to clone - the underlying pool is `Arc`-based.
#[derive(Clone)]
pub struct PostgresLegacyStore {
    pool: Pool,
}

impl PostgresLegacyStore {
    pub async fn connect(connection_string: &str) -> Result<Self, AppError> {
        Ok(Self {
            pool: build_pool(connection_string)?,
        })
    }

    /// Gets a pooled connection, e.g. to seed legacy data.
    pub async fn connection(&self) -> Result<Object, AppError> {
        get_connection(&self.pool).await
    }

    /// Creates the legacy tables if they do not exist.
    pub async fn ensure_schema(&self) -> Result<(), AppError> {
        let conn = self.connection().await?;
        conn.batch_execute(CREATE_LEGACY_TABLES).await?;
        Ok(())
    }
}

#[async_trait]
impl LegacyStore for PostgresLegacyStore {
    async fn list_migrable_ids(&self) -> Result<Vec<LegacyRecordId>, AppError> {
        let conn = self.connection().await?;
        let rows = conn
            .query(
                "SELECT id FROM legacy_content WHERE status <> $1 ORDER BY id",
                &[&RecordStatus::Ignored.as_str()],
            )
            .await?;

        Ok(rows
            .iter()
            .map(|row| LegacyRecordId(row.get::<_, i64>("id")))
            .collect())
    }

    async fn read_record(&self, id: LegacyRecordId) -> Result<Option<Record>, AppError> {
        let conn = self.connection().await?;
        let row = conn
            .query_opt(
                "SELECT title, url, site, status, metadata FROM legacy_content WHERE id = $1",
                &[&id.0],
            )
            .await?;

        let Some(row) = row else {
            return Ok(None);
        };

        let status: String = row.get("status");
        let status = status.parse::<RecordStatus>().map_err(AppError::Internal)?;

        Ok(Some(Record {
            title: row.get("title"),
            url: row.get("url"),
            site: row.get("site"),
            status,
            metadata: row.get::<_, JsonValue>("metadata"),
        }))
    }

    async fn list_queue_entries(&self) -> Result<Vec<QueueEntry>, AppError> {
        let conn = self.connection().await?;
        let rows = conn
            .query(
                "SELECT content_id, priority FROM legacy_queue ORDER BY content_id",
                &[],
            )
            .await?;

        Ok(rows
            .iter()
            .map(|row| {
                QueueEntry::new(
                    LegacyRecordId(row.get::<_, i64>("content_id")),
                    row.get::<_, i32>("priority"),
                )
            })
            .collect())
    }

    async fn drop_store(&self) -> Result<(), AppError> {
        let conn = self.connection().await?;
        conn.batch_execute("DROP TABLE IF EXISTS legacy_queue, legacy_content")
            .await?;
        Ok(())
    }
}

/// New record store backed by the `records` and `queue` tables.
///
/// Keys are ULIDs generated client-side.
#[derive(Clone)]
pub struct PostgresRecordStore {
    pool: Pool,
}

impl PostgresRecordStore {
    pub async fn connect(connection_string: &str) -> Result<Self, AppError> {
        Ok(Self {
            pool: build_pool(connection_string)?,
        })
    }

    /// Gets a pooled connection.
    pub async fn connection(&self) -> Result<Object, AppError> {
        get_connection(&self.pool).await
    }

    /// Creates the record and queue tables if they do not exist.
    pub async fn ensure_schema(&self) -> Result<(), AppError> {
        let conn = self.connection().await?;
        conn.batch_execute(CREATE_RECORD_TABLES).await?;
        Ok(())
    }
}

#[async_trait]
impl RecordStore for PostgresRecordStore {
    async fn delete_all_records(&self) -> Result<(), AppError> {
        let conn = self.connection().await?;
        // Single simple-query batch, so both deletes commit together
        conn.batch_execute("DELETE FROM queue; DELETE FROM records;")
            .await?;
        Ok(())
    }

    async fn insert_record(&self, record: &Record) -> Result<NewRecordKey, AppError> {
        let conn = self.connection().await?;
        let key = NewRecordKey::generate();

        conn.execute(
            "INSERT INTO records (key, title, url, site, status, metadata)
             VALUES ($1, $2, $3, $4, $5, $6)",
            &[
                &key.as_str(),
                &record.title,
                &record.url,
                &record.site,
                &record.status.as_str(),
                &record.metadata,
            ],
        )
        .await
        .map_err(|e| AppError::Insertion(describe_pg_error(&e)))?;

        Ok(key)
    }

    async fn insert_queue_entry(&self, key: &NewRecordKey, priority: i32) -> Result<(), AppError> {
        let conn = self.connection().await?;
        conn.execute(
            "INSERT INTO queue (record_key, priority) VALUES ($1, $2)",
            &[&key.as_str(), &priority],
        )
        .await
        .map_err(|e| AppError::Insertion(describe_pg_error(&e)))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_connect_rejects_invalid_connection_string() {
        let result = PostgresRecordStore::connect("postgresql://localhost:notaport/library").await;
        assert!(matches!(result, Err(AppError::Pool(_))));
    }

    #[test]
    fn test_schema_sql_is_idempotent() {
        assert!(CREATE_LEGACY_TABLES.contains("CREATE TABLE IF NOT EXISTS legacy_content"));
        assert!(CREATE_RECORD_TABLES.contains("CREATE TABLE IF NOT EXISTS records"));
        assert!(CREATE_RECORD_TABLES.contains("ON DELETE CASCADE"));
    }
}
