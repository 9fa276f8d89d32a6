//! SQLite-backed key-value store via sqlx.
//!
//! One table, three expected rows. WAL journal mode and file creation are
//! configured at connection time, and the table is created directly at
//! open rather than through migration machinery; a single key-value table
//! does not need versioned schema history.

use std::path::Path;

use async_trait::async_trait;
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePool};

use crate::error::StoreError;
use crate::kv::KeyValueStore;

/// Durable backend handle. Cheap to clone (pool is Arc internally).
#[derive(Clone)]
pub struct SqliteStore {
    pool: SqlitePool,
}

impl SqliteStore {
    /// Open (or create) the database at `db_path`.
    pub async fn open(db_path: &Path) -> Result<Self, StoreError> {
        let opts = SqliteConnectOptions::new()
            .filename(db_path)
            .create_if_missing(true)
            .journal_mode(SqliteJournalMode::Wal);

        let pool = SqlitePool::connect_with(opts)
            .await
            .map_err(|e| StoreError::Storage(e.into()))?;

        sqlx::query(
            "CREATE TABLE IF NOT EXISTS kv_records (key TEXT PRIMARY KEY, value BLOB NOT NULL)",
        )
        .execute(&pool)
        .await
        .map_err(|e| StoreError::Storage(e.into()))?;

        Ok(Self { pool })
    }
}

#[async_trait]
impl KeyValueStore for SqliteStore {
    async fn get(&self, key: &str) -> anyhow::Result<Option<Vec<u8>>> {
        let value = sqlx::query_scalar("SELECT value FROM kv_records WHERE key = ?")
            .bind(key)
            .fetch_optional(&self.pool)
            .await?;
        Ok(value)
    }

    async fn put(&self, key: &str, value: &[u8]) -> anyhow::Result<()> {
        sqlx::query(
            "INSERT INTO kv_records (key, value) VALUES (?, ?) \
             ON CONFLICT(key) DO UPDATE SET value = excluded.value",
        )
        .bind(key)
        .bind(value)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn delete(&self, key: &str) -> anyhow::Result<()> {
        sqlx::query("DELETE FROM kv_records WHERE key = ?")
            .bind(key)
            .execute(&self.pool)
            .await?;
        Ok(())
    }
}
