//! SQLite-backed namespaces.
//!
//! All namespaces share one `kv_entries` table keyed by `(namespace, key)`.

use crate::error::KvError;
use crate::storage::{KeyEntry, KvStore};
use async_trait::async_trait;
use sqlx::SqlitePool;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use std::path::Path;

/// One namespace inside the shared SQLite table.
pub struct SqliteStore {
    pool: SqlitePool,
    namespace: String,
}

impl SqliteStore {
    pub fn new(pool: SqlitePool, namespace: impl Into<String>) -> Self {
        Self {
            pool,
            namespace: namespace.into(),
        }
    }

    /// Open (creating if needed) the database file and run migrations.
    pub async fn open_pool(path: &str) -> Result<SqlitePool, KvError> {
        ensure_parent_dir(path)?;
        let options = SqliteConnectOptions::new()
            .filename(path)
            .create_if_missing(true);
        let pool = SqlitePoolOptions::new().connect_with(options).await?;
        migrate(&pool).await?;
        Ok(pool)
    }

    /// Single-connection in-memory database, migrated. Each call returns a
    /// distinct database.
    pub async fn memory_pool() -> Result<SqlitePool, KvError> {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await?;
        migrate(&pool).await?;
        Ok(pool)
    }
}

/// Apply the bundled migrations.
pub async fn migrate(pool: &SqlitePool) -> Result<(), KvError> {
    sqlx::migrate!("./migrations").run(pool).await?;
    Ok(())
}

fn ensure_parent_dir(file_path: &str) -> Result<(), KvError> {
    if let Some(parent) = Path::new(file_path).parent()
        && !parent.as_os_str().is_empty()
        && !parent.exists()
    {
        std::fs::create_dir_all(parent)?;
    }
    Ok(())
}

#[async_trait]
impl KvStore for SqliteStore {
    async fn get(&self, key: &str) -> Result<Option<String>, KvError> {
        let value = sqlx::query_scalar::<_, String>(
            "SELECT value FROM kv_entries WHERE namespace = ? AND key = ?",
        )
        .bind(&self.namespace)
        .bind(key)
        .fetch_optional(&self.pool)
        .await?;
        Ok(value)
    }

    async fn put(&self, key: &str, value: &str) -> Result<(), KvError> {
        sqlx::query(
            "INSERT INTO kv_entries (namespace, key, value, updated_at) VALUES (?, ?, ?, ?) \
             ON CONFLICT(namespace, key) DO UPDATE SET value = excluded.value, updated_at = excluded.updated_at",
        )
        .bind(&self.namespace)
        .bind(key)
        .bind(value)
        .bind(chrono::Utc::now().timestamp())
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn list(&self) -> Result<Vec<KeyEntry>, KvError> {
        let keys = sqlx::query_scalar::<_, String>(
            "SELECT key FROM kv_entries WHERE namespace = ? ORDER BY key",
        )
        .bind(&self.namespace)
        .fetch_all(&self.pool)
        .await?;
        Ok(keys.into_iter().map(KeyEntry::new).collect())
    }
}
