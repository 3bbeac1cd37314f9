use super::Cache;
use anyhow::Result;
use async_trait::async_trait;
use chrono::Utc;
use sqlx::{Pool, Row, Sqlite, SqlitePool};
use std::path::Path;
use std::time::Duration;
use tracing::{debug, info};

/// Cache backed by a SQLite file so the mutex flag and the previous
/// execution timestamp survive process restarts.
///
/// Expiry is wall-clock based (epoch millis) and applied lazily on read,
/// so entries written before a crash still time out afterwards.
pub struct SqliteCache {
    pool: Pool<Sqlite>,
}

impl SqliteCache {
    pub async fn new(database_path: &str) -> Result<Self> {
        if let Some(parent) = Path::new(database_path).parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent).await?;
            }
        }

        let database_url = format!("sqlite:{}?mode=rwc", database_path);
        let pool = SqlitePool::connect(&database_url).await?;

        let cache = Self { pool };
        cache.initialize_tables().await?;
        info!("Cache database ready at '{}'", database_path);

        Ok(cache)
    }

    /// Expose pool for integration test queries
    #[allow(dead_code)]
    pub fn pool(&self) -> &Pool<Sqlite> {
        &self.pool
    }

    async fn initialize_tables(&self) -> Result<()> {
        let table_sql = r#"
            CREATE TABLE IF NOT EXISTS cache_entries (
                key TEXT PRIMARY KEY,
                value TEXT NOT NULL,
                expires_at_millis INTEGER
            )
        "#;
        sqlx::query(table_sql).execute(&self.pool).await?;
        Ok(())
    }

    fn now_millis() -> i64 {
        Utc::now().timestamp_millis()
    }
}

#[async_trait]
impl Cache for SqliteCache {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        let row = sqlx::query("SELECT value, expires_at_millis FROM cache_entries WHERE key = ?")
            .bind(key)
            .fetch_optional(&self.pool)
            .await?;

        let row = match row {
            Some(row) => row,
            None => return Ok(None),
        };

        let expires_at: Option<i64> = row.try_get("expires_at_millis")?;
        if let Some(expires_at) = expires_at {
            if expires_at <= Self::now_millis() {
                debug!("Cache entry '{}' expired, removing", key);
                sqlx::query("DELETE FROM cache_entries WHERE key = ?")
                    .bind(key)
                    .execute(&self.pool)
                    .await?;
                return Ok(None);
            }
        }

        let value: String = row.try_get("value")?;
        Ok(Some(value))
    }

    async fn put(&self, key: &str, value: &str, ttl: Option<Duration>) -> Result<()> {
        let expires_at = ttl.map(|ttl| Self::now_millis() + ttl.as_millis() as i64);

        sqlx::query(
            r#"
            INSERT INTO cache_entries (key, value, expires_at_millis)
            VALUES (?, ?, ?)
            ON CONFLICT(key) DO UPDATE SET
                value = excluded.value,
                expires_at_millis = excluded.expires_at_millis
            "#,
        )
        .bind(key)
        .bind(value)
        .bind(expires_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<()> {
        sqlx::query("DELETE FROM cache_entries WHERE key = ?")
            .bind(key)
            .execute(&self.pool)
            .await?;
        Ok(())
    }
}
