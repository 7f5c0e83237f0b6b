//! SQLite connection pool and schema.
//!
//! All persistent state (land claims, users, todo tasks) lives in one
//! SQLite database accessed through a sqlx connection pool. The store
//! wrappers in [`crate::claims`] and [`crate::tasks`] hold clones of the
//! pool; no in-process locking is layered on top of what SQLite provides,
//! except the claim-creation transaction (see
//! [`crate::claims::ClaimValidator`]).

use std::path::Path;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use log::{info, warn};
use sqlx::SqlitePool;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use thiserror::Error;

static MEMDB_COUNTER: AtomicU64 = AtomicU64::new(0);

/// Database errors.
#[derive(Debug, Error)]
pub enum DbError {
    #[error("database error: {0}")]
    Sqlx(#[from] sqlx::Error),
    /// The (user, task text) pair violated the todo uniqueness constraint.
    #[error("task already exists: {0}")]
    TaskExists(String),
}

/// Database handle with connection pool.
#[derive(Clone)]
pub struct Database {
    pool: SqlitePool,
}

impl Database {
    /// Connection acquire timeout, so a saturated pool fails fast instead
    /// of stalling command handlers.
    const ACQUIRE_TIMEOUT: Duration = Duration::from_secs(5);

    /// Opens the database at `path` and creates the schema if needed.
    ///
    /// `":memory:"` opens a uniquely named shared-cache in-memory database
    /// so parallel tests never collide on the global memory namespace.
    /// Foreign keys are enabled; the todo table cascades on user deletion.
    pub async fn connect(path: &str) -> Result<Self, DbError> {
        let pool = if path == ":memory:" {
            let id = MEMDB_COUNTER.fetch_add(1, Ordering::Relaxed);
            let uri = format!(
                "file:waf-memdb-{}-{}?mode=memory&cache=shared",
                std::process::id(),
                id
            );
            let options = SqliteConnectOptions::new()
                .filename(&uri)
                .shared_cache(true)
                .foreign_keys(true)
                .create_if_missing(true);
            SqlitePoolOptions::new()
                .max_connections(1)
                .acquire_timeout(Self::ACQUIRE_TIMEOUT)
                .connect_with(options)
                .await?
        } else {
            if let Some(parent) = Path::new(path).parent()
                && !parent.as_os_str().is_empty()
                && let Err(e) = std::fs::create_dir_all(parent)
            {
                warn!("failed to create database directory {:?}: {}", parent, e);
            }
            let options = SqliteConnectOptions::new()
                .filename(path)
                .foreign_keys(true)
                .create_if_missing(true);
            SqlitePoolOptions::new()
                .max_connections(5)
                .acquire_timeout(Self::ACQUIRE_TIMEOUT)
                .connect_with(options)
                .await?
        };

        let db = Database { pool };
        db.init_schema().await?;
        info!("database connected at {}", path);
        Ok(db)
    }

    /// The underlying connection pool.
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    async fn init_schema(&self) -> Result<(), DbError> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS claims (
                user_id INTEGER NOT NULL,
                claim_x INTEGER NOT NULL,
                claim_y INTEGER NOT NULL,
                dimension INTEGER NOT NULL DEFAULT 0,
                claim_time TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP
            )
            "#,
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS users (
                user_id INTEGER PRIMARY KEY
            )
            "#,
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS todo (
                task_id INTEGER PRIMARY KEY AUTOINCREMENT,
                user_id INTEGER NOT NULL,
                task TEXT NOT NULL,
                date TEXT,
                time TEXT,
                remind_type INTEGER NOT NULL DEFAULT 0,
                datetime_created TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP,
                FOREIGN KEY (user_id) REFERENCES users (user_id) ON DELETE CASCADE,
                UNIQUE (user_id, task)
            )
            "#,
        )
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_connect_memory_creates_schema() {
        let db = Database::connect(":memory:").await.unwrap();

        // All three tables must exist and be queryable.
        for table in ["claims", "users", "todo"] {
            sqlx::query(&format!("SELECT COUNT(*) FROM {table}"))
                .fetch_one(db.pool())
                .await
                .unwrap();
        }
    }

    #[tokio::test]
    async fn test_memory_databases_are_isolated() {
        let db1 = Database::connect(":memory:").await.unwrap();
        let db2 = Database::connect(":memory:").await.unwrap();

        sqlx::query("INSERT INTO users (user_id) VALUES (1)")
            .execute(db1.pool())
            .await
            .unwrap();

        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM users")
            .fetch_one(db2.pool())
            .await
            .unwrap();
        assert_eq!(count, 0);
    }

    #[tokio::test]
    async fn test_connect_file_database() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("waf.db");
        let db = Database::connect(path.to_str().unwrap()).await.unwrap();

        sqlx::query("INSERT INTO users (user_id) VALUES (7)")
            .execute(db.pool())
            .await
            .unwrap();
        assert!(path.exists());
    }
}
