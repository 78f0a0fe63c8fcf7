use framer_application::error::{AppError, AppResult};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::{Sqlite, SqlitePool, Transaction};
use std::{future::Future, str::FromStr, time::Duration};
use tokio::time::timeout;
use tracing::info;

pub struct SqliteExecutor {
    timeout_secs: u64,
}

impl SqliteExecutor {
    pub fn new(timeout_secs: u64) -> Self {
        Self { timeout_secs }
    }

    pub async fn execute_with_timeout<T, F, Fut>(
        &self,
        operation: F,
        error_context: &str,
    ) -> AppResult<T>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, sqlx::Error>>,
    {
        timeout(Duration::from_secs(self.timeout_secs), operation())
            .await
            .map_err(|_| AppError::DatabaseError {
                message: format!("{error_context}: DB timeout"),
            })?
            .map_err(|e| AppError::DatabaseError {
                message: format!("{error_context}: {e}"),
            })
    }
}

/// Opens the pool, creating the database file if needed, and applies pending migrations.
pub async fn connect(database_url: &str, pool_size: u32) -> AppResult<SqlitePool> {
    let options = SqliteConnectOptions::from_str(database_url)
        .map_err(|e| AppError::ConfigError {
            message: format!("Invalid database URL: {e}"),
        })?
        .create_if_missing(true);

    let pool = SqlitePoolOptions::new()
        .max_connections(pool_size)
        .connect_with(options)
        .await
        .map_err(|e| AppError::DatabaseError {
            message: format!("Failed to connect to database: {e}"),
        })?;

    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .map_err(|e| AppError::DatabaseError {
            message: format!("Failed to run migrations: {e}"),
        })?;

    info!(pool_size, "Database ready");
    Ok(pool)
}

pub async fn begin_transaction(pool: &SqlitePool) -> AppResult<Transaction<'_, Sqlite>> {
    pool.begin().await.map_err(|e| AppError::DatabaseError {
        message: format!("Failed to begin transaction: {e}"),
    })
}

pub async fn commit_transaction(tx: Transaction<'_, Sqlite>) -> AppResult<()> {
    tx.commit().await.map_err(|e| AppError::DatabaseError {
        message: format!("Failed to commit transaction: {e}"),
    })
}
