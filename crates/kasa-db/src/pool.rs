//! Connection pool management for SQLite.

use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions, SqliteSynchronous};
use sqlx::SqlitePool;
use tracing::info;

use crate::error::{DbError, DbResult};
use crate::migrations;
use crate::repository::TransactionRepository;

/// Database configuration.
#[derive(Debug, Clone)]
pub struct DbConfig {
    /// Path to the SQLite database file, or `None` for in-memory.
    pub path: Option<PathBuf>,
    /// Maximum number of pooled connections.
    pub max_connections: u32,
    /// Minimum number of idle connections to keep open.
    pub min_connections: u32,
    /// How long to wait for a connection before giving up.
    pub connect_timeout: Duration,
    /// Whether to run pending migrations on startup.
    pub run_migrations: bool,
}

impl Default for DbConfig {
    fn default() -> Self {
        Self {
            path: Some(PathBuf::from("kasa.db")),
            max_connections: 5,
            min_connections: 1,
            connect_timeout: Duration::from_secs(5),
            run_migrations: true,
        }
    }
}

impl DbConfig {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: Some(path.into()),
            ..Default::default()
        }
    }

    /// In-memory database, used by tests.
    pub fn in_memory() -> Self {
        Self {
            path: None,
            max_connections: 1,
            min_connections: 1,
            ..Default::default()
        }
    }

    pub fn max_connections(mut self, n: u32) -> Self {
        self.max_connections = n;
        self
    }

    pub fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }
}

/// Handle to the local store. Owns the pool; repositories borrow it
/// through cheap clones.
#[derive(Debug, Clone)]
pub struct Database {
    pool: SqlitePool,
}

impl Database {
    /// Open (and create if missing) the database described by `config`.
    pub async fn new(config: DbConfig) -> DbResult<Self> {
        let options = match &config.path {
            Some(path) => SqliteConnectOptions::new()
                .filename(path)
                .create_if_missing(true),
            None => SqliteConnectOptions::from_str("sqlite::memory:")
                .map_err(|e| DbError::ConnectionFailed(e.to_string()))?,
        }
        .journal_mode(SqliteJournalMode::Wal)
        .synchronous(SqliteSynchronous::Normal)
        .foreign_keys(true);

        let pool = SqlitePoolOptions::new()
            .max_connections(config.max_connections)
            .min_connections(config.min_connections)
            .acquire_timeout(config.connect_timeout)
            .connect_with(options)
            .await
            .map_err(|e| DbError::ConnectionFailed(e.to_string()))?;

        if config.run_migrations {
            migrations::run(&pool).await?;
        }

        info!(
            path = ?config.path,
            max_connections = config.max_connections,
            "database ready"
        );

        Ok(Self { pool })
    }

    /// Raw pool access for callers that need it.
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Repository for the transaction tables.
    pub fn transactions(&self) -> TransactionRepository {
        TransactionRepository::new(self.pool.clone())
    }

    /// Cheap liveness probe.
    pub async fn health_check(&self) -> DbResult<()> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }

    pub async fn close(&self) {
        self.pool.close().await;
    }
}
