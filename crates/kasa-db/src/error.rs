//! Database error types.

use thiserror::Error;

/// Errors produced by the persistence layer.
#[derive(Debug, Error)]
pub enum DbError {
    #[error("record not found: {entity} with id {id}")]
    NotFound { entity: &'static str, id: String },

    #[error("unique constraint violation: {0}")]
    UniqueViolation(String),

    #[error("foreign key constraint violation: {0}")]
    ForeignKeyViolation(String),

    #[error("record is immutable: {entity} {id} has status {status}")]
    ImmutableRecord {
        entity: &'static str,
        id: String,
        status: String,
    },

    #[error("database connection failed: {0}")]
    ConnectionFailed(String),

    #[error("migration failed: {0}")]
    MigrationFailed(String),

    #[error("query failed: {0}")]
    QueryFailed(String),

    #[error("transaction failed: {0}")]
    TransactionFailed(String),

    #[error("connection pool exhausted")]
    PoolExhausted,

    #[error("internal database error: {0}")]
    Internal(String),
}

impl From<sqlx::Error> for DbError {
    fn from(err: sqlx::Error) -> Self {
        match &err {
            sqlx::Error::RowNotFound => DbError::NotFound {
                entity: "record",
                id: String::new(),
            },
            sqlx::Error::PoolTimedOut => DbError::PoolExhausted,
            sqlx::Error::Database(db_err) => {
                let message = db_err.message().to_string();
                if message.contains("UNIQUE constraint failed") {
                    DbError::UniqueViolation(message)
                } else if message.contains("FOREIGN KEY constraint failed") {
                    DbError::ForeignKeyViolation(message)
                } else {
                    DbError::QueryFailed(message)
                }
            }
            sqlx::Error::Io(_) | sqlx::Error::Tls(_) => {
                DbError::ConnectionFailed(err.to_string())
            }
            _ => DbError::Internal(err.to_string()),
        }
    }
}

impl From<sqlx::migrate::MigrateError> for DbError {
    fn from(err: sqlx::migrate::MigrateError) -> Self {
        DbError::MigrationFailed(err.to_string())
    }
}

/// Convenience alias for database results.
pub type DbResult<T> = Result<T, DbError>;
