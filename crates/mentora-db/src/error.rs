//! Database-specific error types and conversions.

use mentora_core::error::MentoraError;

/// Database-layer error type.
#[derive(Debug, thiserror::Error)]
pub enum DbError {
    #[error("SurrealDB error: {0}")]
    Surreal(#[from] surrealdb::Error),

    #[error("Cannot connect to {url}: {source}")]
    Connection {
        url: String,
        #[source]
        source: surrealdb::Error,
    },

    #[error("Migration failed: {0}")]
    Migration(String),

    #[error("Query failed: {0}")]
    Query(String),

    #[error("Malformed row: {0}")]
    InvalidRow(String),

    #[error("Record not found: {entity} with id {id}")]
    NotFound { entity: String, id: String },

    #[error("Unique index violation on {key}")]
    UniqueViolation { key: String },
}

impl From<DbError> for MentoraError {
    fn from(err: DbError) -> Self {
        match err {
            DbError::NotFound { entity, id } => MentoraError::NotFound { entity, id },
            DbError::UniqueViolation { key } => MentoraError::Conflict { key },
            other => MentoraError::Database(other.to_string()),
        }
    }
}

/// SurrealDB reports unique index violations as
/// "Database index `...` already contains ...".
pub(crate) fn is_unique_violation(err: &surrealdb::Error) -> bool {
    err.to_string().contains("already contains")
}

/// Optimistic transaction conflicts are safe to re-run.
pub(crate) fn is_retryable(err: &surrealdb::Error) -> bool {
    let msg = err.to_string().to_lowercase();
    !is_unique_violation(err) && (msg.contains("conflict") || msg.contains("can be retried"))
}

/// Map a failed write, turning unique index violations on `key` into
/// [`DbError::UniqueViolation`].
pub(crate) fn classify_write_error(err: surrealdb::Error, key: &str) -> DbError {
    if is_unique_violation(&err) {
        DbError::UniqueViolation { key: key.to_string() }
    } else {
        DbError::Query(err.to_string())
    }
}
