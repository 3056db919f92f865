//! # Database Error Types
//!
//! Error types for store operations.
//!
//! ## Error Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Error Propagation                                    │
//! │                                                                         │
//! │  SQLite Error (sqlx::Error)                                            │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  DbError (this module) ← Classified where it happens:                  │
//! │       │                  NotFound / Conflict come from ledger lookups, │
//! │       │                  the rest from From<sqlx::Error>               │
//! │       ▼                                                                 │
//! │  ApiError (pvz-api) ← NOT_FOUND / CONFLICT / STORE_ERROR               │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use thiserror::Error;

/// Store operation errors.
#[derive(Debug, Error)]
pub enum DbError {
    /// No row to act on.
    ///
    /// ## When This Occurs
    /// - Pickup point id doesn't exist
    /// - Closing or trimming a pickup point with no open reception
    /// - Deleting from an open reception that has no products
    #[error("{entity} not found: {id}")]
    NotFound { entity: String, id: String },

    /// The operation would break a ledger invariant.
    ///
    /// ## When This Occurs
    /// - Opening a reception while one is already open
    /// - Appending a product when no reception is open
    #[error("Conflict: {reason}")]
    Conflict { reason: String },

    /// Unique constraint violation.
    ///
    /// ## When This Occurs
    /// - The one-open-reception index rejected an insert
    /// - A generated id collided (practically never)
    #[error("Duplicate {field}: '{value}' already exists")]
    UniqueViolation { field: String, value: String },

    /// Foreign key constraint violation.
    #[error("Foreign key violation: {message}")]
    ForeignKeyViolation { message: String },

    /// Database connection failed.
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    /// Migration failed.
    #[error("Migration failed: {0}")]
    MigrationFailed(String),

    /// Query execution failed.
    #[error("Query failed: {0}")]
    QueryFailed(String),

    /// Transaction failed (begin, commit, or the write lock could not be taken).
    #[error("Transaction failed: {0}")]
    TransactionFailed(String),

    /// Pool exhausted (all connections in use).
    #[error("Connection pool exhausted")]
    PoolExhausted,

    /// The caller's deadline expired; the transaction was rolled back.
    #[error("Operation timed out after {millis} ms")]
    Timeout { millis: u128 },

    /// Internal database error.
    #[error("Internal database error: {0}")]
    Internal(String),
}

impl DbError {
    /// Creates a NotFound error for a given entity type and ID.
    pub fn not_found(entity: impl Into<String>, id: impl ToString) -> Self {
        DbError::NotFound {
            entity: entity.into(),
            id: id.to_string(),
        }
    }

    /// Creates a Conflict error.
    pub fn conflict(reason: impl Into<String>) -> Self {
        DbError::Conflict {
            reason: reason.into(),
        }
    }

    /// Wraps a failure at a transaction boundary with what was being attempted.
    pub(crate) fn transaction(context: &str, err: sqlx::Error) -> Self {
        match DbError::from(err) {
            DbError::QueryFailed(msg) | DbError::Internal(msg) => {
                DbError::TransactionFailed(format!("{}: {}", context, msg))
            }
            other => other,
        }
    }
}

/// Convert sqlx errors to DbError.
///
/// ## Error Mapping
/// ```text
/// sqlx::Error::RowNotFound    → DbError::NotFound
/// sqlx::Error::Database       → constraint kind, busy/locked, or QueryFailed
/// sqlx::Error::PoolTimedOut   → DbError::PoolExhausted
/// Other                       → DbError::Internal
/// ```
impl From<sqlx::Error> for DbError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => DbError::NotFound {
                entity: "Record".to_string(),
                id: "unknown".to_string(),
            },

            sqlx::Error::Database(db_err) => {
                let msg = db_err.message();

                if db_err.is_unique_violation() {
                    // "UNIQUE constraint failed: <table>.<column>"
                    let field = msg
                        .split("UNIQUE constraint failed: ")
                        .nth(1)
                        .unwrap_or("unknown")
                        .to_string();
                    DbError::UniqueViolation {
                        field,
                        value: "unknown".to_string(),
                    }
                } else if db_err.is_foreign_key_violation() {
                    DbError::ForeignKeyViolation {
                        message: msg.to_string(),
                    }
                } else if is_lock_contention(db_err.code().as_deref()) {
                    DbError::TransactionFailed(msg.to_string())
                } else {
                    DbError::QueryFailed(msg.to_string())
                }
            }

            sqlx::Error::PoolTimedOut => DbError::PoolExhausted,

            sqlx::Error::PoolClosed => DbError::ConnectionFailed("Pool is closed".to_string()),

            _ => DbError::Internal(err.to_string()),
        }
    }
}

/// SQLITE_BUSY (5) or SQLITE_LOCKED (6), including their extended codes.
fn is_lock_contention(code: Option<&str>) -> bool {
    const SQLITE_BUSY: i32 = 5;
    const SQLITE_LOCKED: i32 = 6;

    code.and_then(|c| c.parse::<i32>().ok())
        .map(|c| c & 0xff)
        .is_some_and(|primary| primary == SQLITE_BUSY || primary == SQLITE_LOCKED)
}

impl From<sqlx::migrate::MigrateError> for DbError {
    fn from(err: sqlx::migrate::MigrateError) -> Self {
        DbError::MigrationFailed(err.to_string())
    }
}

/// Result type for database operations.
pub type DbResult<T> = Result<T, DbError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_row_not_found_maps_to_not_found() {
        let err: DbError = sqlx::Error::RowNotFound.into();
        assert!(matches!(err, DbError::NotFound { .. }));
    }

    #[test]
    fn test_pool_errors() {
        assert!(matches!(
            DbError::from(sqlx::Error::PoolTimedOut),
            DbError::PoolExhausted
        ));
        assert!(matches!(
            DbError::from(sqlx::Error::PoolClosed),
            DbError::ConnectionFailed(_)
        ));
    }

    #[test]
    fn test_transaction_context_wraps_generic_failures() {
        let err = DbError::transaction("commit reception", sqlx::Error::WorkerCrashed);
        match err {
            DbError::TransactionFailed(msg) => assert!(msg.starts_with("commit reception")),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_lock_contention_codes() {
        assert!(is_lock_contention(Some("5")));
        assert!(is_lock_contention(Some("6")));
        // SQLITE_BUSY_SNAPSHOT, SQLITE_LOCKED_SHAREDCACHE
        assert!(is_lock_contention(Some("517")));
        assert!(is_lock_contention(Some("262")));

        assert!(!is_lock_contention(Some("2067")));
        assert!(!is_lock_contention(Some("1")));
        assert!(!is_lock_contention(Some("not-a-code")));
        assert!(!is_lock_contention(None));
    }

    #[tokio::test]
    async fn test_held_write_lock_is_a_transaction_failure() {
        use crate::pool::{Database, DbConfig};
        use std::time::Duration;

        let path = std::env::temp_dir().join(format!("pvz-lock-{}.db", uuid::Uuid::new_v4()));
        let db = Database::new(
            DbConfig::new(&path)
                .max_connections(2)
                .busy_timeout(Duration::from_millis(50)),
        )
        .await
        .unwrap();
        let pvz = db.pickup_points().create("Moscow").await.unwrap();

        // Make sure both connections exist before one of them takes the lock.
        let warm = db.pool().acquire().await.unwrap();
        let mut holder = db.pool().acquire().await.unwrap();
        drop(warm);

        sqlx::query("BEGIN IMMEDIATE")
            .execute(&mut *holder)
            .await
            .unwrap();

        let err = db.receptions().open(pvz.id).await.unwrap_err();
        assert!(matches!(err, DbError::TransactionFailed(_)), "got {err:?}");

        sqlx::query("ROLLBACK").execute(&mut *holder).await.unwrap();
        drop(holder);
        db.close().await;

        for suffix in ["", "-wal", "-shm"] {
            let mut file = path.clone().into_os_string();
            file.push(suffix);
            let _ = std::fs::remove_file(file);
        }
    }

    #[test]
    fn test_messages() {
        assert_eq!(
            DbError::not_found("Pickup point", "abc").to_string(),
            "Pickup point not found: abc"
        );
        assert_eq!(
            DbError::conflict("active reception already exists").to_string(),
            "Conflict: active reception already exists"
        );
        assert_eq!(
            DbError::Timeout { millis: 250 }.to_string(),
            "Operation timed out after 250 ms"
        );
    }
}
