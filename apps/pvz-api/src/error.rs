//! # API Error Type
//!
//! The one error type service callers see.
//!
//! ## Error Handling Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Error Flow in the PVZ Service                        │
//! │                                                                         │
//! │  PvzService::add_product(ctx, pvz_id, type)                            │
//! │         │                                                               │
//! │         ▼                                                               │
//! │  Role may not? ──── AuthzError ─────────────► FORBIDDEN        (403)   │
//! │         │                                                               │
//! │         ▼                                                               │
//! │  Bad id / type? ─── ValidationError ────────► VALIDATION_ERROR (400)   │
//! │         │                                                               │
//! │         ▼                                                               │
//! │  Store says no? ─── DbError::Conflict ──────► CONFLICT         (409)   │
//! │         │           DbError::NotFound ──────► NOT_FOUND        (404)   │
//! │         │                                                               │
//! │         ▼                                                               │
//! │  Store broke? ───── DbError::* / timeout ───► STORE_ERROR      (500)   │
//! │                     (detail logged, message generic)                   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use serde::Serialize;

use pvz_core::CoreError;
use pvz_db::DbError;

/// Error returned from every [`PvzService`](crate::PvzService) operation.
///
/// ## Serialization
/// ```json
/// {
///   "code": "CONFLICT",
///   "message": "active reception already exists"
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiError {
    /// Machine-readable error code for programmatic handling
    pub code: ErrorCode,

    /// Human-readable error message
    pub message: String,
}

/// Error codes for API responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    /// Malformed input (400)
    ValidationError,

    /// Role lacks the capability (403)
    Forbidden,

    /// Would break a ledger invariant (409)
    Conflict,

    /// Nothing to act on (404)
    NotFound,

    /// Store failure or timeout, rolled back (500)
    StoreError,
}

impl ErrorCode {
    /// Suggested HTTP status for transports that speak HTTP.
    pub fn status_code(&self) -> u16 {
        match self {
            ErrorCode::ValidationError => 400,
            ErrorCode::Forbidden => 403,
            ErrorCode::NotFound => 404,
            ErrorCode::Conflict => 409,
            ErrorCode::StoreError => 500,
        }
    }

    /// Whether the caller, not the server, is at fault.
    pub fn is_client_error(&self) -> bool {
        !matches!(self, ErrorCode::StoreError)
    }
}

impl ApiError {
    /// Creates a new API error.
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        ApiError {
            code,
            message: message.into(),
        }
    }

    /// Creates a validation error.
    pub fn validation(message: impl Into<String>) -> Self {
        ApiError::new(ErrorCode::ValidationError, message)
    }

    /// Creates a store error.
    pub fn store(message: impl Into<String>) -> Self {
        ApiError::new(ErrorCode::StoreError, message)
    }

    /// Suggested HTTP status.
    pub fn status_code(&self) -> u16 {
        self.code.status_code()
    }
}

/// Converts database errors to API errors.
impl From<DbError> for ApiError {
    fn from(err: DbError) -> Self {
        match err {
            DbError::NotFound { entity, id } => ApiError::new(
                ErrorCode::NotFound,
                format!("{} not found: {}", entity, id),
            ),
            DbError::Conflict { reason } => ApiError::new(ErrorCode::Conflict, reason),
            DbError::UniqueViolation { field, value } => ApiError::new(
                ErrorCode::Conflict,
                format!("{} '{}' already exists", field, value),
            ),
            DbError::ForeignKeyViolation { message } => {
                tracing::error!("Foreign key violation: {}", message);
                ApiError::store("Database operation failed")
            }
            DbError::ConnectionFailed(e) => {
                tracing::error!("Database connection failed: {}", e);
                ApiError::store("Database connection failed")
            }
            DbError::MigrationFailed(e) => {
                tracing::error!("Database migration failed: {}", e);
                ApiError::store("Database migration failed")
            }
            DbError::QueryFailed(e) => {
                // Log the actual error but return a generic message
                tracing::error!("Database query failed: {}", e);
                ApiError::store("Database operation failed")
            }
            DbError::TransactionFailed(e) => {
                tracing::error!("Transaction failed: {}", e);
                ApiError::store("Database transaction failed")
            }
            DbError::PoolExhausted => {
                tracing::error!("Database pool exhausted");
                ApiError::store("Database pool exhausted")
            }
            DbError::Timeout { millis } => {
                tracing::error!(millis = %millis, "Operation timed out");
                ApiError::store("Operation timed out")
            }
            DbError::Internal(e) => {
                tracing::error!("Internal database error: {}", e);
                ApiError::store("Database operation failed")
            }
        }
    }
}

/// Converts core errors to API errors.
impl From<CoreError> for ApiError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::Validation(e) => ApiError::validation(e.to_string()),
            CoreError::Forbidden(e) => ApiError::new(ErrorCode::Forbidden, e.to_string()),
        }
    }
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{:?}] {}", self.code, self.message)
    }
}

impl std::error::Error for ApiError {}

/// Result type for service operations.
pub type ApiResult<T> = Result<T, ApiError>;
