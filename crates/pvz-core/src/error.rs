//! # Error Types
//!
//! Domain-specific error types for pvz-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  pvz-core errors (this file)                                           │
//! │  ├── CoreError        - Umbrella for domain failures                   │
//! │  ├── ValidationError  - Malformed input (city, id, role, type, dates)  │
//! │  └── AuthzError       - Role lacks the capability                      │
//! │                                                                         │
//! │  pvz-db errors (separate crate)                                        │
//! │  └── DbError          - Store failures, conflicts, missing rows        │
//! │                                                                         │
//! │  pvz-api errors                                                        │
//! │  └── ApiError         - What callers see (code + message)              │
//! │                                                                         │
//! │  Flow: ValidationError/AuthzError → CoreError ─┐                       │
//! │                                   DbError ─────┴─► ApiError            │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use thiserror::Error;

use crate::authz::{Operation, Role};

// =============================================================================
// Core Error
// =============================================================================

/// Domain failures raised before the store is touched.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Input did not pass validation.
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    /// The principal's role may not perform the operation.
    #[error("{0}")]
    Forbidden(#[from] AuthzError),
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
///
/// These are never retried; they surface as client errors.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// Field value is too long.
    #[error("{field} must be at most {max} characters")]
    TooLong { field: String, max: usize },

    /// Invalid format (e.g., invalid UUID, invalid date).
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },

    /// Value is not in allowed set.
    #[error("{field} must be one of: {allowed:?}")]
    NotAllowed { field: String, allowed: Vec<String> },

    /// A start bound lies after its end bound.
    #[error("{start_field} must not be after {end_field}")]
    InvertedRange {
        start_field: String,
        end_field: String,
    },
}

// =============================================================================
// Authorization Error
// =============================================================================

/// Raised by [`crate::authz::authorize`] when a role lacks a capability.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AuthzError {
    #[error("access denied: role '{role}' may not {operation}")]
    Forbidden { role: Role, operation: Operation },
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_error_messages() {
        let err = ValidationError::Required {
            field: "type".to_string(),
        };
        assert_eq!(err.to_string(), "type is required");

        let err = ValidationError::TooLong {
            field: "type".to_string(),
            max: 100,
        };
        assert_eq!(err.to_string(), "type must be at most 100 characters");
    }

    #[test]
    fn test_forbidden_message_names_role_and_operation() {
        let err = AuthzError::Forbidden {
            role: Role::Moderator,
            operation: Operation::AddProduct,
        };
        assert_eq!(
            err.to_string(),
            "access denied: role 'moderator' may not add a product"
        );
    }

    #[test]
    fn test_conversions_into_core_error() {
        let core_err: CoreError = ValidationError::Required {
            field: "city".to_string(),
        }
        .into();
        assert!(matches!(core_err, CoreError::Validation(_)));

        let core_err: CoreError = AuthzError::Forbidden {
            role: Role::Employee,
            operation: Operation::CreatePickupPoint,
        }
        .into();
        assert!(matches!(core_err, CoreError::Forbidden(_)));
    }
}
