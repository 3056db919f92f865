//! # Authorization Gate
//!
//! Maps a principal's role to the operations it may perform.
//!
//! ## Capability Table
//! ```text
//! ┌──────────────────────────────────┬────────────┬─────────────┐
//! │ Operation                        │  employee  │  moderator  │
//! ├──────────────────────────────────┼────────────┼─────────────┤
//! │ Create pickup point              │     ✗      │      ✓      │
//! │ List pickup points / reports     │     ✓      │      ✓      │
//! │ Open / close reception           │     ✓      │      ✗      │
//! │ Add / delete product             │     ✓      │      ✗      │
//! └──────────────────────────────────┴────────────┴─────────────┘
//! ```
//!
//! The gate is a pure policy check: no I/O, no panics. Callers run it
//! before opening a transaction so a denied call never reaches the store.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{AuthzError, ValidationError};

// =============================================================================
// Role
// =============================================================================

/// Closed set of roles a principal can hold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Works a pickup point: runs receptions and records products.
    Employee,
    /// Administers the pickup-point registry.
    Moderator,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Employee => "employee",
            Role::Moderator => "moderator",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Parses the role string produced by principal resolution.
impl FromStr for Role {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "employee" => Ok(Role::Employee),
            "moderator" => Ok(Role::Moderator),
            _ => Err(ValidationError::NotAllowed {
                field: "role".to_string(),
                allowed: vec!["employee".to_string(), "moderator".to_string()],
            }),
        }
    }
}

// =============================================================================
// Principal
// =============================================================================

/// The authenticated caller, resolved by the surrounding transport.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Principal {
    pub id: Uuid,
    pub role: Role,
}

impl Principal {
    pub fn new(id: Uuid, role: Role) -> Self {
        Principal { id, role }
    }

    /// Builds a principal from an already-resolved `(id, role string)` pair.
    pub fn from_parts(id: Uuid, role: &str) -> Result<Self, ValidationError> {
        Ok(Principal {
            id,
            role: role.parse()?,
        })
    }
}

// =============================================================================
// Operation
// =============================================================================

/// Every operation the service exposes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    CreatePickupPoint,
    ListPickupPoints,
    ListReport,
    OpenReception,
    CloseReception,
    AddProduct,
    DeleteProduct,
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let phrase = match self {
            Operation::CreatePickupPoint => "create a pickup point",
            Operation::ListPickupPoints => "list pickup points",
            Operation::ListReport => "list the reception report",
            Operation::OpenReception => "open a reception",
            Operation::CloseReception => "close a reception",
            Operation::AddProduct => "add a product",
            Operation::DeleteProduct => "delete a product",
        };
        f.write_str(phrase)
    }
}

// =============================================================================
// Gate
// =============================================================================

/// Returns whether `role` may perform `operation`.
pub fn is_permitted(role: Role, operation: Operation) -> bool {
    match (role, operation) {
        (_, Operation::ListPickupPoints | Operation::ListReport) => true,
        (Role::Moderator, Operation::CreatePickupPoint) => true,
        (Role::Employee, Operation::CreatePickupPoint) => false,
        (
            Role::Employee,
            Operation::OpenReception
            | Operation::CloseReception
            | Operation::AddProduct
            | Operation::DeleteProduct,
        ) => true,
        (
            Role::Moderator,
            Operation::OpenReception
            | Operation::CloseReception
            | Operation::AddProduct
            | Operation::DeleteProduct,
        ) => false,
    }
}

/// Authorizes `principal` for `operation`.
///
/// ## Example
/// ```rust
/// use pvz_core::authz::{authorize, Operation, Principal, Role};
///
/// let employee = Principal::new(uuid::Uuid::new_v4(), Role::Employee);
/// assert!(authorize(&employee, Operation::AddProduct).is_ok());
/// assert!(authorize(&employee, Operation::CreatePickupPoint).is_err());
/// ```
pub fn authorize(principal: &Principal, operation: Operation) -> Result<(), AuthzError> {
    if is_permitted(principal.role, operation) {
        Ok(())
    } else {
        Err(AuthzError::Forbidden {
            role: principal.role,
            operation,
        })
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
