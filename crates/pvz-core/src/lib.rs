//! # pvz-core: Pure Domain Logic for the PVZ Ledger
//!
//! Types and rules shared by the store layer and the service façade.
//! Nothing in this crate performs I/O.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        PVZ Ledger Architecture                          │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │             Transport (HTTP / RPC, outside this repo)           │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │ Principal + arguments                  │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                    pvz-api (PvzService)                         │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               ★ pvz-core (THIS CRATE) ★                         │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────┐  ┌───────────┐  ┌───────────┐  ┌───────────┐  │   │
//! │  │   │   types   │  │   authz   │  │ validation│  │  paging   │  │   │
//! │  │   │ PickupPt  │  │   Role    │  │  cities   │  │   Page    │  │   │
//! │  │   │ Reception │  │ Principal │  │  ids      │  │           │  │   │
//! │  │   │ Product   │  │ authorize │  │  windows  │  │           │  │   │
//! │  │   └───────────┘  └───────────┘  └───────────┘  └───────────┘  │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                    pvz-db (Store Layer)                         │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Records (PickupPoint, Reception, Product) and report shapes
//! - [`authz`] - Roles, principals and the capability table
//! - [`validation`] - Input validation (cities, ids, product types, date windows)
//! - [`paging`] - Page/limit resolution
//! - [`error`] - Domain error types
//!
//! ## Example Usage
//!
//! ```rust
//! use pvz_core::authz::{authorize, Operation, Principal, Role};
//!
//! let moderator = Principal::new(uuid::Uuid::new_v4(), Role::Moderator);
//! assert!(authorize(&moderator, Operation::CreatePickupPoint).is_ok());
//! assert!(authorize(&moderator, Operation::OpenReception).is_err());
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod authz;
pub mod error;
pub mod paging;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use authz::{authorize, Operation, Principal, Role};
pub use error::{AuthzError, CoreError, ValidationError};
pub use paging::Page;
pub use types::*;
pub use validation::AllowedCities;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Cities a pickup point may be registered in when nothing else is configured.
pub const DEFAULT_ALLOWED_CITIES: [&str; 3] = ["Moscow", "Saint Petersburg", "Kazan"];

/// Page number used when the caller supplies none (or an invalid one).
pub const DEFAULT_PAGE: i64 = 1;

/// Page size used when the caller supplies none (or one out of range).
pub const DEFAULT_LIMIT: i64 = 10;

/// Largest page size a caller may ask for.
pub const MAX_LIMIT: i64 = 30;

/// Longest accepted product type, in characters.
pub const MAX_PRODUCT_TYPE_LEN: usize = 100;
