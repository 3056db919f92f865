//! # pvz-db: Store Layer for the PVZ Ledger
//!
//! SQLite storage through sqlx: the connection pool, embedded migrations, and
//! one repository per concern.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        PVZ Ledger Data Flow                             │
//! │                                                                         │
//! │  PvzService::open_reception(ctx, pvz_id)                               │
//! │       │  authorize + validate (pvz-core)                               │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                     pvz-db (THIS CRATE)                         │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────────┐    ┌────────────────┐    ┌──────────────┐  │   │
//! │  │   │   Database    │    │  Repositories  │    │  Migrations  │  │   │
//! │  │   │   (pool.rs)   │    │                │    │  (embedded)  │  │   │
//! │  │   │               │    │ PickupPoint    │    │              │  │   │
//! │  │   │ SqlitePool    │◄───│ Reception      │    │ 001_initial  │  │   │
//! │  │   │ busy_timeout  │    │ Product        │    │  _schema.sql │  │   │
//! │  │   │               │    │ Report         │    │              │  │   │
//! │  │   └───────────────┘    └────────────────┘    └──────────────┘  │   │
//! │  │                                                                 │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  SQLite database file (PVZ_DB_PATH)                                    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//!
//! - [`pool`] - Connection pool creation and configuration
//! - [`migrations`] - Embedded database migrations
//! - [`error`] - Database error types
//! - [`repository`] - Registry, ledgers and report
//!
//! ## Usage
//!
//! ```rust,ignore
//! use pvz_db::{Database, DbConfig};
//!
//! let db = Database::new(DbConfig::new("pvz.db")).await?;
//!
//! let pvz = db.pickup_points().create("Kazan").await?;
//! db.receptions().open(pvz.id).await?;
//! db.products().add(pvz.id, "electronics").await?;
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod migrations;
pub mod pool;
pub mod repository;

// =============================================================================
// Re-exports
// =============================================================================

pub use error::{DbError, DbResult};
pub use pool::{Database, DbConfig};

// Repository re-exports for convenience
pub use repository::pickup_point::PickupPointRepository;
pub use repository::product::ProductRepository;
pub use repository::reception::ReceptionRepository;
pub use repository::report::ReportRepository;
