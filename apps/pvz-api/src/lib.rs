//! # PVZ API
//!
//! Service facade for the pickup-point reception ledger.
//!
//! ## Architecture
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                          PVZ Service                                    │
//! │                                                                         │
//! │  Transport ──► RequestContext ──► PvzService ──► pvz-db ──► SQLite     │
//! │  (resolves       (principal,        │                                   │
//! │   the caller)     deadline)         ▼                                   │
//! │                               pvz-core                                  │
//! │                               (authorize, validate, page)               │
//! │                                                                         │
//! │  ┌────────────────────┐  ┌────────────────────┐  ┌────────────────────┐│
//! │  │  Pickup points     │  │  Receptions        │  │  Products          ││
//! │  │                    │  │                    │  │                    ││
//! │  │ • create (mod)     │  │ • open (emp)       │  │ • add (emp)        ││
//! │  │ • list (any)       │  │ • close last (emp) │  │ • delete last (emp)││
//! │  │ • list all (any)   │  │                    │  │                    ││
//! │  │ • report (any)     │  │                    │  │                    ││
//! │  └────────────────────┘  └────────────────────┘  └────────────────────┘│
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Configuration
//! Environment variables:
//! - `PVZ_DB_PATH` - SQLite database file (default: `./pvz.db`)
//! - `PVZ_DB_MAX_CONNECTIONS` - pool size (default: 5)
//! - `PVZ_REQUEST_TIMEOUT_MS` - per-call deadline (default: 5000)
//! - `PVZ_BUSY_TIMEOUT_MS` - write-lock wait (default: 5000)
//! - `PVZ_ALLOWED_CITIES` - comma-separated, exactly three
//! - `RUST_LOG` - tracing filter (default: `info,pvz=debug,sqlx=warn`)

pub mod config;
pub mod context;
pub mod error;
pub mod service;
pub mod telemetry;

// Re-exports
pub use config::{ConfigError, ServiceConfig};
pub use context::RequestContext;
pub use error::{ApiError, ApiResult, ErrorCode};
pub use service::PvzService;
