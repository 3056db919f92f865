//! # Domain Types
//!
//! Records owned by the ledger and the shapes the report assembler builds.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │  PickupPoint    │   │   Reception     │   │    Product      │       │
//! │  │  ─────────────  │1 N│  ─────────────  │1 N│  ─────────────  │       │
//! │  │  id (UUID)      │──►│  id (UUID)      │──►│  id (UUID)      │       │
//! │  │  registration.. │   │  date_time      │   │  date_time      │       │
//! │  │  city           │   │  pvz_id (FK)    │   │  type           │       │
//! │  └─────────────────┘   │  status         │   │  reception_id   │       │
//! │                        └─────────────────┘   └─────────────────┘       │
//! │                                                                         │
//! │  ReceptionStatus: InProgress ──close──► Close (terminal)               │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Field names serialize in camelCase (`registrationDate`, `dateTime`,
//! `pvzId`, `receptionId`); the product category serializes as `type`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// =============================================================================
// Pickup Point
// =============================================================================

/// A registered pickup point. Immutable once created.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[serde(rename_all = "camelCase")]
pub struct PickupPoint {
    pub id: Uuid,

    /// Server-assigned at creation.
    pub registration_date: DateTime<Utc>,

    /// One of the configured allowed cities.
    pub city: String,
}

// =============================================================================
// Reception Status
// =============================================================================

/// Lifecycle state of a reception.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "snake_case"))]
#[serde(rename_all = "snake_case")]
pub enum ReceptionStatus {
    /// Products may be appended and removed.
    InProgress,
    /// Terminal; the reception never reopens.
    Close,
}

impl ReceptionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReceptionStatus::InProgress => "in_progress",
            ReceptionStatus::Close => "close",
        }
    }

    #[inline]
    pub fn is_open(&self) -> bool {
        matches!(self, ReceptionStatus::InProgress)
    }
}

impl Default for ReceptionStatus {
    fn default() -> Self {
        ReceptionStatus::InProgress
    }
}

// =============================================================================
// Reception
// =============================================================================

/// A goods-receiving session at a pickup point.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[serde(rename_all = "camelCase")]
pub struct Reception {
    pub id: Uuid,

    /// When the reception was opened.
    pub date_time: DateTime<Utc>,

    pub pvz_id: Uuid,

    pub status: ReceptionStatus,
}

// =============================================================================
// Product
// =============================================================================

/// A single line item recorded within a reception.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: Uuid,

    /// When the product was appended.
    pub date_time: DateTime<Utc>,

    /// Free-form category, e.g. "electronics".
    #[serde(rename = "type")]
    #[cfg_attr(feature = "sqlx", sqlx(rename = "type"))]
    pub product_type: String,

    pub reception_id: Uuid,
}

// =============================================================================
// Report Shapes
// =============================================================================

/// A reception together with its products in insertion order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReceptionReport {
    pub reception: Reception,
    pub products: Vec<Product>,
}

/// A pickup point together with its receptions, newest first.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PickupPointReport {
    pub pvz: PickupPoint,
    pub receptions: Vec<ReceptionReport>,
}

// =============================================================================
// Unit Tests
// =============================================================================
