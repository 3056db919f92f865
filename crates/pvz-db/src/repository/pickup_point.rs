//! # Pickup Point Repository
//!
//! The registry of pickup points. Rows are immutable once written; the only
//! write besides `create` is the ledger's lock statement, which changes
//! nothing.
//!
//! City validation happens before this layer (see
//! [`AllowedCities`](pvz_core::AllowedCities)); `create` stores what it is
//! given.

use chrono::Utc;
use sqlx::SqlitePool;
use tracing::{debug, info};
use uuid::Uuid;

use super::PICKUP_POINT_COLUMNS;
use crate::error::{DbError, DbResult};
use pvz_core::{Page, PickupPoint};

/// Repository for pickup point operations.
#[derive(Debug, Clone)]
pub struct PickupPointRepository {
    pool: SqlitePool,
}

impl PickupPointRepository {
    /// Creates a new PickupPointRepository.
    pub fn new(pool: SqlitePool) -> Self {
        PickupPointRepository { pool }
    }

    /// Registers a pickup point in an already-validated city.
    ///
    /// Assigns a fresh id and the current time as registration date.
    pub async fn create(&self, city: &str) -> DbResult<PickupPoint> {
        let pickup_point = PickupPoint {
            id: Uuid::new_v4(),
            registration_date: Utc::now(),
            city: city.to_string(),
        };

        sqlx::query(
            "INSERT INTO pickup_points (id, registration_date, city) VALUES (?1, ?2, ?3)",
        )
        .bind(pickup_point.id)
        .bind(pickup_point.registration_date)
        .bind(&pickup_point.city)
        .execute(&self.pool)
        .await?;

        info!(pvz_id = %pickup_point.id, city = %pickup_point.city, "Pickup point registered");

        Ok(pickup_point)
    }

    /// One page of pickup points, most recently registered first.
    pub async fn list(&self, page: Page) -> DbResult<Vec<PickupPoint>> {
        debug!(page = page.page(), limit = page.limit(), "Listing pickup points");

        let sql = format!(
            "SELECT {PICKUP_POINT_COLUMNS} FROM pickup_points \
             ORDER BY registration_date DESC, seq DESC \
             LIMIT ?1 OFFSET ?2"
        );

        let pickup_points = sqlx::query_as::<_, PickupPoint>(&sql)
            .bind(page.limit())
            .bind(page.offset())
            .fetch_all(&self.pool)
            .await?;

        Ok(pickup_points)
    }

    /// Every pickup point, most recently registered first.
    pub async fn list_all(&self) -> DbResult<Vec<PickupPoint>> {
        debug!("Listing all pickup points");

        let sql = format!(
            "SELECT {PICKUP_POINT_COLUMNS} FROM pickup_points \
             ORDER BY registration_date DESC, seq DESC"
        );

        let pickup_points = sqlx::query_as::<_, PickupPoint>(&sql)
            .fetch_all(&self.pool)
            .await?;

        Ok(pickup_points)
    }

    /// Gets a pickup point by ID.
    pub async fn get_by_id(&self, id: Uuid) -> DbResult<Option<PickupPoint>> {
        let sql = format!("SELECT {PICKUP_POINT_COLUMNS} FROM pickup_points WHERE id = ?1");

        let pickup_point = sqlx::query_as::<_, PickupPoint>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(pickup_point)
    }

    /// Gets a pickup point by ID, failing with `NotFound` when absent.
    pub async fn get(&self, id: Uuid) -> DbResult<PickupPoint> {
        self.get_by_id(id)
            .await?
            .ok_or_else(|| DbError::not_found("Pickup point", id))
    }

    /// Number of registered pickup points.
    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM pickup_points")
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
