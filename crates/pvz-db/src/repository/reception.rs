//! # Reception Repository
//!
//! The reception state machine.
//!
//! ## Reception Lifecycle
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Reception Lifecycle                                │
//! │                                                                         │
//! │  open(pvz_id)                                                          │
//! │  └── no open reception? ──► Reception { status: in_progress }          │
//! │      open one exists?   ──► Conflict, nothing written                  │
//! │                                                                         │
//! │        in_progress ── products appended / removed (ProductRepository)  │
//! │             │                                                           │
//! │             ▼                                                           │
//! │  close_last(pvz_id)                                                    │
//! │  └── Reception { status: close }       (terminal, never reopened)      │
//! │      none open? ──► NotFound, nothing written                          │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::Utc;
use sqlx::SqlitePool;
use tracing::{debug, info, warn};
use uuid::Uuid;

use super::{find_open_reception, lock_pickup_point, reject, RECEPTION_COLUMNS};
use crate::error::{DbError, DbResult};
use pvz_core::{Reception, ReceptionStatus};

pub(crate) const ACTIVE_RECEPTION_EXISTS: &str = "active reception already exists";

/// Repository for reception operations.
#[derive(Debug, Clone)]
pub struct ReceptionRepository {
    pool: SqlitePool,
}

impl ReceptionRepository {
    /// Creates a new ReceptionRepository.
    pub fn new(pool: SqlitePool) -> Self {
        ReceptionRepository { pool }
    }

    /// Opens a new reception at a pickup point.
    ///
    /// ## Errors
    /// - `NotFound` if the pickup point doesn't exist
    /// - `Conflict` if the pickup point already has an open reception
    pub async fn open(&self, pvz_id: Uuid) -> DbResult<Reception> {
        debug!(pvz_id = %pvz_id, "Opening reception");

        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| DbError::transaction("begin open reception", e))?;

        lock_pickup_point(&mut tx, pvz_id).await?;

        let open: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM receptions WHERE pvz_id = ?1 AND status = 'in_progress'",
        )
        .bind(pvz_id)
        .fetch_one(&mut *tx)
        .await?;

        if open > 0 {
            warn!(pvz_id = %pvz_id, "Reception already open");
            return reject(
                tx,
                "rollback open reception",
                DbError::conflict(ACTIVE_RECEPTION_EXISTS),
            )
            .await;
        }

        let reception = Reception {
            id: Uuid::new_v4(),
            date_time: Utc::now(),
            pvz_id,
            status: ReceptionStatus::InProgress,
        };

        sqlx::query(
            "INSERT INTO receptions (id, date_time, pvz_id, status) VALUES (?1, ?2, ?3, ?4)",
        )
        .bind(reception.id)
        .bind(reception.date_time)
        .bind(reception.pvz_id)
        .bind(reception.status)
        .execute(&mut *tx)
        .await
        .map_err(|e| match DbError::from(e) {
            // uq_receptions_open_per_pvz
            DbError::UniqueViolation { .. } => DbError::conflict(ACTIVE_RECEPTION_EXISTS),
            other => other,
        })?;

        tx.commit()
            .await
            .map_err(|e| DbError::transaction("commit open reception", e))?;

        info!(reception_id = %reception.id, pvz_id = %pvz_id, "Reception opened");

        Ok(reception)
    }

    /// Closes the most recently opened reception of a pickup point.
    ///
    /// ## Errors
    /// - `NotFound` if the pickup point doesn't exist or has no open reception
    pub async fn close_last(&self, pvz_id: Uuid) -> DbResult<Reception> {
        debug!(pvz_id = %pvz_id, "Closing last reception");

        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| DbError::transaction("begin close reception", e))?;

        lock_pickup_point(&mut tx, pvz_id).await?;

        let Some(mut reception) = find_open_reception(&mut tx, pvz_id).await? else {
            warn!(pvz_id = %pvz_id, "No open reception to close");
            return reject(
                tx,
                "rollback close reception",
                DbError::not_found("Active reception for pickup point", pvz_id),
            )
            .await;
        };

        sqlx::query("UPDATE receptions SET status = ?1 WHERE id = ?2")
            .bind(ReceptionStatus::Close)
            .bind(reception.id)
            .execute(&mut *tx)
            .await?;

        tx.commit()
            .await
            .map_err(|e| DbError::transaction("commit close reception", e))?;

        reception.status = ReceptionStatus::Close;

        info!(reception_id = %reception.id, pvz_id = %pvz_id, "Reception closed");

        Ok(reception)
    }

    /// The open reception of a pickup point, if any.
    pub async fn find_open(&self, pvz_id: Uuid) -> DbResult<Option<Reception>> {
        let mut conn = self.pool.acquire().await?;
        find_open_reception(&mut conn, pvz_id).await
    }

    /// Gets a reception by ID.
    pub async fn get_by_id(&self, id: Uuid) -> DbResult<Option<Reception>> {
        let sql = format!("SELECT {RECEPTION_COLUMNS} FROM receptions WHERE id = ?1");

        let reception = sqlx::query_as::<_, Reception>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(reception)
    }

    /// All receptions of a pickup point, most recently opened first.
    pub async fn list_by_pickup_point(&self, pvz_id: Uuid) -> DbResult<Vec<Reception>> {
        let sql = format!(
            "SELECT {RECEPTION_COLUMNS} FROM receptions \
             WHERE pvz_id = ?1 \
             ORDER BY date_time DESC, seq DESC"
        );

        let receptions = sqlx::query_as::<_, Reception>(&sql)
            .bind(pvz_id)
            .fetch_all(&self.pool)
            .await?;

        Ok(receptions)
    }

    /// Number of receptions ever opened at a pickup point.
    pub async fn count_by_pickup_point(&self, pvz_id: Uuid) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM receptions WHERE pvz_id = ?1")
            .bind(pvz_id)
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
