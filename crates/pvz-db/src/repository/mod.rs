//! # Repository Module
//!
//! Store access for the PVZ ledger, one repository per concern.
//!
//! ## Ledger Transactions
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    One Ledger Write, One Transaction                    │
//! │                                                                         │
//! │  pool.begin()                                                          │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  lock_pickup_point(pvz_id)                                             │
//! │  └── UPDATE pickup_points ... WHERE id = ?                             │
//! │      • takes the SQLite write lock before anything is read             │
//! │      • 0 rows → NotFound("Pickup point"), nothing written              │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  find_open_reception(pvz_id)      ← sees every committed write         │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  INSERT / UPDATE / DELETE                                              │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  tx.commit()                                                           │
//! │                                                                         │
//! │  Rejected by a ledger rule → reject() → explicit ROLLBACK             │
//! │  Error or dropped future → Transaction dropped → ROLLBACK             │
//! │  Concurrent writers wait on the lock for at most busy_timeout          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Available Repositories
//!
//! - [`PickupPointRepository`](pickup_point::PickupPointRepository) - registry
//! - [`ReceptionRepository`](reception::ReceptionRepository) - open/close state machine
//! - [`ProductRepository`](product::ProductRepository) - LIFO product ledger
//! - [`ReportRepository`](report::ReportRepository) - nested report snapshot

pub mod pickup_point;
pub mod product;
pub mod reception;
pub mod report;

use sqlx::{Sqlite, SqliteConnection, Transaction};
use tracing::debug;
use uuid::Uuid;

use crate::error::{DbError, DbResult};
use pvz_core::Reception;

pub(crate) const RECEPTION_COLUMNS: &str = "id, date_time, pvz_id, status";
pub(crate) const PRODUCT_COLUMNS: &str = "id, date_time, type, reception_id";
pub(crate) const PICKUP_POINT_COLUMNS: &str = "id, registration_date, city";

/// Takes the database write lock on behalf of one pickup point.
///
/// Must be the first statement of every ledger transaction. The no-op
/// update makes SQLite upgrade the transaction to a writer immediately, so
/// the check-then-write that follows cannot interleave with another one.
pub(crate) async fn lock_pickup_point(conn: &mut SqliteConnection, pvz_id: Uuid) -> DbResult<()> {
    let result = sqlx::query("UPDATE pickup_points SET city = city WHERE id = ?1")
        .bind(pvz_id)
        .execute(&mut *conn)
        .await?;

    if result.rows_affected() == 0 {
        return Err(DbError::not_found("Pickup point", pvz_id));
    }

    debug!(pvz_id = %pvz_id, "Pickup point locked");
    Ok(())
}

/// Rolls back a ledger transaction that hit a business-rule rejection and
/// returns that rejection.
pub(crate) async fn reject<T>(
    tx: Transaction<'_, Sqlite>,
    context: &str,
    err: DbError,
) -> DbResult<T> {
    tx.rollback()
        .await
        .map_err(|e| DbError::transaction(context, e))?;
    Err(err)
}

/// Most recently opened `in_progress` reception of a pickup point.
pub(crate) async fn find_open_reception(
    conn: &mut SqliteConnection,
    pvz_id: Uuid,
) -> DbResult<Option<Reception>> {
    let sql = format!(
        "SELECT {RECEPTION_COLUMNS} FROM receptions \
         WHERE pvz_id = ?1 AND status = 'in_progress' \
         ORDER BY date_time DESC, seq DESC \
         LIMIT 1"
    );

    let reception = sqlx::query_as::<_, Reception>(&sql)
        .bind(pvz_id)
        .fetch_optional(&mut *conn)
        .await?;

    Ok(reception)
}

// =============================================================================
// Test Fixtures
// =============================================================================

#[cfg(test)]
pub(crate) mod fixtures {
    use crate::pool::{Database, DbConfig};
    use pvz_core::PickupPoint;

    pub async fn db() -> Database {
        Database::new(DbConfig::in_memory()).await.unwrap()
    }

    pub async fn pickup_point(db: &Database) -> PickupPoint {
        db.pickup_points().create("Moscow").await.unwrap()
    }
}
