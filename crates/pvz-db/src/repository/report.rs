//! # Report Repository
//!
//! Assembles the nested pickup point → reception → product report.
//!
//! ## Query Plan
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                  list(window, page)  (one read transaction)             │
//! │                                                                         │
//! │  1. Page of pickup points         registration_date DESC               │
//! │       │                                                                 │
//! │       ├── 2. Receptions of each   date_time in [start, end], DESC      │
//! │       │        │                                                        │
//! │       │        └── 3. Products    insertion order, ASC                 │
//! │       │                                                                 │
//! │       └── no receptions in window → listed with an empty list          │
//! │                                                                         │
//! │  Any failed read aborts the whole report.                              │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::{DateTime, Utc};
use sqlx::{SqliteConnection, SqlitePool};
use tracing::debug;
use uuid::Uuid;

use super::{PICKUP_POINT_COLUMNS, PRODUCT_COLUMNS, RECEPTION_COLUMNS};
use crate::error::{DbError, DbResult};
use pvz_core::{Page, PickupPoint, PickupPointReport, Product, Reception, ReceptionReport};

/// Repository for the reception report.
#[derive(Debug, Clone)]
pub struct ReportRepository {
    pool: SqlitePool,
}

impl ReportRepository {
    /// Creates a new ReportRepository.
    pub fn new(pool: SqlitePool) -> Self {
        ReportRepository { pool }
    }

    /// One page of the report.
    ///
    /// `start`/`end` bound the reception open time, both inclusive; `None`
    /// leaves that side open.
    pub async fn list(
        &self,
        start: Option<DateTime<Utc>>,
        end: Option<DateTime<Utc>>,
        page: Page,
    ) -> DbResult<Vec<PickupPointReport>> {
        debug!(
            ?start,
            ?end,
            page = page.page(),
            limit = page.limit(),
            "Building report"
        );

        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| DbError::transaction("begin report", e))?;

        let sql = format!(
            "SELECT {PICKUP_POINT_COLUMNS} FROM pickup_points \
             ORDER BY registration_date DESC, seq DESC \
             LIMIT ?1 OFFSET ?2"
        );

        let pickup_points = sqlx::query_as::<_, PickupPoint>(&sql)
            .bind(page.limit())
            .bind(page.offset())
            .fetch_all(&mut *tx)
            .await?;

        let mut report = Vec::with_capacity(pickup_points.len());

        for pvz in pickup_points {
            let receptions = receptions_in_window(&mut tx, pvz.id, start, end).await?;

            let mut entries = Vec::with_capacity(receptions.len());
            for reception in receptions {
                let products = products_of(&mut tx, reception.id).await?;
                entries.push(ReceptionReport {
                    reception,
                    products,
                });
            }

            report.push(PickupPointReport {
                pvz,
                receptions: entries,
            });
        }

        tx.commit()
            .await
            .map_err(|e| DbError::transaction("commit report", e))?;

        debug!(pickup_points = report.len(), "Report built");

        Ok(report)
    }
}

async fn receptions_in_window(
    conn: &mut SqliteConnection,
    pvz_id: Uuid,
    start: Option<DateTime<Utc>>,
    end: Option<DateTime<Utc>>,
) -> DbResult<Vec<Reception>> {
    // RFC 3339 UTC text sorts chronologically, so string comparison is a time comparison.
    let sql = format!(
        "SELECT {RECEPTION_COLUMNS} FROM receptions \
         WHERE pvz_id = ?1 \
           AND (?2 IS NULL OR date_time >= ?2) \
           AND (?3 IS NULL OR date_time <= ?3) \
         ORDER BY date_time DESC, seq DESC"
    );

    let receptions = sqlx::query_as::<_, Reception>(&sql)
        .bind(pvz_id)
        .bind(start)
        .bind(end)
        .fetch_all(&mut *conn)
        .await?;

    Ok(receptions)
}

async fn products_of(conn: &mut SqliteConnection, reception_id: Uuid) -> DbResult<Vec<Product>> {
    let sql = format!(
        "SELECT {PRODUCT_COLUMNS} FROM products \
         WHERE reception_id = ?1 \
         ORDER BY seq ASC"
    );

    let products = sqlx::query_as::<_, Product>(&sql)
        .bind(reception_id)
        .fetch_all(&mut *conn)
        .await?;

    Ok(products)
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::fixtures;
    use chrono::Duration;

    #[tokio::test]
    async fn test_empty_store_gives_empty_report() {
        let db = fixtures::db().await;
        let report = db.reports().list(None, None, Page::default()).await.unwrap();
        assert!(report.is_empty());
    }

    #[tokio::test]
    async fn test_nested_shape_and_ordering() {
        let db = fixtures::db().await;
        let older_pvz = fixtures::pickup_point(&db).await;
        let newer_pvz = fixtures::pickup_point(&db).await;

        let first = db.receptions().open(older_pvz.id).await.unwrap();
        db.products().add(older_pvz.id, "electronics").await.unwrap();
        db.products().add(older_pvz.id, "clothes").await.unwrap();
        db.receptions().close_last(older_pvz.id).await.unwrap();
        let second = db.receptions().open(older_pvz.id).await.unwrap();

        let report = db.reports().list(None, None, Page::default()).await.unwrap();

        assert_eq!(report.len(), 2);
        assert_eq!(report[0].pvz, newer_pvz);
        assert!(report[0].receptions.is_empty());

        let entry = &report[1];
        assert_eq!(entry.pvz, older_pvz);
        assert_eq!(entry.receptions.len(), 2);
        assert_eq!(entry.receptions[0].reception.id, second.id);
        assert_eq!(entry.receptions[1].reception.id, first.id);

        let types: Vec<_> = entry.receptions[1]
            .products
            .iter()
            .map(|p| p.product_type.as_str())
            .collect();
        assert_eq!(types, vec!["electronics", "clothes"]);
        assert!(entry.receptions[0].products.is_empty());
    }

    #[tokio::test]
    async fn test_window_is_inclusive() {
        let db = fixtures::db().await;
        let pvz = fixtures::pickup_point(&db).await;
        let reception = db.receptions().open(pvz.id).await.unwrap();
        let at = reception.date_time;

        let exact = db
            .reports()
            .list(Some(at), Some(at), Page::default())
            .await
            .unwrap();
        assert_eq!(exact[0].receptions.len(), 1);

        let before = db
            .reports()
            .list(None, Some(at - Duration::seconds(1)), Page::default())
            .await
            .unwrap();
        assert_eq!(before.len(), 1);
        assert!(before[0].receptions.is_empty());

        let after = db
            .reports()
            .list(Some(at + Duration::seconds(1)), None, Page::default())
            .await
            .unwrap();
        assert!(after[0].receptions.is_empty());
    }

    #[tokio::test]
    async fn test_pages_pickup_points() {
        let db = fixtures::db().await;
        for _ in 0..3 {
            fixtures::pickup_point(&db).await;
        }

        let page = db
            .reports()
            .list(None, None, Page::new(Some(2), Some(2)))
            .await
            .unwrap();
        assert_eq!(page.len(), 1);
    }
}
