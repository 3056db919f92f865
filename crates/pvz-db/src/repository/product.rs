//! # Product Repository
//!
//! Products are appended to the open reception of a pickup point and can be
//! taken back only in reverse order (LIFO).
//!
//! ```text
//!   add ──► [p1, p2, p3] ◄── delete_last removes p3, then p2, then p1
//!            reception must be in_progress for both
//! ```

use chrono::Utc;
use sqlx::SqlitePool;
use tracing::{debug, info, warn};
use uuid::Uuid;

use super::{find_open_reception, lock_pickup_point, reject, PRODUCT_COLUMNS};
use crate::error::{DbError, DbResult};
use pvz_core::Product;

pub(crate) const NO_ACTIVE_RECEPTION: &str = "no active reception for pickup point";

/// Repository for product operations.
#[derive(Debug, Clone)]
pub struct ProductRepository {
    pool: SqlitePool,
}

impl ProductRepository {
    /// Creates a new ProductRepository.
    pub fn new(pool: SqlitePool) -> Self {
        ProductRepository { pool }
    }

    /// Appends a product to the open reception of a pickup point.
    ///
    /// `product_type` is stored as given; it is validated upstream.
    ///
    /// ## Errors
    /// - `NotFound` if the pickup point doesn't exist
    /// - `Conflict` if the pickup point has no open reception
    pub async fn add(&self, pvz_id: Uuid, product_type: &str) -> DbResult<Product> {
        debug!(pvz_id = %pvz_id, product_type = %product_type, "Adding product");

        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| DbError::transaction("begin add product", e))?;

        lock_pickup_point(&mut tx, pvz_id).await?;

        let Some(reception) = find_open_reception(&mut tx, pvz_id).await? else {
            warn!(pvz_id = %pvz_id, "No open reception to add product to");
            return reject(tx, "rollback add product", DbError::conflict(NO_ACTIVE_RECEPTION)).await;
        };

        let product = Product {
            id: Uuid::new_v4(),
            date_time: Utc::now(),
            product_type: product_type.to_string(),
            reception_id: reception.id,
        };

        sqlx::query(
            "INSERT INTO products (id, date_time, type, reception_id) VALUES (?1, ?2, ?3, ?4)",
        )
        .bind(product.id)
        .bind(product.date_time)
        .bind(&product.product_type)
        .bind(product.reception_id)
        .execute(&mut *tx)
        .await?;

        tx.commit()
            .await
            .map_err(|e| DbError::transaction("commit add product", e))?;

        debug!(product_id = %product.id, reception_id = %reception.id, "Product added");

        Ok(product)
    }

    /// Removes the most recently added product of the open reception.
    ///
    /// Returns the removed product.
    ///
    /// ## Errors
    /// - `NotFound` if the pickup point doesn't exist, has no open
    ///   reception, or the open reception has no products
    pub async fn delete_last(&self, pvz_id: Uuid) -> DbResult<Product> {
        debug!(pvz_id = %pvz_id, "Deleting last product");

        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| DbError::transaction("begin delete product", e))?;

        lock_pickup_point(&mut tx, pvz_id).await?;

        let Some(reception) = find_open_reception(&mut tx, pvz_id).await? else {
            warn!(pvz_id = %pvz_id, "No open reception to delete from");
            return reject(
                tx,
                "rollback delete product",
                DbError::not_found("Active reception for pickup point", pvz_id),
            )
            .await;
        };

        let sql = format!(
            "SELECT {PRODUCT_COLUMNS} FROM products \
             WHERE reception_id = ?1 \
             ORDER BY seq DESC \
             LIMIT 1"
        );

        let Some(product) = sqlx::query_as::<_, Product>(&sql)
            .bind(reception.id)
            .fetch_optional(&mut *tx)
            .await?
        else {
            warn!(reception_id = %reception.id, "No product to delete");
            return reject(
                tx,
                "rollback delete product",
                DbError::not_found("Product in reception", reception.id),
            )
            .await;
        };

        sqlx::query("DELETE FROM products WHERE id = ?1")
            .bind(product.id)
            .execute(&mut *tx)
            .await?;

        tx.commit()
            .await
            .map_err(|e| DbError::transaction("commit delete product", e))?;

        info!(product_id = %product.id, reception_id = %reception.id, "Product removed");

        Ok(product)
    }

    /// Products of a reception in insertion order.
    pub async fn list_by_reception(&self, reception_id: Uuid) -> DbResult<Vec<Product>> {
        let sql = format!(
            "SELECT {PRODUCT_COLUMNS} FROM products \
             WHERE reception_id = ?1 \
             ORDER BY seq ASC"
        );

        let products = sqlx::query_as::<_, Product>(&sql)
            .bind(reception_id)
            .fetch_all(&self.pool)
            .await?;

        Ok(products)
    }

    /// Number of products in a reception.
    pub async fn count_by_reception(&self, reception_id: Uuid) -> DbResult<i64> {
        let count: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM products WHERE reception_id = ?1")
                .bind(reception_id)
                .fetch_one(&self.pool)
                .await?;

        Ok(count)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
