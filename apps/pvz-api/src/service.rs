//! # PVZ Service
//!
//! Transport-agnostic facade over the registry, the ledgers and the report.
//!
//! ## Call Pipeline
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Every Operation, In Order                            │
//! │                                                                         │
//! │  ctx.principal ──► authorize(role, op)     ✗ → FORBIDDEN (no store I/O) │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  parse / validate input                    ✗ → VALIDATION_ERROR         │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  tokio::time::timeout(ctx deadline, repository call)                   │
//! │       │   expired → future dropped → transaction rolled back           │
//! │       │             → STORE_ERROR "Operation timed out"                │
//! │       ▼                                                                 │
//! │  DbError → ApiError (CONFLICT / NOT_FOUND / STORE_ERROR)               │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::future::Future;
use std::time::Duration;

use tracing::{debug, info, warn};

use crate::config::ServiceConfig;
use crate::context::RequestContext;
use crate::error::{ApiError, ApiResult};
use pvz_core::error::CoreResult;
use pvz_core::validation::{parse_id, parse_report_window, validate_product_type};
use pvz_core::{
    authorize, AllowedCities, CoreError, Operation, Page, PickupPoint, PickupPointReport, Product, Reception,
};
use pvz_db::{Database, DbError, DbResult};

/// The service every transport calls into.
///
/// Holds the shared [`Database`] handle; clone freely.
#[derive(Debug, Clone)]
pub struct PvzService {
    db: Database,
    cities: AllowedCities,
    default_timeout: Duration,
}

impl PvzService {
    pub fn new(db: Database, cities: AllowedCities, default_timeout: Duration) -> Self {
        PvzService {
            db,
            cities,
            default_timeout,
        }
    }

    /// Opens the store described by `config` and builds the service on it.
    pub async fn from_config(config: &ServiceConfig) -> ApiResult<Self> {
        let cities = config
            .cities()
            .map_err(|e| ApiError::validation(e.to_string()))?;
        let db = Database::new(config.db_config()).await?;

        Ok(PvzService::new(db, cities, config.request_timeout()))
    }

    pub fn database(&self) -> &Database {
        &self.db
    }

    pub fn allowed_cities(&self) -> &AllowedCities {
        &self.cities
    }

    /// Closes the underlying pool.
    pub async fn close(&self) {
        self.db.close().await;
    }

    // =========================================================================
    // Pickup Points
    // =========================================================================

    /// Registers a pickup point. Moderators only.
    pub async fn create_pickup_point(
        &self,
        ctx: &RequestContext,
        city: &str,
    ) -> ApiResult<PickupPoint> {
        let city = self.admit(ctx, Operation::CreatePickupPoint, || {
            Ok(self.cities.validate(city)?)
        })?;

        let repo = self.db.pickup_points();
        self.run(ctx, repo.create(&city)).await
    }

    /// One page of pickup points, newest first.
    pub async fn list_pickup_points(
        &self,
        ctx: &RequestContext,
        page: Option<i64>,
        limit: Option<i64>,
    ) -> ApiResult<Vec<PickupPoint>> {
        let page = self.admit(ctx, Operation::ListPickupPoints, || Ok(Page::new(page, limit)))?;

        let repo = self.db.pickup_points();
        self.run(ctx, repo.list(page)).await
    }

    /// Every pickup point, newest first.
    pub async fn list_all_pickup_points(&self, ctx: &RequestContext) -> ApiResult<Vec<PickupPoint>> {
        self.admit(ctx, Operation::ListPickupPoints, || Ok(()))?;

        let repo = self.db.pickup_points();
        self.run(ctx, repo.list_all()).await
    }

    /// The nested reception report.
    ///
    /// `start`/`end` are optional RFC 3339 timestamps bounding the reception
    /// open time, both inclusive.
    pub async fn list_report(
        &self,
        ctx: &RequestContext,
        start: Option<&str>,
        end: Option<&str>,
        page: Option<i64>,
        limit: Option<i64>,
    ) -> ApiResult<Vec<PickupPointReport>> {
        let (start, end, page) = self.admit(ctx, Operation::ListReport, || {
            let (start, end) = parse_report_window(start, end)?;
            Ok((start, end, Page::new(page, limit)))
        })?;

        let repo = self.db.reports();
        self.run(ctx, repo.list(start, end, page)).await
    }

    // =========================================================================
    // Receptions
    // =========================================================================

    /// Opens a reception. Employees only.
    pub async fn open_reception(&self, ctx: &RequestContext, pvz_id: &str) -> ApiResult<Reception> {
        let pvz_id = self.admit(ctx, Operation::OpenReception, || Ok(parse_id("pvzId", pvz_id)?))?;

        let repo = self.db.receptions();
        self.run(ctx, repo.open(pvz_id)).await
    }

    /// Closes the open reception. Employees only.
    pub async fn close_last_reception(
        &self,
        ctx: &RequestContext,
        pvz_id: &str,
    ) -> ApiResult<Reception> {
        let pvz_id = self.admit(ctx, Operation::CloseReception, || Ok(parse_id("pvzId", pvz_id)?))?;

        let repo = self.db.receptions();
        self.run(ctx, repo.close_last(pvz_id)).await
    }

    // =========================================================================
    // Products
    // =========================================================================

    /// Appends a product to the open reception. Employees only.
    pub async fn add_product(
        &self,
        ctx: &RequestContext,
        pvz_id: &str,
        product_type: &str,
    ) -> ApiResult<Product> {
        let (pvz_id, product_type) = self.admit(ctx, Operation::AddProduct, || {
            Ok((parse_id("pvzId", pvz_id)?, validate_product_type(product_type)?))
        })?;

        let repo = self.db.products();
        self.run(ctx, repo.add(pvz_id, &product_type)).await
    }

    /// Removes the last product of the open reception. Employees only.
    pub async fn delete_last_product(&self, ctx: &RequestContext, pvz_id: &str) -> ApiResult<()> {
        let pvz_id = self.admit(ctx, Operation::DeleteProduct, || Ok(parse_id("pvzId", pvz_id)?))?;

        let repo = self.db.products();
        let removed = self.run(ctx, repo.delete_last(pvz_id)).await?;

        debug!(product_id = %removed.id, "Delete acknowledged");
        Ok(())
    }

    // =========================================================================
    // Helpers
    // =========================================================================

    /// Authorizes the caller, then parses its input. Nothing here touches the
    /// store, and a forbidden caller never gets its input inspected.
    fn admit<T>(
        &self,
        ctx: &RequestContext,
        operation: Operation,
        input: impl FnOnce() -> CoreResult<T>,
    ) -> CoreResult<T> {
        authorize(&ctx.principal, operation).map_err(|e| {
            warn!(
                principal = %ctx.principal.id,
                role = %ctx.principal.role,
                ?operation,
                "Access denied"
            );
            CoreError::from(e)
        })?;

        input()
    }

    /// Runs one store call under the caller's deadline.
    async fn run<T, F>(&self, ctx: &RequestContext, call: F) -> ApiResult<T>
    where
        F: Future<Output = DbResult<T>>,
    {
        let deadline = ctx.timeout.unwrap_or(self.default_timeout);

        match tokio::time::timeout(deadline, call).await {
            Ok(Ok(value)) => Ok(value),
            Ok(Err(err)) => {
                match &err {
                    DbError::NotFound { .. } | DbError::Conflict { .. } => {
                        info!(principal = %ctx.principal.id, error = %err, "Operation rejected")
                    }
                    _ => {}
                }
                Err(err.into())
            }
            Err(_) => {
                warn!(
                    principal = %ctx.principal.id,
                    timeout_ms = deadline.as_millis() as u64,
                    "Deadline expired, transaction rolled back"
                );
                Err(DbError::Timeout {
                    millis: deadline.as_millis(),
                }
                .into())
            }
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCode;
    use pvz_core::{ReceptionStatus, Role};
    use pvz_db::DbConfig;

    async fn service() -> PvzService {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        PvzService::new(db, AllowedCities::default(), Duration::from_secs(5))
    }

    fn moderator() -> RequestContext {
        RequestContext::for_role(Role::Moderator)
    }

    fn employee() -> RequestContext {
        RequestContext::for_role(Role::Employee)
    }

    #[tokio::test]
    async fn test_create_pickup_point() {
        let svc = service().await;

        let pvz = svc.create_pickup_point(&moderator(), " Kazan ").await.unwrap();
        assert_eq!(pvz.city, "Kazan");

        let err = svc.create_pickup_point(&moderator(), "Novosibirsk").await.unwrap_err();
        assert_eq!(err.code, ErrorCode::ValidationError);

        assert_eq!(svc.database().pickup_points().count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_employee_cannot_create_pickup_point() {
        let svc = service().await;

        let err = svc.create_pickup_point(&employee(), "Moscow").await.unwrap_err();

        assert_eq!(err.code, ErrorCode::Forbidden);
        assert_eq!(svc.database().pickup_points().count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_moderator_cannot_touch_the_ledger() {
        let svc = service().await;
        let pvz = svc.create_pickup_point(&moderator(), "Moscow").await.unwrap();
        let id = pvz.id.to_string();

        let ctx = moderator();
        assert_eq!(svc.open_reception(&ctx, &id).await.unwrap_err().code, ErrorCode::Forbidden);
        assert_eq!(
            svc.close_last_reception(&ctx, &id).await.unwrap_err().code,
            ErrorCode::Forbidden
        );
        assert_eq!(
            svc.add_product(&ctx, &id, "electronics").await.unwrap_err().code,
            ErrorCode::Forbidden
        );
        assert_eq!(
            svc.delete_last_product(&ctx, &id).await.unwrap_err().code,
            ErrorCode::Forbidden
        );

        assert_eq!(
            svc.database().receptions().count_by_pickup_point(pvz.id).await.unwrap(),
            0
        );
    }

    #[tokio::test]
    async fn test_both_roles_may_read() {
        let svc = service().await;
        svc.create_pickup_point(&moderator(), "Moscow").await.unwrap();

        for ctx in [employee(), moderator()] {
            assert_eq!(svc.list_pickup_points(&ctx, None, None).await.unwrap().len(), 1);
            assert_eq!(svc.list_all_pickup_points(&ctx).await.unwrap().len(), 1);
            assert_eq!(
                svc.list_report(&ctx, None, None, None, None).await.unwrap().len(),
                1
            );
        }
    }

    #[tokio::test]
    async fn test_ledger_round_trip() {
        let svc = service().await;
        let pvz = svc.create_pickup_point(&moderator(), "Moscow").await.unwrap();
        let id = pvz.id.to_string();
        let ctx = employee();

        let reception = svc.open_reception(&ctx, &id).await.unwrap();
        assert_eq!(
            svc.open_reception(&ctx, &id).await.unwrap_err().code,
            ErrorCode::Conflict
        );

        svc.add_product(&ctx, &id, "electronics").await.unwrap();
        svc.add_product(&ctx, &id, "clothes").await.unwrap();
        svc.delete_last_product(&ctx, &id).await.unwrap();

        let closed = svc.close_last_reception(&ctx, &id).await.unwrap();
        assert_eq!(closed.id, reception.id);
        assert_eq!(closed.status, ReceptionStatus::Close);

        let products = svc
            .database()
            .products()
            .list_by_reception(reception.id)
            .await
            .unwrap();
        assert_eq!(products.len(), 1);
        assert_eq!(products[0].product_type, "electronics");

        assert_eq!(
            svc.add_product(&ctx, &id, "shoes").await.unwrap_err().code,
            ErrorCode::Conflict
        );
        assert_eq!(
            svc.close_last_reception(&ctx, &id).await.unwrap_err().code,
            ErrorCode::NotFound
        );
    }

    #[tokio::test]
    async fn test_input_validation() {
        let svc = service().await;
        let pvz = svc.create_pickup_point(&moderator(), "Moscow").await.unwrap();
        let id = pvz.id.to_string();
        let ctx = employee();

        assert_eq!(
            svc.open_reception(&ctx, "not-a-uuid").await.unwrap_err().code,
            ErrorCode::ValidationError
        );

        svc.open_reception(&ctx, &id).await.unwrap();
        assert_eq!(
            svc.add_product(&ctx, &id, "   ").await.unwrap_err().code,
            ErrorCode::ValidationError
        );
        assert_eq!(
            svc.add_product(&ctx, &id, &"x".repeat(101)).await.unwrap_err().code,
            ErrorCode::ValidationError
        );

        let err = svc
            .list_report(&ctx, Some("yesterday"), None, None, None)
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::ValidationError);

        let err = svc
            .list_report(
                &ctx,
                Some("2025-02-01T00:00:00Z"),
                Some("2025-01-01T00:00:00Z"),
                None,
                None,
            )
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::ValidationError);
    }

    #[tokio::test]
    async fn test_unknown_pickup_point() {
        let svc = service().await;
        let missing = uuid::Uuid::new_v4().to_string();

        let err = svc.open_reception(&employee(), &missing).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::NotFound);
    }

    #[tokio::test]
    async fn test_paging_fallbacks() {
        let svc = service().await;
        for _ in 0..12 {
            svc.create_pickup_point(&moderator(), "Kazan").await.unwrap();
        }
        let ctx = employee();

        assert_eq!(svc.list_pickup_points(&ctx, None, None).await.unwrap().len(), 10);
        assert_eq!(svc.list_pickup_points(&ctx, Some(0), Some(31)).await.unwrap().len(), 10);
        assert_eq!(svc.list_pickup_points(&ctx, Some(2), None).await.unwrap().len(), 2);
        assert_eq!(svc.list_pickup_points(&ctx, Some(1), Some(30)).await.unwrap().len(), 12);
        assert_eq!(svc.list_pickup_points(&ctx, Some(-3), Some(5)).await.unwrap().len(), 5);
    }

    #[tokio::test]
    async fn test_expired_deadline_is_a_store_error() {
        let svc = service().await;
        let ctx = employee().with_timeout(Duration::from_millis(10));

        let err = svc
            .run(&ctx, std::future::pending::<DbResult<()>>())
            .await
            .unwrap_err();

        assert_eq!(err.code, ErrorCode::StoreError);
        assert_eq!(err.message, "Operation timed out");
    }

    #[tokio::test]
    async fn test_admission_checks_role_before_input() {
        let svc = service().await;

        let denied = svc.admit(&employee(), Operation::CreatePickupPoint, || -> CoreResult<()> {
            panic!("input parsed for a forbidden caller")
        });
        assert!(matches!(denied, Err(CoreError::Forbidden(_))));

        let err = svc
            .admit(&employee(), Operation::OpenReception, || {
                Ok(parse_id("pvzId", "nope")?)
            })
            .unwrap_err();
        assert!(matches!(err, CoreError::Validation(_)));

        // Forbidden and invalid at once: the role check wins.
        let err = svc.create_pickup_point(&employee(), "Atlantis").await.unwrap_err();
        assert_eq!(err.code, ErrorCode::Forbidden);

        // Validation messages reach the caller without the core prefix.
        let err = svc.create_pickup_point(&moderator(), "").await.unwrap_err();
        assert_eq!(err.code, ErrorCode::ValidationError);
        assert!(!err.message.starts_with("Validation error"), "{}", err.message);
    }
}
