//! Database operations for orders.

use chrono::{DateTime, Utc};
use sqlx::SqlitePool;
use tracing::instrument;

use mona_core::{CustomerId, Money, OrderId, OrderStatus, StoreId, TenantId};

use super::RepositoryError;
use crate::models::{NewOrder, Order};

const SELECT: &str = "SELECT o.id, o.user_id, o.external_id, o.customer_id, o.store_id, \
                      o.total_amount, o.status, o.platform, o.created_at, \
                      c.full_name AS customer_name, c.email AS customer_email \
                      FROM orders o LEFT JOIN customers c ON c.id = o.customer_id";

// =============================================================================
// Internal Row Types
// =============================================================================

#[derive(Debug, sqlx::FromRow)]
struct OrderRow {
    id: OrderId,
    user_id: Option<TenantId>,
    external_id: Option<String>,
    customer_id: Option<CustomerId>,
    store_id: Option<StoreId>,
    total_amount: Money,
    status: String,
    platform: Option<String>,
    created_at: DateTime<Utc>,
    customer_name: Option<String>,
    customer_email: Option<String>,
}

impl From<OrderRow> for Order {
    fn from(row: OrderRow) -> Self {
        Self {
            id: row.id,
            user_id: row.user_id,
            external_id: row.external_id,
            customer_id: row.customer_id,
            store_id: row.store_id,
            total_amount: row.total_amount,
            status: row.status,
            platform: row.platform,
            created_at: row.created_at,
            customer_name: row.customer_name,
            customer_email: row.customer_email,
        }
    }
}

/// Amount and time of one order, for revenue aggregation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, sqlx::FromRow)]
pub struct OrderPoint {
    pub total_amount: Money,
    pub created_at: DateTime<Utc>,
}

// =============================================================================
// Repository
// =============================================================================

/// Repository for order database operations.
pub struct OrderRepository<'a> {
    pool: &'a SqlitePool,
    tenant: Option<&'a TenantId>,
}

impl<'a> OrderRepository<'a> {
    /// Create an order repository scoped to `tenant` (or all tenants).
    #[must_use]
    pub const fn new(pool: &'a SqlitePool, tenant: Option<&'a TenantId>) -> Self {
        Self { pool, tenant }
    }

    /// List orders, newest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    #[instrument(skip(self), fields(user_id = ?self.tenant))]
    pub async fn list(&self, limit: i64) -> Result<Vec<Order>, RepositoryError> {
        let sql = format!(
            "{SELECT} WHERE (?1 IS NULL OR o.user_id = ?1) \
             ORDER BY o.created_at DESC, o.rowid DESC LIMIT ?2"
        );
        let rows: Vec<OrderRow> = sqlx::query_as(&sql)
            .bind(self.tenant)
            .bind(limit)
            .fetch_all(self.pool)
            .await?;

        Ok(rows.into_iter().map(Order::from).collect())
    }

    /// Count orders.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn count(&self) -> Result<i64, RepositoryError> {
        let count: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM orders WHERE (?1 IS NULL OR user_id = ?1)")
                .bind(self.tenant)
                .fetch_one(self.pool)
                .await?;
        Ok(count)
    }

    /// Find an order by its ID or platform order number.
    ///
    /// A leading `#` is ignored, so `#1042` finds external order `1042`.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn find_by_reference(&self, reference: &str) -> Result<Option<Order>, RepositoryError> {
        let reference = reference.trim().trim_start_matches('#');
        let sql = format!(
            "{SELECT} WHERE (o.id = ?1 OR o.external_id = ?1) \
             AND (?2 IS NULL OR o.user_id = ?2) LIMIT 1"
        );
        let row: Option<OrderRow> = sqlx::query_as(&sql)
            .bind(reference)
            .bind(self.tenant)
            .fetch_optional(self.pool)
            .await?;

        Ok(row.map(Order::from))
    }

    /// Get an order by its platform identifier, across all tenants.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn find_by_external_id(
        &self,
        external_id: &str,
    ) -> Result<Option<Order>, RepositoryError> {
        let sql = format!("{SELECT} WHERE o.external_id = ?1");
        let row: Option<OrderRow> = sqlx::query_as(&sql)
            .bind(external_id)
            .fetch_optional(self.pool)
            .await?;

        Ok(row.map(Order::from))
    }

    /// The most recent order.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn latest(&self) -> Result<Option<Order>, RepositoryError> {
        Ok(self.list(1).await?.into_iter().next())
    }

    /// Amount and timestamp of every order, newest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn timeline(&self) -> Result<Vec<OrderPoint>, RepositoryError> {
        let points: Vec<OrderPoint> = sqlx::query_as(
            "SELECT total_amount, created_at FROM orders \
             WHERE (?1 IS NULL OR user_id = ?1) ORDER BY created_at DESC",
        )
        .bind(self.tenant)
        .fetch_all(self.pool)
        .await?;
        Ok(points)
    }

    /// Move an order to a new status.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if no order matches `reference`,
    /// or `RepositoryError::Database` if the update fails.
    #[instrument(skip(self), fields(user_id = ?self.tenant, status = %status))]
    pub async fn update_status(
        &self,
        reference: &str,
        status: OrderStatus,
    ) -> Result<Order, RepositoryError> {
        let order = self
            .find_by_reference(reference)
            .await?
            .ok_or(RepositoryError::NotFound)?;

        sqlx::query("UPDATE orders SET status = ?2 WHERE id = ?1")
            .bind(order.id)
            .bind(status.as_str())
            .execute(self.pool)
            .await?;

        tracing::info!(order_id = %order.id, "Order status updated");
        Ok(Order {
            status: status.as_str().to_owned(),
            ..order
        })
    }

    /// Record an order.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` for a duplicate external ID, or
    /// `RepositoryError::Database` if the insert fails otherwise (including a
    /// customer or store reference that does not exist).
    #[instrument(skip(self, order), fields(user_id = ?self.tenant))]
    pub async fn create(&self, order: &NewOrder) -> Result<Order, RepositoryError> {
        let id = OrderId::new();
        sqlx::query(
            "INSERT INTO orders (id, user_id, external_id, customer_id, store_id, \
             total_amount, status, platform, created_at) \
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
        )
        .bind(id)
        .bind(self.tenant)
        .bind(order.external_id.as_deref())
        .bind(order.customer_id)
        .bind(order.store_id)
        .bind(order.total_amount)
        .bind(&order.status)
        .bind(order.platform.as_deref())
        .bind(order.created_at.unwrap_or_else(Utc::now))
        .execute(self.pool)
        .await
        .map_err(RepositoryError::from_write)?;

        let sql = format!("{SELECT} WHERE o.id = ?1");
        let row: OrderRow = sqlx::query_as(&sql).bind(id).fetch_one(self.pool).await?;
        Ok(row.into())
    }
}
