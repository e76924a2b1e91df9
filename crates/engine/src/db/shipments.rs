//! Database operations for shipments.

use sqlx::SqlitePool;

use mona_core::TenantId;

use super::RepositoryError;

/// Repository for shipment queries.
pub struct ShipmentRepository<'a> {
    pool: &'a SqlitePool,
    tenant: Option<&'a TenantId>,
}

impl<'a> ShipmentRepository<'a> {
    /// Create a shipment repository scoped to `tenant` (or all tenants).
    #[must_use]
    pub const fn new(pool: &'a SqlitePool, tenant: Option<&'a TenantId>) -> Self {
        Self { pool, tenant }
    }

    /// Count shipments still awaiting dispatch.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn count_pending(&self) -> Result<i64, RepositoryError> {
        let count: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM shipments \
             WHERE (?1 IS NULL OR user_id = ?1) AND status = 'pending'",
        )
        .bind(self.tenant)
        .fetch_one(self.pool)
        .await?;
        Ok(count)
    }
}
